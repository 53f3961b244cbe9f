//! Card endpoints: browse, search, detail, favorites, recent views

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;

use crate::models::{Card, Page};

use super::connect;

/// Cards per page, matching the web client's default.
const PAGE_SIZE: u32 = 8;

/// Search filters. Unset fields are omitted from the query string.
#[derive(Debug, Default, Clone)]
pub struct CardFilters {
    pub city: Option<u8>,
    pub category: Option<String>,
    pub house_type: Option<String>,
    pub elevator: Option<String>,
    pub parking: Option<String>,
    pub building_material: Option<String>,
    pub balcony: Option<bool>,
    pub area_min: Option<f64>,
    pub area_max: Option<f64>,
    pub price_min: Option<u64>,
    pub price_max: Option<u64>,
    pub floors_min: Option<u32>,
    pub floors_max: Option<u32>,
    pub rooms_min: Option<u32>,
    pub rooms_max: Option<u32>,
}

impl CardFilters {
    fn push_query(&self, params: &mut Vec<(String, String)>) {
        fn add<T: ToString>(params: &mut Vec<(String, String)>, key: &str, value: &Option<T>) {
            if let Some(v) = value {
                params.push((key.to_string(), v.to_string()));
            }
        }
        add(params, "city", &self.city);
        add(params, "category", &self.category);
        add(params, "house_type", &self.house_type);
        add(params, "elevator", &self.elevator);
        add(params, "parking", &self.parking);
        add(params, "building_material", &self.building_material);
        add(params, "balcony", &self.balcony);
        add(params, "area_min", &self.area_min);
        add(params, "area_max", &self.area_max);
        add(params, "price_min", &self.price_min);
        add(params, "price_max", &self.price_max);
        add(params, "floors_min", &self.floors_min);
        add(params, "floors_max", &self.floors_max);
        add(params, "rooms_min", &self.rooms_min);
        add(params, "rooms_max", &self.rooms_max);
    }
}

/// Append an urlencoded query string to a path.
fn with_query(path: &str, params: &[(String, String)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish();
    format!("{path}?{query}")
}

/// Favorites come back wrapped, one entry per bookmark.
#[derive(Debug, Deserialize)]
struct FavoriteItem {
    #[allow(dead_code)]
    id: i64,
    card: Card,
}

/// List cards, filtered and paginated.
pub async fn list_cards(filters: &CardFilters, page: u32, query: Option<&str>) -> Result<()> {
    let client = connect()?;

    let mut params = vec![
        ("page".to_string(), page.to_string()),
        ("limit".to_string(), PAGE_SIZE.to_string()),
    ];
    if let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) {
        params.push(("q".to_string(), q.to_string()));
    }
    filters.push_query(&mut params);

    let value = client.get_value(&with_query("/cards/", &params)).await?;
    let cards: Page<Card> = Page::from_value(value).context("Failed to parse card list")?;
    print_page(&cards, page);
    Ok(())
}

/// Full-text search across cards.
pub async fn search_cards(query: &str, filters: &CardFilters) -> Result<()> {
    let query = query.trim();
    if query.is_empty() {
        println!("Nothing to search for.");
        return Ok(());
    }

    let client = connect()?;
    let mut params = vec![("q".to_string(), query.to_string())];
    filters.push_query(&mut params);

    let value = client
        .get_value(&with_query("/cards/search/", &params))
        .await?;
    let cards: Page<Card> = Page::from_value(value).context("Failed to parse search results")?;
    if cards.results.is_empty() {
        println!("No cards match '{query}'.");
        return Ok(());
    }
    for card in &cards.results {
        println!("{}", card_line(card));
    }
    Ok(())
}

/// Show one card in detail.
pub async fn show_card(id: i64) -> Result<()> {
    let client = connect()?;
    let card: Card = client
        .get(&format!("/cards/{id}/"))
        .await
        .context("Failed to fetch card")?;

    println!();
    println!("{} (#{})", card.title, card.id);
    println!("Address:     {}", card.address);
    println!("Price:       {} ({}/m2)", card.price, card.price_metr);
    println!(
        "Layout:      {} rooms, {} m2, floor count {}",
        card.rooms, card.area, card.floors_total
    );
    if let Some(ref developer) = card.developer {
        println!("Developer:   {}", developer.name);
    }
    if let Some(ref rating) = card.rating {
        println!("Rating:      {} ({} reviews)", rating, card.rating_count);
    }
    if card.latitude != 0.0 || card.longitude != 0.0 {
        println!("Location:    {}, {}", card.latitude, card.longitude);
    }
    if card.is_favorite == Some(true) {
        println!("Favorite:    yes");
    }
    if !card.description.is_empty() {
        println!();
        println!("{}", card.description);
    }
    if !card.images.is_empty() {
        println!();
        println!("Images:");
        for image in &card.images {
            println!("  {}", image.image);
        }
    }
    if !card.documents.is_empty() {
        println!();
        println!("Documents:");
        for doc in &card.documents {
            println!("  {} - {}", doc.title, doc.file);
        }
    }
    if !card.reviews.is_empty() {
        println!();
        println!("Reviews:");
        for review in &card.reviews {
            println!(
                "  [{:.0}/5] {} - {}",
                review.rating, review.user_name, review.comment
            );
            if let Some(ref reply) = review.developer_response {
                println!("      reply from {}: {}", reply.developer_name, reply.response_text);
            }
        }
    }
    Ok(())
}

/// List the current user's favorite cards.
pub async fn list_favorites(page: u32) -> Result<()> {
    let client = connect()?;
    let params = vec![("page".to_string(), page.to_string())];
    let value = client
        .get_value(&with_query("/cards/favorites/me/", &params))
        .await?;
    let favorites: Page<FavoriteItem> =
        Page::from_value(value).context("Failed to parse favorites")?;

    if favorites.results.is_empty() {
        println!("No favorite cards.");
        return Ok(());
    }
    for item in &favorites.results {
        println!("{}", card_line(&item.card));
    }
    println!();
    println!("{} favorite card(s).", favorites.count);
    Ok(())
}

/// Add a card to favorites.
pub async fn add_favorite(id: i64) -> Result<()> {
    let client = connect()?;
    client
        .post_value(&format!("/cards/{id}/favorite/"), &json!({}))
        .await
        .context("Failed to add favorite")?;
    println!("Card {id} added to favorites.");
    Ok(())
}

/// Remove a card from favorites.
pub async fn remove_favorite(id: i64) -> Result<()> {
    let client = connect()?;
    client
        .delete(&format!("/cards/{id}/favorite/"))
        .await
        .context("Failed to remove favorite")?;
    println!("Card {id} removed from favorites.");
    Ok(())
}

/// List recently viewed cards.
pub async fn recent_views(page: u32, limit: u32) -> Result<()> {
    let client = connect()?;
    let params = vec![
        ("page".to_string(), page.to_string()),
        ("limit".to_string(), limit.to_string()),
    ];
    let value = client
        .get_value(&with_query("/cards/recent-views/", &params))
        .await?;
    let cards: Page<Card> = Page::from_value(value).context("Failed to parse recent views")?;
    if cards.results.is_empty() {
        println!("No recently viewed cards.");
        return Ok(());
    }
    for card in &cards.results {
        println!("{}", card_line(card));
    }
    Ok(())
}

fn print_page(cards: &Page<Card>, page: u32) {
    if cards.results.is_empty() {
        println!("No cards found.");
        return;
    }
    for card in &cards.results {
        println!("{}", card_line(card));
    }
    println!();
    let more = if cards.next.is_some() {
        " (more available, use --page)"
    } else {
        ""
    };
    println!(
        "Page {}, showing {} of {} card(s){}",
        page,
        cards.results.len(),
        cards.count,
        more
    );
}

fn card_line(card: &Card) -> String {
    let favorite = if card.is_favorite == Some(true) {
        " *"
    } else {
        ""
    };
    format!(
        "{:>6}  {:>12}  {} room(s)  {} - {}{}",
        card.id, card.price, card.rooms, card.title, card.address, favorite
    )
}
