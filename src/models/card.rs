//! Card (property listing) models

use serde::{Deserialize, Serialize};

use super::Review;

/// Photo attached to a card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardImage {
    pub id: i64,
    pub image: String,
}

/// Video attached to a card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardVideo {
    pub id: i64,
    pub video: String,
}

/// Document attached to a card (floor plans, permits)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardDocument {
    pub id: i64,
    pub title: String,
    pub file: String,
    pub uploaded_at: String,
}

/// Developer (builder) behind a card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Developer {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub is_subscribed: Option<bool>,
}

/// Property listing.
///
/// List endpoints omit the heavy nested collections, so everything beyond
/// the identity fields is defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub price_metr: f64,
    #[serde(default)]
    pub rooms: u32,
    #[serde(default)]
    pub city: u8,
    #[serde(default)]
    pub house_type: Option<String>,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub building_material: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub floors_total: u32,
    #[serde(default)]
    pub elevator: Option<String>,
    #[serde(default)]
    pub parking: Option<String>,
    #[serde(default)]
    pub balcony: bool,
    #[serde(default)]
    pub ceiling_height: Option<String>,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub rating_count: i64,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub developer: Option<Developer>,
    #[serde(default)]
    pub images: Vec<CardImage>,
    #[serde(default)]
    pub videos: Vec<CardVideo>,
    #[serde(default)]
    pub documents: Vec<CardDocument>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub recommendations: Vec<Card>,
    #[serde(default)]
    pub renovation: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
}
