//! API client module for the Dreamhouse service

mod cards;
pub mod client;
mod error;
mod users;

use anyhow::Result;

pub use cards::CardFilters;
pub use client::ApiClient;
pub use error::ApiError;

use crate::config::Config;

/// Build a client backed by the on-disk token store.
pub fn connect() -> Result<ApiClient> {
    let config = Config::load()?;
    let client = ApiClient::new(config)?;
    client.on_session_expired(|| {
        eprintln!("Session expired. Run 'dreamhouse-cli login' to re-authenticate.");
    });
    Ok(client)
}

/// List cards, filtered and paginated
pub async fn list_cards(filters: &CardFilters, page: u32, query: Option<&str>) -> Result<()> {
    cards::list_cards(filters, page, query).await
}

/// Full-text search across cards
pub async fn search_cards(query: &str, filters: &CardFilters) -> Result<()> {
    cards::search_cards(query, filters).await
}

/// Show one card in detail
pub async fn show_card(id: i64) -> Result<()> {
    cards::show_card(id).await
}

/// List the current user's favorite cards
pub async fn list_favorites(page: u32) -> Result<()> {
    cards::list_favorites(page).await
}

/// Add a card to favorites
pub async fn add_favorite(id: i64) -> Result<()> {
    cards::add_favorite(id).await
}

/// Remove a card from favorites
pub async fn remove_favorite(id: i64) -> Result<()> {
    cards::remove_favorite(id).await
}

/// List recently viewed cards
pub async fn recent_views(page: u32, limit: u32) -> Result<()> {
    cards::recent_views(page, limit).await
}

/// Show current user info
pub async fn whoami() -> Result<()> {
    users::whoami().await
}

/// Show referral link and referred users
pub async fn referrals() -> Result<()> {
    users::referrals().await
}
