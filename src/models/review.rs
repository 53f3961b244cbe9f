//! Review models

use serde::{Deserialize, Serialize};

/// Photo attached to a review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewImage {
    pub id: i64,
    pub image: String,
}

/// Developer's public reply to a review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeveloperResponse {
    pub id: i64,
    pub developer_name: String,
    pub response_text: String,
    pub created_at: String,
}

/// User review of a card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub user_name: String,
    #[serde(default)]
    pub user_avatar: Option<String>,
    pub rating: f64,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub images: Vec<ReviewImage>,
    pub created_at: String,
    #[serde(default)]
    pub helpful_count: i64,
    #[serde(default)]
    pub not_helpful_count: i64,
    #[serde(default)]
    pub user_vote: Option<String>,
    #[serde(default)]
    pub developer_response: Option<DeveloperResponse>,
}
