//! User-related models

use serde::{Deserialize, Serialize};

/// Authenticated user profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub phone_number: String,
    pub name: String,
    #[serde(default)]
    pub profile_photo: Option<String>,
}

/// A user who signed up through someone's referral link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Referral {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub created_at: String,
}
