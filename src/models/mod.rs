//! Data models for Dreamhouse entities

mod card;
mod review;
mod user;

pub use card::*;
pub use review::*;
pub use user::*;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Paginated envelope used by list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T: DeserializeOwned> Page<T> {
    /// Parse a list response. Some endpoints answer with the paginated
    /// envelope, others with a bare array; both shapes are accepted.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        if value.is_array() {
            let results: Vec<T> = serde_json::from_value(value)?;
            return Ok(Page {
                count: results.len() as u64,
                next: None,
                previous: None,
                results,
            });
        }
        serde_json::from_value(value)
    }
}
