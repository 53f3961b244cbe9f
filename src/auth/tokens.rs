//! Token storage and management

/// Token store trait for different storage backends.
///
/// Holds the bearer credential pair. A successful login stores both tokens
/// and logout clears both; an access token without a refresh token cannot be
/// recovered after expiry, so the pair is treated as a unit.
pub trait TokenStore {
    fn get_access_token(&self) -> Option<String>;
    fn set_access_token(&mut self, token: String);
    fn get_refresh_token(&self) -> Option<String>;
    fn set_refresh_token(&mut self, token: String);
    fn clear_tokens(&mut self);

    /// Whether any credential is present.
    fn has_credentials(&self) -> bool {
        self.get_access_token().is_some() || self.get_refresh_token().is_some()
    }
}
