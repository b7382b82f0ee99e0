use serde::{Deserialize, Serialize};

/// Bearer token claims issued by the identity service.
///
/// Non-admin tokens carry the single pharmacy the caller may see.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String, // user_id
    #[serde(default)]
    pub username: String,
    pub is_admin: bool,
    #[serde(default)]
    pub pharmacy_id: Option<String>,
    pub exp: usize, // expiration timestamp
    #[serde(default)]
    pub iat: usize, // issued at
}
