use anyhow::{Context, Result};
use contracts::system::auth::TokenClaims;
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::shared::config::config;

/// Validate JWT token against the configured secret and extract claims
pub fn validate_token(token: &str) -> Result<TokenClaims> {
    validate_token_with(token, &config().auth.jwt_secret)
}

pub fn validate_token_with(token: &str, secret: &str) -> Result<TokenClaims> {
    if secret.is_empty() {
        anyhow::bail!("auth.jwt_secret is not configured");
    }

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode JWT token")?;

    Ok(token_data.claims)
}
