use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use contracts::shared::analytics::{Combinator, Dimension, FilterSelection};
use contracts::system::auth::TokenClaims;

/// Caller identity left in the request extensions by `require_auth`.
/// A route mounted outside that layer has no claims and answers 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub TokenClaims);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<TokenClaims>() {
            Some(claims) => Ok(CurrentUser(claims.clone())),
            None => {
                tracing::debug!("No claims on {} {}", parts.method, parts.uri.path());
                Err(StatusCode::UNAUTHORIZED)
            }
        }
    }
}

/// The caller's token carries neither admin rights nor a pharmacy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("user {0} is not attached to a pharmacy")]
pub struct ScopeDenied(pub String);

/// Restrict a selection to what the caller may see.
///
/// Admins see everything they asked for. Everyone else is pinned to their
/// own pharmacy, whatever pharmacy set the request carried. When that adds
/// a pharmacy group the client never sent, an AND joins it so the client's
/// combinators still line up with the client's groups.
pub fn apply_scope(
    claims: &TokenClaims,
    mut selection: FilterSelection,
) -> Result<FilterSelection, ScopeDenied> {
    if claims.is_admin {
        return Ok(selection);
    }

    let pharmacy = claims
        .pharmacy_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ScopeDenied(claims.sub.clone()))?;

    let adds_group = selection.included(Dimension::Pharmacy).is_empty()
        && selection
            .exclusions
            .get(&Dimension::Pharmacy)
            .map_or(true, Vec::is_empty);

    selection.set_included(Dimension::Pharmacy, vec![pharmacy.to_string()]);
    if adds_group && !selection.combinators.is_empty() {
        selection.combinators.push(Combinator::And);
    }
    Ok(selection)
}
