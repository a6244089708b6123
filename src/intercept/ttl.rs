//! Per-endpoint TTL selection.

const MINUTE_MS: u64 = 60 * 1000;

/// Client collections rarely change.
pub const COLLECTION_TTL_MS: u64 = 10 * MINUTE_MS;
/// Policies change more often.
pub const POLICY_TTL_MS: u64 = 5 * MINUTE_MS;
/// Per-user profile data changes most often.
pub const PROFILE_TTL_MS: u64 = 2 * MINUTE_MS;
pub const FALLBACK_TTL_MS: u64 = 5 * MINUTE_MS;

/// Returns the TTL for a cached response of `url`.
///
/// Rules are checked in order and the first match wins, so a profile route
/// nested under `/clientes` keeps the collection TTL.
pub fn ttl_for_url(url: &str) -> u64 {
    if url.contains("/clientes") && !url.contains("/UpdateMyInfo") {
        return COLLECTION_TTL_MS;
    }

    if url.contains("/Polizas") || url.contains("/polizas") {
        return POLICY_TTL_MS;
    }

    if url.contains("/User/") || url.contains("/mi-perfil") || url.contains("/mi-cliente") {
        return PROFILE_TTL_MS;
    }

    FALLBACK_TTL_MS
}
