//! Invalidation rules for mutating operations.
//!
//! Which cached views go stale when a resource changes. Deleting a client
//! also deletes its policies, so it cascades to the policy views.

use axum::http::Method;

use crate::intercept::HttpRequest;

const CLIENT_PATTERNS: &[&str] = &["clientes", "Clientes"];
const POLICY_PATTERNS: &[&str] = &["Polizas", "polizas"];
const CLIENT_CASCADE_PATTERNS: &[&str] = &["clientes", "Clientes", "Polizas", "polizas"];

/// Resource types exposed by the clients/policies API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Clientes,
    Polizas,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Create,
    Update,
    Delete,
}

/// Patterns to invalidate after `mutation` on `resource` succeeds.
pub fn invalidation_patterns(resource: Resource, mutation: Mutation) -> &'static [&'static str] {
    match (resource, mutation) {
        (Resource::Clientes, Mutation::Delete) => CLIENT_CASCADE_PATTERNS,
        (Resource::Clientes, _) => CLIENT_PATTERNS,
        (Resource::Polizas, _) => POLICY_PATTERNS,
    }
}

// == Classify ==
/// Works out which resource a request mutates, if any.
///
/// The first path segment naming a known resource decides. `POST …/cancelar`
/// updates an existing policy rather than creating one.
pub fn classify(request: &HttpRequest) -> Option<(Resource, Mutation)> {
    let path = request
        .url
        .split_once("://")
        .map_or(request.url.as_str(), |(_, rest)| rest);

    let resource = path.split('/').find_map(|segment| {
        match segment.to_ascii_lowercase().as_str() {
            "clientes" => Some(Resource::Clientes),
            "polizas" => Some(Resource::Polizas),
            _ => None,
        }
    })?;

    let mutation = match request.method {
        Method::POST if path.trim_end_matches('/').ends_with("/cancelar") => Mutation::Update,
        Method::POST => Mutation::Create,
        Method::PUT | Method::PATCH => Mutation::Update,
        Method::DELETE => Mutation::Delete,
        _ => return None,
    };

    Some((resource, mutation))
}
