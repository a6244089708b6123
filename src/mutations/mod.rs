//! Mutations Module
//!
//! Create/update/delete requests against the clients/policies API, with the
//! cache invalidation each one triggers.

mod gateway;
mod rules;

pub use gateway::MutationGateway;
pub use rules::{classify, invalidation_patterns, Mutation, Resource};
