//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the read-only entity store contract used by directory services.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository APIs never mutate persisted state.
//! - "No rows" is an empty result, not an error.

pub mod directory_repo;
