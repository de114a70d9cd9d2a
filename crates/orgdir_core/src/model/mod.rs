//! Directory domain model.
//!
//! # Responsibility
//! - Define the records held by the entity store.
//! - Keep identifiers as plain integer keys shared with the relational schema.
//!
//! # Invariants
//! - Every entity is identified by a stable integer id.
//! - Records are read-only while the service is serving.

pub mod activity;
pub mod building;
pub mod organization;
