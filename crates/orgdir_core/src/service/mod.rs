//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into directory query APIs.
//! - Keep the HTTP boundary decoupled from storage details.

pub mod activity_tree;
pub mod directory_service;
