//! Use-case services layered over the quote store.
//!
//! # Responsibility
//! - Keep display-related preferences (category filter, last viewed quote)
//!   out of the store itself.

pub mod display_service;
