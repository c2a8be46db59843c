//! In-memory note search.
//!
//! # Responsibility
//! - Derive the displayed subset of notes from the active query text.
//!
//! # Invariants
//! - Filtering is pure and order-preserving.

pub mod filter;
