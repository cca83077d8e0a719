//! Read-only view models projected from the canonical store.

pub mod catalog;
