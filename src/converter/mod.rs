//! Shared building blocks used by the generators.

pub mod entities;
pub mod placeholder;
pub mod whitespace;
