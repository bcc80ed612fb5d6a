//! Shared test vectors, generated with an independent implementation.

pub mod field;
pub mod group;
