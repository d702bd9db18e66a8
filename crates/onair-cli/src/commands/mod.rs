//! CLI command implementations.

pub mod check;
pub mod common;
pub mod dot;
pub mod eval;
pub mod sample;
pub mod templates;
