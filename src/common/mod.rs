// Common types shared across the crate

pub mod types;

pub use types::{Binding, Quad, Solution, Term};
