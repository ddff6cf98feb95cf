// Result Streaming Module
//
// Bridges the engine's push-style result sources into pull-style,
// backpressure-aware sequences and drains them into memory.

pub mod push;
pub mod sequence;
pub mod drain;

pub use push::{Flow, IterSource, MapSource, PushSource, SourceEvent};
pub use sequence::{LazySequence, DEFAULT_HIGH_WATER_MARK};
pub use drain::{drain_to_collection, drain_to_text};
