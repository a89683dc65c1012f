//! Text normalization and multi-engine result fusion.

mod aggregate;
mod normalize;

pub use aggregate::{aggregate, EngineResult};
pub use normalize::{Charset, TextNormalizer};
