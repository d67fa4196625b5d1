//! Text collaborators of the enrichment stages.
//!
//! Both are plain synchronous computations behind small traits, so a stage
//! can be driven by a different implementation (or a failing one in tests).

mod lexicon;
mod sentiment;
mod summarizer;
mod text;

pub use sentiment::{LexiconAnalyzer, PolarityAnalyzer};
pub use summarizer::{LsaSummarizer, Summarizer};
