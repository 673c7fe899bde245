/// Route pattern parsing and path building
///
/// Patterns use `:name` for a placeholder that consumes one argument and
/// `*name` for a wildcard that consumes every remaining argument.

pub mod pattern;

pub use pattern::{classify_segment, PathPattern, Segment, SegmentKind};
