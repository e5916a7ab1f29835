//! Error taxonomy (§7). Only misconfiguration that a caller can actually
//! correct is surfaced here; everything else (a parallel ray, a
//! degenerate AO frame, a zero-length shadow ray, an empty scene) is
//! absorbed locally by the nearest computation and degrades gracefully
//! to "no contribution", per policy.

use displaydoc::Display;

#[derive(Debug, Display)]
pub enum RenderError {
    /// anti-aliasing factor must be one of 2, 4, 8, 16 (got {0})
    InvalidAntiAliasingFactor(u32),
    /// thread count must be at least 1
    InvalidThreadCount,
    /// render target dimensions must be non-zero
    EmptyFrame,
}

impl std::error::Error for RenderError {}
