//! Reference into a return series.
//!
//! A window never copies returns; it lists contiguous segments of the source
//! series, each of which may wrap past the series end.

use serde::{Deserialize, Serialize};

/// Contiguous run of `len` returns starting at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSegment {
    /// First index into the series.
    pub start: usize,
    /// Number of returns taken.
    pub len: usize,
}

/// The returns used by one simulated path.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SampleWindow {
    segments: Vec<WindowSegment>,
}

impl SampleWindow {
    /// A window made of a single segment.
    #[must_use]
    pub fn contiguous(start: usize, len: usize) -> Self {
        Self {
            segments: vec![WindowSegment { start, len }],
        }
    }

    /// A window built from several segments.
    #[must_use]
    pub fn from_segments(segments: Vec<WindowSegment>) -> Self {
        Self { segments }
    }

    #[must_use]
    pub fn segments(&self) -> &[WindowSegment] {
        &self.segments
    }

    /// Start index of the first segment.
    #[must_use]
    pub fn start(&self) -> usize {
        self.segments.first().map_or(0, |s| s.start)
    }

    /// Total number of returns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.iter().map(|s| s.len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any segment runs past the end of a series of `series_len`.
    #[must_use]
    pub fn wraps(&self, series_len: usize) -> bool {
        self.segments.iter().any(|s| s.start + s.len > series_len)
    }

    /// Series indices in path order, reduced modulo `series_len`.
    pub fn indices(&self, series_len: usize) -> impl Iterator<Item = usize> + '_ {
        self.segments
            .iter()
            .flat_map(move |s| (s.start..s.start + s.len).map(move |i| i % series_len))
    }
}
