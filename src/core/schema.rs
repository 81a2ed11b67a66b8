//! Summary kinds, samples and retention guidance.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of summary a tag was recorded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryKind {
    Scalars,
    Histograms,
    CompressedHistograms,
    Images,
    Audio,
    Tensors,
}

impl SummaryKind {
    /// All kinds, in the order they are reported.
    pub const ALL: [SummaryKind; 6] = [
        SummaryKind::Scalars,
        SummaryKind::Histograms,
        SummaryKind::CompressedHistograms,
        SummaryKind::Images,
        SummaryKind::Audio,
        SummaryKind::Tensors,
    ];

    /// Name used by TensorBoard's tag listing.
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryKind::Scalars => "scalars",
            SummaryKind::Histograms => "histograms",
            SummaryKind::CompressedHistograms => "distributions",
            SummaryKind::Images => "images",
            SummaryKind::Audio => "audio",
            SummaryKind::Tensors => "tensors",
        }
    }
}

impl fmt::Display for SummaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded scalar observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalarSample {
    /// Seconds since the Unix epoch
    pub wall_time: f64,
    pub step: i64,
    pub value: f32,
}

impl ScalarSample {
    pub fn new(wall_time: f64, step: i64, value: f32) -> Self {
        ScalarSample { wall_time, step, value }
    }
}

/// A retained non-scalar summary. The payload is the encoded summary message
/// (histogram, image, audio or tensor) and is never interpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSummary {
    pub wall_time: f64,
    pub step: i64,
    pub payload: Vec<u8>,
}

/// Steps carried by anything kept in a series, used when purging orphaned data.
pub trait Stepped {
    fn step(&self) -> i64;
}

impl Stepped for ScalarSample {
    fn step(&self) -> i64 {
        self.step
    }
}

impl Stepped for RawSummary {
    fn step(&self) -> i64 {
        self.step
    }
}

/// Per-kind cap on how many of the most recent samples each tag retains.
///
/// A cap of `0` retains every sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizeGuidance {
    pub scalars: usize,
    pub histograms: usize,
    pub compressed_histograms: usize,
    pub images: usize,
    pub audio: usize,
    pub tensors: usize,
}

impl SizeGuidance {
    /// Same cap for every kind.
    pub fn uniform(cap: usize) -> Self {
        SizeGuidance {
            scalars: cap,
            histograms: cap,
            compressed_histograms: cap,
            images: cap,
            audio: cap,
            tensors: cap,
        }
    }

    pub fn cap(&self, kind: SummaryKind) -> usize {
        match kind {
            SummaryKind::Scalars => self.scalars,
            SummaryKind::Histograms => self.histograms,
            SummaryKind::CompressedHistograms => self.compressed_histograms,
            SummaryKind::Images => self.images,
            SummaryKind::Audio => self.audio,
            SummaryKind::Tensors => self.tensors,
        }
    }
}
