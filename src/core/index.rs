//! Read-only index of every tag found in an event log.

use std::collections::BTreeMap;

use super::schema::{RawSummary, ScalarSample, SummaryKind};
use super::series::OrderedSeries;

/// All tags of a loaded log directory, grouped by summary kind.
///
/// Built once by the loader and never mutated afterwards. Within each kind,
/// tags iterate in the order they were first seen in the log.
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    scalars: OrderedSeries<Vec<ScalarSample>>,
    histograms: OrderedSeries<Vec<RawSummary>>,
    compressed_histograms: OrderedSeries<Vec<RawSummary>>,
    images: OrderedSeries<Vec<RawSummary>>,
    audio: OrderedSeries<Vec<RawSummary>>,
    tensors: OrderedSeries<Vec<RawSummary>>,
}

/// Non-scalar series of a `TagIndex`, one per kind.
#[derive(Debug, Clone, Default)]
pub struct RawSeriesSet {
    pub histograms: OrderedSeries<Vec<RawSummary>>,
    pub compressed_histograms: OrderedSeries<Vec<RawSummary>>,
    pub images: OrderedSeries<Vec<RawSummary>>,
    pub audio: OrderedSeries<Vec<RawSummary>>,
    pub tensors: OrderedSeries<Vec<RawSummary>>,
}

impl TagIndex {
    pub fn new(scalars: OrderedSeries<Vec<ScalarSample>>, raw: RawSeriesSet) -> Self {
        TagIndex {
            scalars,
            histograms: raw.histograms,
            compressed_histograms: raw.compressed_histograms,
            images: raw.images,
            audio: raw.audio,
            tensors: raw.tensors,
        }
    }

    /// Index holding only scalar series.
    pub fn from_scalars(scalars: OrderedSeries<Vec<ScalarSample>>) -> Self {
        TagIndex { scalars, ..TagIndex::default() }
    }

    fn raw_series(&self, kind: SummaryKind) -> Option<&OrderedSeries<Vec<RawSummary>>> {
        match kind {
            SummaryKind::Scalars => None,
            SummaryKind::Histograms => Some(&self.histograms),
            SummaryKind::CompressedHistograms => Some(&self.compressed_histograms),
            SummaryKind::Images => Some(&self.images),
            SummaryKind::Audio => Some(&self.audio),
            SummaryKind::Tensors => Some(&self.tensors),
        }
    }

    /// Tags of one kind in discovery order.
    pub fn list_tags(&self, kind: SummaryKind) -> Vec<&str> {
        match self.raw_series(kind) {
            Some(series) => series.tags().collect(),
            None => self.scalars.tags().collect(),
        }
    }

    /// Tags of every kind, kinds in `SummaryKind::ALL` order.
    pub fn tags(&self) -> Vec<(SummaryKind, Vec<&str>)> {
        SummaryKind::ALL.iter().map(|&kind| (kind, self.list_tags(kind))).collect()
    }

    pub fn scalar_tags(&self) -> Vec<&str> {
        self.scalars.tags().collect()
    }

    /// Samples recorded for a scalar tag, in append order.
    pub fn scalars(&self, tag: &str) -> Option<&[ScalarSample]> {
        self.scalars.get(tag).map(Vec::as_slice)
    }

    pub fn scalar_series(&self) -> &OrderedSeries<Vec<ScalarSample>> {
        &self.scalars
    }

    /// Retained summaries of a non-scalar tag. Always `None` for scalars.
    pub fn raw(&self, kind: SummaryKind, tag: &str) -> Option<&[RawSummary]> {
        self.raw_series(kind)?.get(tag).map(Vec::as_slice)
    }

    /// Number of tags per kind, keyed by kind name.
    pub fn tag_counts(&self) -> BTreeMap<String, usize> {
        SummaryKind::ALL
            .iter()
            .map(|&kind| (kind.as_str().to_string(), self.list_tags(kind).len()))
            .collect()
    }

    /// True when no tag of any kind was found.
    pub fn is_empty(&self) -> bool {
        SummaryKind::ALL.iter().all(|&kind| self.list_tags(kind).is_empty())
    }
}
