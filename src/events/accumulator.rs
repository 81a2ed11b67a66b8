//! Accumulates decoded events into per-kind, per-tag series.

use std::collections::VecDeque;
use std::io::Read;

use prost::Message;
use tracing::{debug, warn};

use super::proto::{Event, SessionLog, SummaryPayload};
use super::record::RecordReader;
use crate::core::{OrderedSeries, RawSeriesSet, RawSummary, ScalarSample, SizeGuidance, Stepped, SummaryKind, TagIndex};
use crate::{ExportError, ExportResult};

/// How events are retained while loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccumulatorOptions {
    pub size_guidance: SizeGuidance,
    /// Drop samples left behind by a run that restarted from an earlier step.
    pub purge_orphaned: bool,
}

impl Default for AccumulatorOptions {
    fn default() -> Self {
        AccumulatorOptions { size_guidance: SizeGuidance::default(), purge_orphaned: true }
    }
}

type Reservoir<T> = OrderedSeries<VecDeque<T>>;

/// Builds a `TagIndex` from a stream of events.
///
/// Tags are registered in the order they are first seen. Each tag keeps at
/// most `size_guidance.cap(kind)` of its most recent samples (all when 0).
pub struct EventAccumulator {
    options: AccumulatorOptions,
    scalars: Reservoir<ScalarSample>,
    histograms: Reservoir<RawSummary>,
    compressed_histograms: Reservoir<RawSummary>,
    images: Reservoir<RawSummary>,
    audio: Reservoir<RawSummary>,
    tensors: Reservoir<RawSummary>,
    file_version: Option<f32>,
    most_recent_step: i64,
    events_seen: usize,
}

impl EventAccumulator {
    pub fn new(options: AccumulatorOptions) -> Self {
        EventAccumulator {
            options,
            scalars: Reservoir::new(),
            histograms: Reservoir::new(),
            compressed_histograms: Reservoir::new(),
            images: Reservoir::new(),
            audio: Reservoir::new(),
            tensors: Reservoir::new(),
            file_version: None,
            most_recent_step: -1,
            events_seen: 0,
        }
    }

    pub fn events_seen(&self) -> usize {
        self.events_seen
    }

    pub fn file_version(&self) -> Option<f32> {
        self.file_version
    }

    /// Decode and process every record of `reader`. Returns the number of events read.
    pub fn ingest<R: Read>(&mut self, mut reader: RecordReader<R>) -> ExportResult<usize> {
        let mut count = 0;
        while let Some(bytes) = reader.read_record()? {
            let event = Event::decode(bytes.as_slice()).map_err(|e| {
                ExportError::log_read(
                    reader.path(),
                    format!("record {}: failed to decode event: {e}", reader.records_read() - 1),
                )
            })?;
            self.process_event(event);
            count += 1;
        }
        debug!(path = %reader.path().display(), events = count, "ingested event file");
        Ok(count)
    }

    pub fn process_event(&mut self, event: Event) {
        self.events_seen += 1;
        if let Some(version) = event.parsed_file_version() {
            debug!(file_version = %event.file_version, "event file version");
            self.file_version = Some(version);
        }
        self.maybe_purge_orphaned(&event);

        let Some(summary) = event.summary else {
            return;
        };
        let guidance = self.options.size_guidance;
        for value in summary.value {
            let Some(payload) = value.payload else {
                continue;
            };
            let raw = |payload: Vec<u8>| RawSummary { wall_time: event.wall_time, step: event.step, payload };
            match payload {
                SummaryPayload::SimpleValue(v) => push_capped(
                    self.scalars.entry(&value.tag),
                    ScalarSample::new(event.wall_time, event.step, v),
                    guidance.cap(SummaryKind::Scalars),
                ),
                SummaryPayload::Histo(bytes) => {
                    push_capped(
                        self.compressed_histograms.entry(&value.tag),
                        raw(bytes.clone()),
                        guidance.cap(SummaryKind::CompressedHistograms),
                    );
                    push_capped(self.histograms.entry(&value.tag), raw(bytes), guidance.cap(SummaryKind::Histograms));
                }
                SummaryPayload::Image(bytes) => {
                    push_capped(self.images.entry(&value.tag), raw(bytes), guidance.cap(SummaryKind::Images))
                }
                SummaryPayload::Audio(bytes) => {
                    push_capped(self.audio.entry(&value.tag), raw(bytes), guidance.cap(SummaryKind::Audio))
                }
                SummaryPayload::Tensor(bytes) => {
                    // tensor summaries may be named by node only
                    let tag = if value.tag.is_empty() { &value.node_name } else { &value.tag };
                    push_capped(self.tensors.entry(tag), raw(bytes), guidance.cap(SummaryKind::Tensors))
                }
                SummaryPayload::ObsoleteOldStyleHistogram(_) => {}
            }
        }
    }

    fn maybe_purge_orphaned(&mut self, event: &Event) {
        if !self.options.purge_orphaned {
            return;
        }
        if self.file_version.is_some_and(|v| v >= 2.0) {
            if event.session_log.as_ref().is_some_and(SessionLog::is_start) {
                self.purge(event.step, None);
            }
            return;
        }
        match &event.summary {
            Some(summary) if event.step < self.most_recent_step => {
                let tags: Vec<&str> = summary.value.iter().map(|v| v.tag.as_str()).collect();
                self.purge(event.step, Some(tags.as_slice()));
            }
            _ => self.most_recent_step = event.step,
        }
    }

    /// Remove samples with `step >= step`, from `tags` only or from every tag.
    fn purge(&mut self, step: i64, tags: Option<&[&str]>) {
        let removed = [
            (SummaryKind::Scalars, expire(&mut self.scalars, step, tags)),
            (SummaryKind::Histograms, expire(&mut self.histograms, step, tags)),
            (SummaryKind::CompressedHistograms, expire(&mut self.compressed_histograms, step, tags)),
            (SummaryKind::Images, expire(&mut self.images, step, tags)),
            (SummaryKind::Audio, expire(&mut self.audio, step, tags)),
            (SummaryKind::Tensors, expire(&mut self.tensors, step, tags)),
        ];
        let total: usize = removed.iter().map(|(_, n)| n).sum();
        if total == 0 {
            return;
        }
        let detail: Vec<String> = removed
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(kind, n)| format!("{kind}={n}"))
            .collect();
        let cause = if tags.is_some() { "out-of-order step" } else { "session restart" };
        warn!(step, removed = total, detail = %detail.join(" "), "purged orphaned events after {cause}");
    }

    pub fn into_index(self) -> TagIndex {
        let raw = RawSeriesSet {
            histograms: self.histograms.map_series(Vec::from),
            compressed_histograms: self.compressed_histograms.map_series(Vec::from),
            images: self.images.map_series(Vec::from),
            audio: self.audio.map_series(Vec::from),
            tensors: self.tensors.map_series(Vec::from),
        };
        TagIndex::new(self.scalars.map_series(Vec::from), raw)
    }
}

fn push_capped<T>(series: &mut VecDeque<T>, item: T, cap: usize) {
    if cap > 0 {
        while series.len() >= cap {
            series.pop_front();
        }
    }
    series.push_back(item);
}

fn expire<T: Stepped>(reservoir: &mut Reservoir<T>, step: i64, tags: Option<&[&str]>) -> usize {
    fn retain<T: Stepped>(series: &mut VecDeque<T>, step: i64) -> usize {
        let before = series.len();
        series.retain(|item| item.step() < step);
        before - series.len()
    }
    match tags {
        None => reservoir.series_mut().map(|series| retain(series, step)).sum(),
        Some(tags) => tags.iter().filter_map(|tag| reservoir.get_mut(tag).map(|series| retain(series, step))).sum(),
    }
}
