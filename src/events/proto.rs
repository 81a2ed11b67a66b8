//! The subset of TensorFlow's `event.proto` / `summary.proto` read by this crate.
//!
//! Field numbers match the upstream definitions; fields not declared here are
//! skipped by the decoder.

/// `tensorflow.Event`
#[derive(Clone, PartialEq, prost::Message)]
pub struct Event {
    #[prost(double, tag = "1")]
    pub wall_time: f64,
    #[prost(int64, tag = "2")]
    pub step: i64,
    /// Set only on the first event of a file, e.g. `brain.Event:2`.
    #[prost(string, tag = "3")]
    pub file_version: String,
    #[prost(message, optional, tag = "5")]
    pub summary: Option<Summary>,
    #[prost(message, optional, tag = "7")]
    pub session_log: Option<SessionLog>,
}

/// `tensorflow.Summary`
#[derive(Clone, PartialEq, prost::Message)]
pub struct Summary {
    #[prost(message, repeated, tag = "1")]
    pub value: Vec<SummaryValue>,
}

/// `tensorflow.Summary.Value`
#[derive(Clone, PartialEq, prost::Message)]
pub struct SummaryValue {
    #[prost(string, tag = "7")]
    pub node_name: String,
    #[prost(string, tag = "1")]
    pub tag: String,
    #[prost(oneof = "SummaryPayload", tags = "2, 3, 4, 5, 6, 8")]
    pub payload: Option<SummaryPayload>,
}

/// The `value` oneof of `Summary.Value`. Nested messages are kept encoded.
#[derive(Clone, PartialEq, prost::Oneof)]
pub enum SummaryPayload {
    #[prost(float, tag = "2")]
    SimpleValue(f32),
    #[prost(bytes, tag = "3")]
    ObsoleteOldStyleHistogram(Vec<u8>),
    #[prost(bytes, tag = "4")]
    Image(Vec<u8>),
    #[prost(bytes, tag = "5")]
    Histo(Vec<u8>),
    #[prost(bytes, tag = "6")]
    Audio(Vec<u8>),
    #[prost(bytes, tag = "8")]
    Tensor(Vec<u8>),
}

/// `tensorflow.SessionLog`
#[derive(Clone, PartialEq, prost::Message)]
pub struct SessionLog {
    #[prost(int32, tag = "1")]
    pub status: i32,
}

impl SessionLog {
    pub const START: i32 = 1;

    pub fn is_start(&self) -> bool {
        self.status == Self::START
    }
}

impl Event {
    /// Numeric version from `file_version`, e.g. `2.0` for `brain.Event:2`.
    ///
    /// `None` when the event carries no version; `-1.0` when it carries one
    /// that does not parse, which selects step-order purging.
    pub fn parsed_file_version(&self) -> Option<f32> {
        if self.file_version.is_empty() {
            return None;
        }
        let parsed = self.file_version.rsplit(':').next().and_then(|v| v.trim().parse().ok());
        Some(parsed.unwrap_or(-1.0))
    }
}
