//! Minimal TensorBoard event log reader.
//!
//! Event files are TFRecord streams of `Event` protocol buffers. This module
//! reads just enough of the format to build a `TagIndex`: record framing with
//! CRC32C checks, the `Event`/`Summary` messages, and TensorBoard's
//! accumulation rules (retention caps, orphaned data purging).

pub mod accumulator;
pub mod crc32c;
pub mod loader;
pub mod proto;
pub mod record;
pub mod writer;

// Re-export key types
pub use accumulator::{AccumulatorOptions, EventAccumulator};
pub use loader::{event_files, load, load_with_options};
pub use record::{RecordReader, RecordWriter};
pub use writer::EventFileWriter;
