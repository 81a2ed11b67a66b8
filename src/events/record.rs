//! TFRecord framing.
//!
//! Each record is laid out as:
//! `u64 length | u32 masked_crc(length) | payload | u32 masked_crc(payload)`,
//! all integers little-endian.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use super::crc32c;
use crate::{ExportError, ExportResult};

const HEADER_LEN: usize = 12;
const FOOTER_LEN: usize = 4;

/// Sequential reader over the records of one event file.
pub struct RecordReader<R> {
    inner: R,
    path: PathBuf,
    records_read: usize,
}

impl RecordReader<BufReader<File>> {
    pub fn open(path: &Path) -> ExportResult<Self> {
        let file = File::open(path).map_err(|e| ExportError::log_read(path, format!("failed to open file: {e}")))?;
        Ok(RecordReader::new(BufReader::new(file), path))
    }
}

impl<R: Read> RecordReader<R> {
    /// Wrap `inner`; `path` is only used to label errors.
    pub fn new(inner: R, path: impl Into<PathBuf>) -> Self {
        RecordReader { inner, path: path.into(), records_read: 0 }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records_read(&self) -> usize {
        self.records_read
    }

    /// Next record payload, or `None` at end of file.
    ///
    /// A record cut short by the end of the file also yields `None` (the
    /// writer may still be appending to it). A checksum mismatch is an error.
    pub fn read_record(&mut self) -> ExportResult<Option<Vec<u8>>> {
        let mut header = [0u8; HEADER_LEN];
        let got = self.read_full(&mut header)?;
        if got == 0 {
            return Ok(None);
        }
        if got < HEADER_LEN {
            return Ok(self.truncated(got));
        }

        let (len_bytes, len_crc) = header.split_at(8);
        let expected = u32::from_le_bytes([len_crc[0], len_crc[1], len_crc[2], len_crc[3]]);
        if crc32c::masked(len_bytes) != expected {
            return Err(self.corrupt("length checksum mismatch"));
        }
        let mut len_arr = [0u8; 8];
        len_arr.copy_from_slice(len_bytes);
        let len = u64::from_le_bytes(len_arr);

        // `len` is untrusted; the buffer grows with the bytes actually read.
        let mut payload = Vec::new();
        let got = (&mut self.inner)
            .take(len)
            .read_to_end(&mut payload)
            .map_err(|e| ExportError::log_read(&self.path, format!("read failed: {e}")))?;
        if (got as u64) < len {
            return Ok(self.truncated(HEADER_LEN + got));
        }
        let len = payload.len();

        let mut footer = [0u8; FOOTER_LEN];
        let got = self.read_full(&mut footer)?;
        if got < FOOTER_LEN {
            return Ok(self.truncated(HEADER_LEN + len + got));
        }
        if crc32c::masked(&payload) != u32::from_le_bytes(footer) {
            return Err(self.corrupt("payload checksum mismatch"));
        }

        self.records_read += 1;
        Ok(Some(payload))
    }

    /// Fill `buf` as far as the stream allows, returning the bytes read.
    fn read_full(&mut self, buf: &mut [u8]) -> ExportResult<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(ExportError::log_read(&self.path, format!("read failed: {e}"))),
            }
        }
        Ok(filled)
    }

    fn truncated(&self, bytes: usize) -> Option<Vec<u8>> {
        warn!(
            path = %self.path.display(),
            record = self.records_read,
            bytes,
            "truncated record at end of file, ignoring"
        );
        None
    }

    fn corrupt(&self, reason: &str) -> ExportError {
        ExportError::log_read(&self.path, format!("record {}: {reason}", self.records_read))
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = ExportResult<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}

/// Appends framed records to a writer.
pub struct RecordWriter<W> {
    inner: W,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W) -> Self {
        RecordWriter { inner }
    }

    pub fn write_record(&mut self, payload: &[u8]) -> std::io::Result<()> {
        let len = (payload.len() as u64).to_le_bytes();
        self.inner.write_all(&len)?;
        self.inner.write_all(&crc32c::masked(&len).to_le_bytes())?;
        self.inner.write_all(payload)?;
        self.inner.write_all(&crc32c::masked(payload).to_le_bytes())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framed(payloads: &[&[u8]]) -> Vec<u8> {
        let mut writer = RecordWriter::new(Vec::new());
        for p in payloads {
            writer.write_record(p).unwrap();
        }
        writer.into_inner()
    }

    #[test]
    fn test_reads_back_written_records() {
        let bytes = framed(&[b"first", b"", b"third record"]);
        let reader = RecordReader::new(bytes.as_slice(), "mem");
        let records: Vec<Vec<u8>> = reader.map(|r| r.unwrap()).collect();
        assert_eq!(records, vec![b"first".to_vec(), Vec::new(), b"third record".to_vec()]);
    }

    #[test]
    fn test_truncated_tail_is_end_of_stream() {
        let mut bytes = framed(&[b"complete", b"partial payload"]);
        bytes.truncate(bytes.len() - 6);

        let mut reader = RecordReader::new(bytes.as_slice(), "mem");
        assert_eq!(reader.read_record().unwrap(), Some(b"complete".to_vec()));
        assert_eq!(reader.read_record().unwrap(), None);
        assert_eq!(reader.records_read(), 1);
    }

    #[test]
    fn test_truncated_header_is_end_of_stream() {
        let mut bytes = framed(&[b"one"]);
        bytes.extend_from_slice(&[1, 2, 3]);

        let mut reader = RecordReader::new(bytes.as_slice(), "mem");
        assert!(reader.read_record().unwrap().is_some());
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_payload_corruption_is_an_error() {
        let mut bytes = framed(&[b"payload"]);
        bytes[HEADER_LEN] ^= 0xff;

        let mut reader = RecordReader::new(bytes.as_slice(), "corrupt.tfevents");
        let err = reader.read_record().unwrap_err();
        assert!(matches!(err, ExportError::LogRead { .. }));
        assert!(err.to_string().contains("payload checksum mismatch"));
    }

    #[test]
    fn test_length_corruption_is_an_error() {
        let mut bytes = framed(&[b"payload"]);
        bytes[0] ^= 0x01;

        let mut reader = RecordReader::new(bytes.as_slice(), "mem");
        let err = reader.read_record().unwrap_err();
        assert!(err.to_string().contains("length checksum mismatch"));
    }

    #[test]
    fn test_oversized_length_is_end_of_stream() {
        let len = (1u64 << 62).to_le_bytes();
        let mut bytes = len.to_vec();
        bytes.extend_from_slice(&crc32c::masked(&len).to_le_bytes());
        bytes.extend_from_slice(b"tiny");

        let mut reader = RecordReader::new(bytes.as_slice(), "huge.tfevents");
        assert_eq!(reader.read_record().unwrap(), None);
        assert_eq!(reader.records_read(), 0);
    }
}
