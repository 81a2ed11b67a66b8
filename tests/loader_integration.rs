//! Integration tests for loading event log directories.

use std::io::Write;

use tb_export::ExportError;
use tb_export::core::{SizeGuidance, SummaryKind};
use tb_export::events::proto::SummaryPayload;
use tb_export::events::writer::event_file_name;
use tb_export::events::{AccumulatorOptions, EventFileWriter, load, load_with_options};

fn steps(index: &tb_export::core::TagIndex, tag: &str) -> Vec<i64> {
    index.scalars(tag).unwrap().iter().map(|s| s.step).collect()
}

#[test]
fn test_files_read_in_name_order() {
    let dir = tempfile::tempdir().unwrap();

    let mut early = EventFileWriter::create(&dir.path().join(event_file_name(100, "host"))).unwrap();
    early.add_scalar("loss", 1.0, 0, 100.0).unwrap();
    early.add_scalar("loss", 0.9, 1, 101.0).unwrap();
    early.flush().unwrap();

    let mut late = EventFileWriter::create(&dir.path().join(event_file_name(200, "host"))).unwrap();
    late.add_scalar("accuracy", 0.1, 2, 200.0).unwrap();
    late.add_scalar("loss", 0.8, 2, 200.0).unwrap();
    late.flush().unwrap();

    let index = load(dir.path(), &SizeGuidance::default()).unwrap();
    assert_eq!(index.scalar_tags(), vec!["loss", "accuracy"]);
    assert_eq!(steps(&index, "loss"), vec![0, 1, 2]);
}

#[test]
fn test_all_kinds_indexed() {
    let dir = tempfile::tempdir().unwrap();
    let mut writer = EventFileWriter::create_in(dir.path(), "host").unwrap();
    writer.add_scalar("loss", 1.0, 0, 1.0).unwrap();
    writer.add_summary("weights", SummaryPayload::Histo(vec![1]), 0, 1.0).unwrap();
    writer.add_summary("inputs", SummaryPayload::Image(vec![2]), 0, 1.0).unwrap();
    writer.add_summary("speech", SummaryPayload::Audio(vec![3]), 0, 1.0).unwrap();
    writer.add_summary("embedding", SummaryPayload::Tensor(vec![4]), 0, 1.0).unwrap();
    writer.flush().unwrap();

    let index = load(dir.path(), &SizeGuidance::default()).unwrap();
    assert_eq!(index.list_tags(SummaryKind::Scalars), vec!["loss"]);
    assert_eq!(index.list_tags(SummaryKind::Histograms), vec!["weights"]);
    assert_eq!(index.list_tags(SummaryKind::CompressedHistograms), vec!["weights"]);
    assert_eq!(index.list_tags(SummaryKind::Images), vec!["inputs"]);
    assert_eq!(index.list_tags(SummaryKind::Audio), vec!["speech"]);
    assert_eq!(index.list_tags(SummaryKind::Tensors), vec!["embedding"]);
    assert_eq!(index.raw(SummaryKind::Images, "inputs").unwrap()[0].payload, vec![2]);
}

#[test]
fn test_scalar_cap_keeps_latest_samples() {
    let dir = tempfile::tempdir().unwrap();
    let mut writer = EventFileWriter::create_in(dir.path(), "host").unwrap();
    for step in 0..20 {
        writer.add_scalars(&[("loss", step as f32), ("accuracy", 1.0)], step, step as f64).unwrap();
    }
    writer.flush().unwrap();

    let guidance = SizeGuidance { scalars: 5, ..SizeGuidance::default() };
    let index = load(dir.path(), &guidance).unwrap();
    assert_eq!(steps(&index, "loss"), vec![15, 16, 17, 18, 19]);
    assert_eq!(index.scalars("accuracy").unwrap().len(), 5);
}

#[test]
fn test_restart_purges_orphaned_steps() {
    let dir = tempfile::tempdir().unwrap();
    let mut first = EventFileWriter::create(&dir.path().join(event_file_name(100, "host"))).unwrap();
    first.add_session_start(0, 100.0).unwrap();
    for step in 0..6 {
        first.add_scalar("loss", 1.0, step, 100.0 + step as f64).unwrap();
    }
    first.flush().unwrap();

    // Resumed from the step-3 checkpoint
    let mut second = EventFileWriter::create(&dir.path().join(event_file_name(200, "host"))).unwrap();
    second.add_session_start(3, 200.0).unwrap();
    for step in 3..5 {
        second.add_scalar("loss", 0.5, step, 200.0 + step as f64).unwrap();
    }
    second.flush().unwrap();

    let index = load(dir.path(), &SizeGuidance::default()).unwrap();
    assert_eq!(steps(&index, "loss"), vec![0, 1, 2, 3, 4]);
    assert_eq!(index.scalars("loss").unwrap()[3].value, 0.5);

    let options = AccumulatorOptions { purge_orphaned: false, ..AccumulatorOptions::default() };
    let unpurged = load_with_options(dir.path(), options).unwrap();
    assert_eq!(steps(&unpurged, "loss"), vec![0, 1, 2, 3, 4, 5, 3, 4]);
}

#[test]
fn test_truncated_last_record_is_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(event_file_name(1, "host"));
    let mut writer = EventFileWriter::create(&path).unwrap();
    writer.add_scalar("loss", 1.0, 0, 1.0).unwrap();
    writer.add_scalar("loss", 2.0, 1, 2.0).unwrap();
    writer.flush().unwrap();
    drop(writer);

    let mut bytes = std::fs::read(&path).unwrap();
    bytes.truncate(bytes.len() - 3);
    std::fs::write(&path, bytes).unwrap();

    let index = load(dir.path(), &SizeGuidance::default()).unwrap();
    assert_eq!(steps(&index, "loss"), vec![0]);
}

#[test]
fn test_oversized_record_length_ends_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(event_file_name(1, "host"));
    let mut writer = EventFileWriter::create(&path).unwrap();
    writer.add_scalar("loss", 1.0, 0, 1.0).unwrap();
    writer.flush().unwrap();
    drop(writer);

    let len = (1u64 << 62).to_le_bytes();
    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(&len).unwrap();
    file.write_all(&tb_export::events::crc32c::masked(&len).to_le_bytes()).unwrap();
    file.write_all(b"tiny").unwrap();
    drop(file);

    let index = load(dir.path(), &SizeGuidance::default()).unwrap();
    assert_eq!(steps(&index, "loss"), vec![0]);
}

#[test]
fn test_corrupt_record_is_log_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(event_file_name(1, "host"));
    let mut writer = EventFileWriter::create(&path).unwrap();
    writer.add_scalar("loss", 1.0, 0, 1.0).unwrap();
    writer.flush().unwrap();
    drop(writer);

    let mut bytes = std::fs::read(&path).unwrap();
    let last = bytes.len() - 6;
    bytes[last] ^= 0x55;
    std::fs::write(&path, bytes).unwrap();

    let err = load(dir.path(), &SizeGuidance::default()).unwrap_err();
    assert!(matches!(err, ExportError::LogRead { .. }));
    assert!(err.to_string().contains("checksum mismatch"));
}

#[test]
fn test_undecodable_payload_is_log_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(event_file_name(1, "host"));
    let mut file = std::fs::File::create(&path).unwrap();
    let mut records = tb_export::events::RecordWriter::new(Vec::new());
    // field 1 declared as fixed64 but cut after two bytes
    records.write_record(&[0x09, 0x01, 0x02]).unwrap();
    file.write_all(&records.into_inner()).unwrap();
    drop(file);

    let err = load(dir.path(), &SizeGuidance::default()).unwrap_err();
    assert!(err.to_string().contains("failed to decode event"));
}

#[test]
fn test_single_file_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.tfevents");
    let mut writer = EventFileWriter::create(&path).unwrap();
    writer.add_scalar("loss", 1.0, 7, 1.0).unwrap();
    writer.flush().unwrap();

    let index = load(&path, &SizeGuidance::default()).unwrap();
    assert_eq!(steps(&index, "loss"), vec![7]);
}

#[test]
fn test_empty_directory_is_log_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load(dir.path(), &SizeGuidance::default()).unwrap_err();
    assert!(matches!(err, ExportError::LogRead { .. }));
}
