//src/types.rs

use std::fmt::Write;

use crate::window_reader::CursorSnapshot;

/// One report row per window: the three location columns followed by the
/// configured count pairs. Columns are space separated, matching the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowReportRow {
    pub line_number: u64,
    pub line_offset: u64,
    pub sequence_offset: u64,
    pub values: Vec<u64>,
}

impl WindowReportRow {
    pub fn new(start: CursorSnapshot, values: Vec<u64>) -> Self {
        Self {
            line_number: start.line_number,
            line_offset: start.line_offset,
            sequence_offset: start.sequence_offset,
            values,
        }
    }

    pub fn to_line(&self) -> String {
        let mut line = format!(
            "{} {} {}",
            self.line_number, self.line_offset, self.sequence_offset
        );
        for value in &self.values {
            write!(line, " {value}").unwrap();
        }
        line
    }
}

/// Match counts for one segment of a scanned file: totals per direction plus
/// per-bucket counts locating the matches within the reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentReportRow {
    pub section: u64,
    pub forward: u64,
    pub backward: u64,
    pub forward_buckets: Vec<u64>,
    pub backward_buckets: Vec<u64>,
}

impl SegmentReportRow {
    /// Comma delimited: section, forward, backward, forward buckets,
    /// backward buckets.
    pub fn to_line(&self) -> String {
        let mut line = format!("{},{},{}", self.section, self.forward, self.backward);
        for bucket in self.forward_buckets.iter().chain(&self.backward_buckets) {
            write!(line, ",{bucket}").unwrap();
        }
        line
    }
}

/// Whole-file scan totals: windows matched forward, matched backward,
/// matched in either direction, and matched in neither.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub index_file: String,
    pub scan_file: String,
    pub forward: u64,
    pub backward: u64,
    pub found: u64,
    pub not_found: u64,
}

impl ScanSummary {
    pub fn to_line(&self) -> String {
        format!(
            "{},{},{},{},{},{}",
            self.index_file, self.scan_file, self.forward, self.backward, self.found, self.not_found
        )
    }
}
