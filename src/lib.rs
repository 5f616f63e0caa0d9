// src/lib.rs
pub mod analytics;
pub mod error;
pub mod scan;
pub mod suffix_tree;
pub mod types;
pub mod window_reader;

use std::fs::File;
use std::io::{Read, Seek, Write};

pub use crate::error::Error;

use crate::analytics::{generate_counts, CountsConfig};
use crate::scan::{open_sequence_reader, read_reference_slice, read_up_to, scan_segment, scan_totals};
use crate::suffix_tree::SuffixTree;
use crate::types::{ScanSummary, SegmentReportRow, WindowReportRow};
use crate::window_reader::{validate_window_params, WindowReader};

/// Breaks the file at `path` into overlapping windows, builds a suffix tree
/// per window, and writes one report row per window to `out`. Returns the
/// number of windows reported.
pub fn window_reports(
    path: &str,
    window_size: u64,
    overlap: u64,
    config: &CountsConfig,
    out: &mut dyn Write,
) -> Result<u64, Error> {
    // Configuration problems surface before any file is touched.
    config.validate()?;
    validate_window_params(window_size, overlap)?;
    let file = File::open(path).map_err(|source| Error::OpenFile {
        path: path.to_string(),
        source,
    })?;
    window_reports_from(file, window_size, overlap, config, out)
}

/// Seekable-stream form of [`window_reports`], used directly by the tests.
pub fn window_reports_from<R: Read + Seek>(
    input: R,
    window_size: u64,
    overlap: u64,
    config: &CountsConfig,
    out: &mut dyn Write,
) -> Result<u64, Error> {
    config.validate()?;
    let mut reader = WindowReader::new(input, window_size, overlap)?;
    let mut buf = Vec::with_capacity(window_size as usize);
    let mut windows = 0u64;

    writeln!(out, "{}", config.header_line())?;
    while let Some(start) = reader.next_window(&mut buf)? {
        let mut tree = SuffixTree::build(&buf);
        log::debug!(
            "window {} at sequence offset {}: {} nodes",
            windows,
            start.sequence_offset,
            tree.node_count()
        );
        let values = generate_counts(&mut tree, config);
        let row = WindowReportRow::new(start, values);
        writeln!(out, "{}", row.to_line())?;
        reader.rewind_overlap()?;
        windows += 1;
    }
    Ok(windows)
}

/// Indexes a slice of the reference file, then scans the second file segment
/// by segment, writing one bucketed match row per complete segment. Returns
/// the number of segments scanned.
pub fn segment_compare(
    reference_path: &str,
    start_offset: u64,
    reference_len: u64,
    scan_path: &str,
    segment_size: u64,
    window_size: u64,
    out: &mut dyn Write,
) -> Result<u64, Error> {
    if reference_len == 0 {
        return Err(Error::ZeroSize {
            name: "reference length",
        });
    }
    if segment_size == 0 {
        return Err(Error::ZeroSize {
            name: "segment size",
        });
    }
    if window_size == 0 {
        return Err(Error::ZeroSize {
            name: "window size",
        });
    }

    let reference = read_reference_slice(reference_path, start_offset, reference_len)?;
    let tree = SuffixTree::build(&reference);
    let buckets_per_segment = (reference_len / segment_size) as usize;
    log::info!(
        "indexed {} reference bytes into {} nodes, {} buckets per segment",
        reference.len(),
        tree.node_count(),
        buckets_per_segment
    );

    let mut reader = open_sequence_reader(scan_path)?;
    let mut segment = vec![0u8; segment_size as usize];
    let mut section = 0u64;
    while read_up_to(reader.as_mut(), &mut segment)? == segment.len() {
        let row: SegmentReportRow = scan_segment(
            &tree,
            &segment,
            segment_size,
            window_size as usize,
            buckets_per_segment,
            section,
        );
        writeln!(out, "{}", row.to_line())?;
        section += 1;
    }
    Ok(section)
}

/// Indexes the whole of `index_path`, scans `scan_path` in fixed windows in
/// both orientations, and returns the match totals.
pub fn scan_summary(
    index_path: &str,
    scan_path: &str,
    window_size: u64,
) -> Result<ScanSummary, Error> {
    if window_size == 0 {
        return Err(Error::ZeroSize {
            name: "window size",
        });
    }

    let mut index = Vec::new();
    open_sequence_reader(index_path)?.read_to_end(&mut index)?;
    let tree = SuffixTree::build(&index);
    log::info!(
        "indexed {} bytes from '{}' into {} nodes",
        index.len(),
        index_path,
        tree.node_count()
    );

    let mut reader = open_sequence_reader(scan_path)?;
    let (forward, backward, found, not_found) =
        scan_totals(&tree, reader.as_mut(), window_size as usize)?;
    Ok(ScanSummary {
        index_file: index_path.to_string(),
        scan_file: scan_path.to_string(),
        forward,
        backward,
        found,
        not_found,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn report_lines(input: &[u8], window_size: u64, overlap: u64, config: &CountsConfig) -> Vec<String> {
        let mut out = Vec::new();
        let windows = window_reports_from(
            Cursor::new(input.to_vec()),
            window_size,
            overlap,
            config,
            &mut out,
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        assert_eq!(lines.len() as u64, windows + 1, "header plus one row per window");
        lines
    }

    #[test]
    fn window_report_rows_carry_the_window_start() {
        // 40 bases, windows of 20 sharing 5: exactly two full windows.
        let input = b"ACGTACGTACGTACGTACGTACGTACGTACGTACGTACGT";
        let lines = report_lines(input, 20, 5, &CountsConfig::default());
        assert_eq!(lines[0], "# LineNo LineOffset SeqOffset Nodes Substrings");
        assert!(lines[1].starts_with("0 0 0 "));
        assert!(lines[2].starts_with("0 15 15 "));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn identical_windows_report_identical_counts() {
        let input = b"ACGTACGTACGTACGTACGTACGTACGTACGTACGTACGT";
        let lines = report_lines(input, 20, 0, &CountsConfig::default());
        let values = |line: &str| {
            line.split(' ').skip(3).map(str::to_string).collect::<Vec<_>>()
        };
        assert_eq!(values(&lines[1]), values(&lines[2]));
    }

    #[test]
    fn comments_do_not_reach_the_windows() {
        let mut input = Vec::new();
        input.extend_from_slice(b">seq1 assembled\n");
        input.extend_from_slice(b"ACGTACGTAC\n");
        input.extend_from_slice(b">seq2\n");
        input.extend_from_slice(b"GTACGTACGT\n");
        let lines = report_lines(&input, 10, 0, &CountsConfig::default());
        // Two windows of ten bases each, none of the header bytes counted.
        // The first row reports the cursor before its comment was consumed.
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("0 0 0 "));
        assert!(lines[2].starts_with("1 11 10 "));
    }

    #[test]
    fn chunked_reports_emit_one_pair_per_interval() {
        let config = CountsConfig {
            depth_range: Some((0, 10)),
            interval_size: Some(5),
            ..Default::default()
        };
        let input = b"ACGTACGTACGTACGTACGT";
        let lines = report_lines(input, 10, 0, &config);
        assert!(lines[0].contains("Nodes(0,4)"));
        assert!(lines[0].contains("Nodes(5,9)"));
        let columns = lines[1].split(' ').count();
        assert_eq!(columns, 3 + config.pairs_len() * 2);
    }

    #[test]
    fn invalid_parameters_fail_before_any_output() {
        let mut out = Vec::new();
        let err = window_reports_from(
            Cursor::new(b"ACGTACGTACGT".to_vec()),
            5,
            0,
            &CountsConfig::default(),
            &mut out,
        )
        .unwrap_err();
        assert!(matches!(err, Error::WindowSizeOutOfRange(5)));
        assert!(out.is_empty());
    }

    #[test]
    fn configuration_is_checked_before_the_file_is_opened() {
        // The missing file would be an OpenFile error; the bad window size
        // must win because validation runs first.
        let mut out = Vec::new();
        let err = window_reports(
            "/no/such/file.fa",
            5,
            0,
            &CountsConfig::default(),
            &mut out,
        )
        .unwrap_err();
        assert!(matches!(err, Error::WindowSizeOutOfRange(5)));
    }

    #[test]
    fn scan_summary_requires_a_window_size() {
        assert!(matches!(
            scan_summary("a", "b", 0),
            Err(Error::ZeroSize { .. })
        ));
    }
}
