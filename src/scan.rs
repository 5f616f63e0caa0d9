//src/scan.rs

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::Error;
use crate::suffix_tree::SuffixTree;
use crate::types::SegmentReportRow;

/// Complement of one base. Anything outside ACGT maps to 'x', which can
/// never match the indexed alphabet.
pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' => b'A',
        _ => b'x',
    }
}

/// In-place reverse complement: the two ends walk toward the center swapping
/// complemented bases, and an odd-length center complements itself.
pub fn reverse_complement(buf: &mut [u8]) {
    if buf.is_empty() {
        return;
    }
    let mut first = 0;
    let mut last = buf.len() - 1;
    while first < last {
        let temp = buf[first];
        buf[first] = complement(buf[last]);
        buf[last] = complement(temp);
        first += 1;
        last -= 1;
    }
    if first == last {
        buf[first] = complement(buf[first]);
    }
}

/// Opens a sequence file for reading, transparently decompressing `.gz`.
pub fn open_sequence_reader(path: &str) -> Result<Box<dyn BufRead>, Error> {
    let file = File::open(path).map_err(|source| Error::OpenFile {
        path: path.to_string(),
        source,
    })?;
    let is_gz = Path::new(path)
        .extension()
        .map(|ext| ext == "gz")
        .unwrap_or(false);
    Ok(if is_gz {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    })
}

/// Reads `len` bytes out of `path` starting `start_offset` bytes in.
/// The slice is taken over raw file bytes, exactly as stored.
pub fn read_reference_slice(path: &str, start_offset: u64, len: u64) -> Result<Vec<u8>, Error> {
    let mut reader = open_sequence_reader(path)?;
    io::copy(&mut reader.by_ref().take(start_offset), &mut io::sink())?;
    let mut buf = Vec::with_capacity(len as usize);
    let got = reader.take(len).read_to_end(&mut buf)? as u64;
    if got < len {
        return Err(Error::ShortRead {
            path: path.to_string(),
            got,
            expected: len,
        });
    }
    Ok(buf)
}

/// Fills `buf` from `reader`, reading past short reads until the buffer is
/// full or the stream ends. Returns the number of bytes read.
pub fn read_up_to<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// Looks up every complete window of `segment` in the reference tree, in
/// both orientations. Each hit lands in the bucket covering its position in
/// the reference, giving a coarse map of where the segment's content lives.
pub fn scan_segment(
    tree: &SuffixTree,
    segment: &[u8],
    segment_size: u64,
    window_size: usize,
    buckets_per_segment: usize,
    section: u64,
) -> SegmentReportRow {
    let mut row = SegmentReportRow {
        section,
        forward: 0,
        backward: 0,
        forward_buckets: vec![0; buckets_per_segment],
        backward_buckets: vec![0; buckets_per_segment],
    };
    let mut window = Vec::with_capacity(window_size);

    for chunk in segment.chunks_exact(window_size) {
        if let Some(position) = tree.find_substring(chunk) {
            row.forward += 1;
            let bucket = (position as u64 / segment_size) as usize;
            if bucket < buckets_per_segment {
                row.forward_buckets[bucket] += 1;
            }
        }
        window.clear();
        window.extend_from_slice(chunk);
        reverse_complement(&mut window);
        if let Some(position) = tree.find_substring(&window) {
            row.backward += 1;
            let bucket = (position as u64 / segment_size) as usize;
            if bucket < buckets_per_segment {
                row.backward_buckets[bucket] += 1;
            }
        }
    }
    row
}

/// Totals over a whole stream of fixed windows: matches in each orientation,
/// windows matched in either, and windows matched in neither.
pub fn scan_totals<R: Read + ?Sized>(
    tree: &SuffixTree,
    reader: &mut R,
    window_size: usize,
) -> io::Result<(u64, u64, u64, u64)> {
    let mut forward = 0u64;
    let mut backward = 0u64;
    let mut found = 0u64;
    let mut not_found = 0u64;
    let mut window = vec![0u8; window_size];

    while read_up_to(reader, &mut window)? == window_size {
        let mut hit = false;
        if tree.find_substring(&window).is_some() {
            forward += 1;
            hit = true;
        }
        reverse_complement(&mut window);
        if tree.find_substring(&window).is_some() {
            backward += 1;
            hit = true;
        }
        if hit {
            found += 1;
        } else {
            not_found += 1;
        }
    }
    Ok((forward, backward, found, not_found))
}
