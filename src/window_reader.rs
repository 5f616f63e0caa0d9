//src/window_reader.rs

use std::io::{self, BufRead, BufReader, Read, Seek};

use crate::error::Error;

pub const MIN_WINDOW_SIZE: u64 = 10;
pub const MAX_WINDOW_SIZE: u64 = 100_000_000;
pub const MAX_OVERLAP: u64 = 1_000_000;

/// Location of a window start in the source file: line number, offset within
/// the line, and offset within the sequence (bases and Ns only).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorSnapshot {
    pub line_number: u64,
    pub line_offset: u64,
    pub sequence_offset: u64,
}

/// Live location counters plus a shadow copy taken where the next window
/// will start. Stepping the stream back lands between the two, so the
/// shadow is what the counters roll back to.
#[derive(Debug, Default)]
struct WindowCursor {
    line_number: u64,
    line_offset: u64,
    sequence_offset: u64,
    shadow: Option<CursorSnapshot>,
}

impl WindowCursor {
    fn snapshot(&self) -> CursorSnapshot {
        CursorSnapshot {
            line_number: self.line_number,
            line_offset: self.line_offset,
            sequence_offset: self.sequence_offset,
        }
    }

    fn mark(&mut self) {
        self.shadow = Some(self.snapshot());
    }

    fn restore(&mut self) {
        if let Some(shadow) = self.shadow.take() {
            self.line_number = shadow.line_number;
            self.line_offset = shadow.line_offset;
            self.sequence_offset = shadow.sequence_offset;
        }
    }
}

pub fn validate_window_params(window_size: u64, overlap: u64) -> Result<(), Error> {
    if !(MIN_WINDOW_SIZE..=MAX_WINDOW_SIZE).contains(&window_size) {
        return Err(Error::WindowSizeOutOfRange(window_size));
    }
    if overlap > MAX_OVERLAP {
        return Err(Error::OverlapOutOfRange(overlap));
    }
    if overlap >= window_size {
        return Err(Error::OverlapTooLarge {
            overlap,
            window_size,
        });
    }
    Ok(())
}

/// Streams fixed-size windows of normalized bases out of a FASTA-like file.
///
/// Comment lines start with '>' and run to the end of the line. Lowercase
/// bases are folded to uppercase, 'N' advances the sequence offset without
/// entering the window, and every other byte is skipped. Consecutive windows
/// share `overlap` bases; after each full window the caller steps the stream
/// back with [`rewind_overlap`](Self::rewind_overlap).
pub struct WindowReader<R: Read + Seek> {
    inner: BufReader<R>,
    window_size: usize,
    overlap: usize,
    cursor: WindowCursor,
}

impl<R: Read + Seek> WindowReader<R> {
    pub fn new(input: R, window_size: u64, overlap: u64) -> Result<Self, Error> {
        validate_window_params(window_size, overlap)?;
        Ok(Self {
            inner: BufReader::new(input),
            window_size: window_size as usize,
            overlap: overlap as usize,
            cursor: WindowCursor::default(),
        })
    }

    /// Fills `buf` with the next window of bases. Returns the cursor at the
    /// window start, or `None` once the remaining input cannot fill a whole
    /// window.
    pub fn next_window(&mut self, buf: &mut Vec<u8>) -> io::Result<Option<CursorSnapshot>> {
        let start = self.cursor.snapshot();
        buf.clear();
        let mut in_comment = false;

        while buf.len() < self.window_size {
            let byte = match self.next_byte()? {
                Some(byte) => byte,
                None => break,
            };
            if byte == b'\n' {
                in_comment = false;
                self.cursor.line_number += 1;
                self.cursor.line_offset = 0;
            } else if byte == b'>' {
                in_comment = true;
            }
            if in_comment {
                continue;
            }
            // A newline lands here with in_comment already cleared, so it
            // counts as the first byte of the new line.
            if byte != b'\r' {
                self.cursor.line_offset += 1;
            }
            let base = match byte {
                b'a' => b'A',
                b'c' => b'C',
                b'g' => b'G',
                b't' => b'T',
                other => other,
            };
            if base == b'N' {
                self.cursor.sequence_offset += 1;
            }
            if matches!(base, b'A' | b'C' | b'G' | b'T') {
                buf.push(base);
                self.cursor.sequence_offset += 1;
                if buf.len() == self.window_size - self.overlap {
                    self.cursor.mark();
                }
            }
        }

        if buf.len() == self.window_size {
            Ok(Some(start))
        } else {
            Ok(None)
        }
    }

    /// Steps the stream back by the overlap and rolls the cursor back to the
    /// shadow recorded when the overlap region began. The seek is over raw
    /// file bytes, matching how the windows were laid out on disk.
    pub fn rewind_overlap(&mut self) -> io::Result<()> {
        self.inner.seek_relative(-(self.overlap as i64))?;
        self.cursor.restore();
        Ok(())
    }

    fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let available = self.inner.fill_buf()?;
        if available.is_empty() {
            return Ok(None);
        }
        let byte = available[0];
        self.inner.consume(1);
        Ok(Some(byte))
    }
}
