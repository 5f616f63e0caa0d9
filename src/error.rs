use thiserror::Error;

/// Errors split between configuration problems (caught before any I/O)
/// and resource problems (files missing, truncated or unreadable).
#[derive(Debug, Error)]
pub enum Error {
    #[error("could not open '{path}': {source}")]
    /// A named input file could not be opened
    OpenFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error while reading input")]
    /// Read or seek failure on an already open stream
    Io(#[from] std::io::Error),
    #[error("window size {0} out of range 10..=100000000")]
    /// Window size outside the accepted bounds
    WindowSizeOutOfRange(u64),
    #[error("overlap {0} out of range 0..=1000000")]
    /// Overlap outside the accepted bounds
    OverlapOutOfRange(u64),
    #[error("overlap {overlap} must be smaller than window size {window_size}")]
    /// Overlap must leave at least one fresh base per window
    OverlapTooLarge { overlap: u64, window_size: u64 },
    #[error("depth range {min}-{max} has max below min")]
    /// Reversed depth range
    ReversedDepthRange { min: u64, max: u64 },
    #[error("interval size requires a min-max depth range")]
    /// Interval chunking without a depth range to chunk
    IntervalWithoutRange,
    #[error("interval size must be greater than zero")]
    /// Zero-width intervals never terminate
    ZeroIntervalSize,
    #[error("{name} must be greater than zero")]
    /// A size parameter that must be positive was zero
    ZeroSize { name: &'static str },
    #[error("'{path}' ended after {got} bytes, expected {expected}")]
    /// Reference slice shorter than requested
    ShortRead {
        path: String,
        got: u64,
        expected: u64,
    },
}
