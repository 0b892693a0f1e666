//! # swingcast - Swing points and calendar projections
//!
//! Detects strict local extrema ("swing highs" and "swing lows") in an OHLC bar
//! series and projects a fixed set of future calendar dates from each of them.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use swingcast::prelude::*;
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let highs = [10.0, 11.0, 12.0, 13.0, 14.0, 20.0, 14.0, 13.0, 12.0, 11.0];
//! let bars: Vec<Bar> = highs
//!     .iter()
//!     .enumerate()
//!     .map(|(i, &h)| {
//!         let ts = start + chrono::Days::new(i as u64);
//!         Bar::new(ts, h - 1.0, h, h - 2.0, h - 0.5)
//!     })
//!     .collect();
//!
//! let pivots = detect_pivots(&bars, 3, 3).unwrap();
//! assert_eq!(pivots.highs.len(), 1);
//!
//! let tables = project_pivots(&pivots).unwrap();
//! assert_eq!(tables.highs.rows[0].projections.len(), PROJECTION_OFFSETS.len());
//! ```

use chrono::{DateTime, TimeZone};

pub mod analysis;
pub mod bar;
pub mod export;
pub mod pivots;
pub mod projection;

pub mod prelude {
    pub use crate::{
        // Pipeline
        analysis::{
            analyze_parallel, Analysis, Analyzer, AnalyzerBuilder, InstrumentAnalysis,
            InstrumentError,
        },
        // Bars
        bar::Bar,
        // Export
        export::{export_file_name, to_csv_string, write_csv},
        // Scanner
        pivots::{
            detect_pivots, is_swing_high, is_swing_low, PivotConfig, PivotKind, PivotScanner,
            Pivots, SwingPoint,
        },
        // Projection
        projection::{
            project, project_pivots, ProjectedDate, ProjectionRow, ProjectionTable,
            ProjectionTables, PROJECTION_OFFSETS,
        },
        validate_bars,
        OHLCVExt,
        Result,
        SwingError,
        WindowLen,
        OHLCV,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, SwingError>;

/// Errors produced by the scanner, the projection step and the exporters
#[derive(Debug, thiserror::Error)]
pub enum SwingError {
    #[error("Invalid {side} window length {value}: must be >= 1")]
    InvalidWindow { side: &'static str, value: usize },

    #[error("Invalid bar at index {index}: {reason}")]
    InvalidBar { index: usize, reason: &'static str },

    #[error("Timestamp at index {index} is not after the previous bar")]
    NonMonotonicTimestamp { index: usize },

    #[error("Projecting {offset_days} days overflows the supported date range")]
    DateOverflow { offset_days: u32 },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Number of neighbouring bars on one side of a pivot candidate (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowLen(usize);

impl WindowLen {
    /// Create a new WindowLen, rejecting zero. `side` names the window in the error.
    pub fn new(side: &'static str, value: usize) -> Result<Self> {
        if value == 0 {
            return Err(SwingError::InvalidWindow { side, value });
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for WindowLen {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for WindowLen {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        WindowLen::new("pivot", value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core bar trait. The scanner only reads `timestamp`, `high` and `low`.
pub trait OHLCV {
    type Tz: TimeZone;

    fn timestamp(&self) -> DateTime<Self::Tz>;
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;

    fn volume(&self) -> Option<f64> {
        None
    }
}

impl<T: OHLCV + ?Sized> OHLCV for &T {
    type Tz = T::Tz;

    fn timestamp(&self) -> DateTime<Self::Tz> {
        (**self).timestamp()
    }

    fn open(&self) -> f64 {
        (**self).open()
    }

    fn high(&self) -> f64 {
        (**self).high()
    }

    fn low(&self) -> f64 {
        (**self).low()
    }

    fn close(&self) -> f64 {
        (**self).close()
    }

    fn volume(&self) -> Option<f64> {
        (**self).volume()
    }
}

/// Extension trait with consistency checks for a single bar
pub trait OHLCVExt: OHLCV {
    /// Validate price/volume consistency of this bar.
    ///
    /// The reported index is always 0; [`validate_bars`] rewrites it to the
    /// bar's position in the series.
    fn validate(&self) -> Result<()> {
        let (open, high, low, close) = (self.open(), self.high(), self.low(), self.close());
        if !(open.is_finite() && high.is_finite() && low.is_finite() && close.is_finite()) {
            return Err(SwingError::InvalidBar {
                index: 0,
                reason: "NaN or infinite price",
            });
        }
        if high < low {
            return Err(SwingError::InvalidBar {
                index: 0,
                reason: "high < low",
            });
        }
        if open > high || close > high {
            return Err(SwingError::InvalidBar {
                index: 0,
                reason: "open or close above high",
            });
        }
        if open < low || close < low {
            return Err(SwingError::InvalidBar {
                index: 0,
                reason: "open or close below low",
            });
        }
        if let Some(volume) = self.volume() {
            if !volume.is_finite() || volume < 0.0 {
                return Err(SwingError::InvalidBar {
                    index: 0,
                    reason: "negative or non-finite volume",
                });
            }
        }
        Ok(())
    }
}

impl<T: OHLCV + ?Sized> OHLCVExt for T {}

/// Optional ingestion check: every bar is internally consistent and
/// timestamps are strictly increasing. Stops at the first offending bar.
pub fn validate_bars<T: OHLCV>(bars: &[T]) -> Result<()> {
    let mut previous: Option<DateTime<T::Tz>> = None;
    for (i, bar) in bars.iter().enumerate() {
        bar.validate().map_err(|e| match e {
            SwingError::InvalidBar { reason, .. } => SwingError::InvalidBar { index: i, reason },
            other => other,
        })?;

        let ts = bar.timestamp();
        if let Some(prev) = &previous {
            if ts <= *prev {
                return Err(SwingError::NonMonotonicTimestamp { index: i });
            }
        }
        previous = Some(ts);
    }
    Ok(())
}

// ============================================================
// TESTS
// ============================================================
