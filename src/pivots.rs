//! Pivot scanner: strict swing highs and swing lows over a symmetric window.
//!
//! Bar `i` is a swing high when its high is strictly greater than the highs of
//! the `left_len` bars before it and the `right_len` bars after it. Swing lows
//! mirror this with strictly lower lows. Bars without a full window on both
//! sides are never candidates, and equal values disqualify a candidate.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::{Result, WindowLen, OHLCV};

// ============================================================
// CONFIGURATION
// ============================================================

/// Default number of bars required on each side of a pivot
pub const DEFAULT_WINDOW_LEN: usize = 3;

/// Left/right window lengths for the scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PivotConfig {
    pub left_len: WindowLen,
    pub right_len: WindowLen,
}

impl Default for PivotConfig {
    fn default() -> Self {
        Self {
            left_len: WindowLen::new_const(DEFAULT_WINDOW_LEN),
            right_len: WindowLen::new_const(DEFAULT_WINDOW_LEN),
        }
    }
}

impl PivotConfig {
    /// Validate both window lengths. Zero is rejected, never clamped.
    pub fn new(left_len: usize, right_len: usize) -> Result<Self> {
        Ok(Self {
            left_len: WindowLen::new("left", left_len)?,
            right_len: WindowLen::new("right", right_len)?,
        })
    }

    /// Smallest series length that can contain a pivot. Saturates at `usize::MAX`.
    #[inline]
    pub fn min_bars(&self) -> usize {
        self.left_len
            .get()
            .saturating_add(self.right_len.get())
            .saturating_add(1)
    }
}

// ============================================================
// SWING POINTS
// ============================================================

/// Which extremum a swing point marks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PivotKind {
    High,
    Low,
}

impl PivotKind {
    /// Human-readable label, used for table headers
    pub fn label(self) -> &'static str {
        match self {
            PivotKind::High => "Swing High",
            PivotKind::Low => "Swing Low",
        }
    }

    /// Lowercase identifier, used for file names
    pub fn slug(self) -> &'static str {
        match self {
            PivotKind::High => "swing_high",
            PivotKind::Low => "swing_low",
        }
    }
}

/// A detected pivot. Only meaningful against the series that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound(serialize = ""))]
pub struct SwingPoint<Tz: TimeZone> {
    /// Position of the source bar in the scanned series
    pub index: usize,
    pub timestamp: DateTime<Tz>,
    /// High for [`PivotKind::High`], low for [`PivotKind::Low`]
    pub price: f64,
    pub kind: PivotKind,
}

impl<Tz: TimeZone> SwingPoint<Tz> {
    fn from_bar<T: OHLCV<Tz = Tz>>(bars: &[T], index: usize, kind: PivotKind) -> Self {
        let bar = &bars[index];
        let price = match kind {
            PivotKind::High => bar.high(),
            PivotKind::Low => bar.low(),
        };
        Self {
            index,
            timestamp: bar.timestamp(),
            price,
            kind,
        }
    }
}

/// Result of one scan: highs and lows, each ascending by bar index
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound(serialize = ""))]
pub struct Pivots<Tz: TimeZone> {
    pub highs: Vec<SwingPoint<Tz>>,
    pub lows: Vec<SwingPoint<Tz>>,
}

impl<Tz: TimeZone> Default for Pivots<Tz> {
    fn default() -> Self {
        Self {
            highs: Vec::new(),
            lows: Vec::new(),
        }
    }
}

impl<Tz: TimeZone> Pivots<Tz> {
    pub fn is_empty(&self) -> bool {
        self.highs.is_empty() && self.lows.is_empty()
    }

    /// Total number of swing points of both kinds
    pub fn len(&self) -> usize {
        self.highs.len() + self.lows.len()
    }

    /// Points of one kind
    pub fn of_kind(&self, kind: PivotKind) -> &[SwingPoint<Tz>] {
        match kind {
            PivotKind::High => &self.highs,
            PivotKind::Low => &self.lows,
        }
    }
}

// ============================================================
// SCANNER
// ============================================================

/// Scanner holding a validated window
#[derive(Debug, Clone, Copy, Default)]
pub struct PivotScanner {
    config: PivotConfig,
}

impl PivotScanner {
    pub fn new(config: PivotConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> PivotConfig {
        self.config
    }

    /// Scan all bars. Series shorter than [`PivotConfig::min_bars`] yield no pivots.
    pub fn scan<T: OHLCV>(&self, bars: &[T]) -> Pivots<T::Tz> {
        let left = self.config.left_len.get();
        let right = self.config.right_len.get();
        let mut pivots = Pivots::default();

        // A window wider than usize can never fit in a slice.
        match left.checked_add(right) {
            Some(span) if bars.len() > span => {}
            _ => return pivots,
        }

        for i in left..bars.len() - right {
            if dominates(bars, i, left, right, |b| b.high(), |pivot, other| pivot > other) {
                pivots.highs.push(SwingPoint::from_bar(bars, i, PivotKind::High));
            }
            if dominates(bars, i, left, right, |b| b.low(), |pivot, other| pivot < other) {
                pivots.lows.push(SwingPoint::from_bar(bars, i, PivotKind::Low));
            }
        }

        pivots
    }
}

/// Scan `bars` with the given window lengths.
///
/// Fails only when a window length is zero.
pub fn detect_pivots<T: OHLCV>(
    bars: &[T],
    left_len: usize,
    right_len: usize,
) -> Result<Pivots<T::Tz>> {
    let config = PivotConfig::new(left_len, right_len)?;
    Ok(PivotScanner::new(config).scan(bars))
}

/// True if bar `index` is a swing high. False outside the scannable range.
pub fn is_swing_high<T: OHLCV>(bars: &[T], index: usize, config: &PivotConfig) -> bool {
    let (left, right) = (config.left_len.get(), config.right_len.get());
    in_window(bars.len(), index, left, right)
        && dominates(bars, index, left, right, |b| b.high(), |pivot, other| pivot > other)
}

/// True if bar `index` is a swing low. False outside the scannable range.
pub fn is_swing_low<T: OHLCV>(bars: &[T], index: usize, config: &PivotConfig) -> bool {
    let (left, right) = (config.left_len.get(), config.right_len.get());
    in_window(bars.len(), index, left, right)
        && dominates(bars, index, left, right, |b| b.low(), |pivot, other| pivot < other)
}

#[inline]
fn in_window(len: usize, index: usize, left: usize, right: usize) -> bool {
    index >= left && index.checked_add(right).is_some_and(|end| end < len)
}

/// Caller guarantees `index - left .. index + right` is in bounds.
#[inline]
fn dominates<T, P, C>(bars: &[T], index: usize, left: usize, right: usize, price: P, beats: C) -> bool
where
    P: Fn(&T) -> f64,
    C: Fn(f64, f64) -> bool,
{
    let pivot = price(&bars[index]);
    bars[index - left..index]
        .iter()
        .chain(&bars[index + 1..=index + right])
        .all(|other| beats(pivot, price(other)))
}

// ============================================================
// TESTS
// ============================================================
