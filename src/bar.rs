//! Canonical in-memory OHLC(V) bar.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::OHLCV;

/// A single price bar stamped with a timezone-aware timestamp.
///
/// Deserializes from any format carrying the field names below (e.g. a CSV
/// row `timestamp,open,high,low,close,volume`) when `DateTime<Tz>` does,
/// which covers `Utc`, `FixedOffset` and `Local`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = "DateTime<Tz>: Deserialize<'de>"))]
pub struct Bar<Tz: TimeZone = Utc> {
    /// Start of the bar interval.
    pub timestamp: DateTime<Tz>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Not every provider reports volume.
    #[serde(default)]
    pub volume: Option<f64>,
}

impl<Tz: TimeZone> Bar<Tz> {
    pub fn new(timestamp: DateTime<Tz>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume: None,
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }
}

impl<Tz: TimeZone> OHLCV for Bar<Tz> {
    type Tz = Tz;

    fn timestamp(&self) -> DateTime<Tz> {
        self.timestamp.clone()
    }

    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> Option<f64> {
        self.volume
    }
}
