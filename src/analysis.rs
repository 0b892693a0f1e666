//! Full pipeline for one or many bar series: validate, scan, project.

use chrono::TimeZone;
use rayon::iter::Either;
use rayon::prelude::*;

use crate::pivots::{PivotConfig, PivotScanner, Pivots};
use crate::projection::{project_pivots, ProjectionTables};
use crate::{validate_bars, Result, SwingError, OHLCV};

// ============================================================
// ANALYSIS RESULT
// ============================================================

/// Pivots of one series together with their projection tables
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis<Tz: TimeZone> {
    pub pivots: Pivots<Tz>,
    pub projections: ProjectionTables<Tz>,
}

impl<Tz: TimeZone> Analysis<Tz> {
    pub fn high_count(&self) -> usize {
        self.pivots.highs.len()
    }

    pub fn low_count(&self) -> usize {
        self.pivots.lows.len()
    }
}

// ============================================================
// ANALYZER
// ============================================================

/// Configured pipeline. Build with [`AnalyzerBuilder`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Analyzer {
    scanner: PivotScanner,
    validate_data: bool,
}

impl Analyzer {
    pub fn config(&self) -> PivotConfig {
        self.scanner.config()
    }

    /// Scan `bars` and project the resulting pivots.
    ///
    /// With data validation enabled, malformed bars are rejected before the scan.
    pub fn analyze<T: OHLCV>(&self, bars: &[T]) -> Result<Analysis<T::Tz>> {
        if self.validate_data {
            validate_bars(bars)?;
        }

        let pivots = self.scanner.scan(bars);
        let projections = project_pivots(&pivots)?;
        Ok(Analysis {
            pivots,
            projections,
        })
    }
}

/// Builder for [`Analyzer`]. Window lengths default to 3/3.
#[derive(Debug, Clone)]
pub struct AnalyzerBuilder {
    left_len: usize,
    right_len: usize,
    validate_data: bool,
}

impl Default for AnalyzerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        let defaults = PivotConfig::default();
        Self {
            left_len: defaults.left_len.get(),
            right_len: defaults.right_len.get(),
            validate_data: false,
        }
    }

    /// Take both lengths from an existing config
    pub fn config(mut self, config: PivotConfig) -> Self {
        self.left_len = config.left_len.get();
        self.right_len = config.right_len.get();
        self
    }

    pub fn left_len(mut self, len: usize) -> Self {
        self.left_len = len;
        self
    }

    pub fn right_len(mut self, len: usize) -> Self {
        self.right_len = len;
        self
    }

    /// Enable/disable bar validation before scanning
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.validate_data = enable;
        self
    }

    /// Build the analyzer, rejecting zero window lengths
    pub fn build(self) -> Result<Analyzer> {
        let config = PivotConfig::new(self.left_len, self.right_len)?;
        Ok(Analyzer {
            scanner: PivotScanner::new(config),
            validate_data: self.validate_data,
        })
    }
}

// ============================================================
// PARALLEL ANALYSIS
// ============================================================

/// Analysis of a single instrument
#[derive(Debug)]
pub struct InstrumentAnalysis<Tz: TimeZone> {
    pub symbol: String,
    pub analysis: Analysis<Tz>,
}

/// Failure for a single instrument
#[derive(Debug)]
pub struct InstrumentError {
    pub symbol: String,
    pub error: SwingError,
}

/// Analyze many instruments on the rayon pool.
///
/// Each series is independent, so one failure does not affect the others.
/// Both lists keep the input order.
pub fn analyze_parallel<'a, T, I>(
    analyzer: &Analyzer,
    instruments: I,
) -> (Vec<InstrumentAnalysis<T::Tz>>, Vec<InstrumentError>)
where
    T: OHLCV + Sync + 'a,
    T::Tz: Send,
    <T::Tz as TimeZone>::Offset: Send,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    instruments
        .into_par_iter()
        .partition_map(|(symbol, bars)| match analyzer.analyze(bars) {
            Ok(analysis) => Either::Left(InstrumentAnalysis {
                symbol: symbol.to_owned(),
                analysis,
            }),
            Err(error) => Either::Right(InstrumentError {
                symbol: symbol.to_owned(),
                error,
            }),
        })
}

// ============================================================
// TESTS
// ============================================================
