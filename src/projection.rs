//! Projection calculator: fixed calendar-day horizons from each swing point.
//!
//! Offsets are plain calendar days. Weekends and holidays are not skipped and
//! the projected date keeps the source's wall-clock time in the source's zone.

use chrono::{DateTime, Days, Offset, TimeDelta, TimeZone};
use serde::Serialize;

use crate::pivots::{PivotKind, Pivots, SwingPoint};
use crate::{Result, SwingError};

/// Day offsets projected from every pivot, in emission order
pub const PROJECTION_OFFSETS: [u32; 7] = [30, 60, 90, 120, 180, 270, 360];

// ============================================================
// ROWS AND TABLES
// ============================================================

/// One projected date
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound(serialize = ""))]
pub struct ProjectedDate<Tz: TimeZone> {
    pub offset_days: u32,
    pub date: DateTime<Tz>,
}

/// All projections derived from a single swing point
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound(serialize = ""))]
pub struct ProjectionRow<Tz: TimeZone> {
    pub kind: PivotKind,
    pub source_index: usize,
    pub source_date: DateTime<Tz>,
    pub source_price: f64,
    /// One entry per [`PROJECTION_OFFSETS`] value, same order
    pub projections: Vec<ProjectedDate<Tz>>,
}

impl<Tz: TimeZone> ProjectionRow<Tz> {
    /// Projected date for `offset_days`, if it is one of [`PROJECTION_OFFSETS`]
    pub fn date_for(&self, offset_days: u32) -> Option<&DateTime<Tz>> {
        self.projections
            .iter()
            .find(|p| p.offset_days == offset_days)
            .map(|p| &p.date)
    }
}

/// Projection rows for pivots of a single kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound(serialize = ""))]
pub struct ProjectionTable<Tz: TimeZone> {
    pub kind: PivotKind,
    pub rows: Vec<ProjectionRow<Tz>>,
}

impl<Tz: TimeZone> ProjectionTable<Tz> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every projected date on or before `until`, row by row, offsets ascending.
    ///
    /// Used to draw reference lines only inside the plotted range.
    pub fn reference_lines<Tz2: TimeZone>(&self, until: &DateTime<Tz2>) -> Vec<ProjectedDate<Tz>> {
        self.rows
            .iter()
            .flat_map(|row| row.projections.iter())
            .filter(|p| p.date <= *until)
            .cloned()
            .collect()
    }
}

/// Separate tables for highs and lows; the two kinds are never mixed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(bound(serialize = ""))]
pub struct ProjectionTables<Tz: TimeZone> {
    pub highs: ProjectionTable<Tz>,
    pub lows: ProjectionTable<Tz>,
}

// ============================================================
// CALCULATION
// ============================================================

/// Project every pivot in `pivots`, preserving input order.
///
/// An empty slice yields an empty result.
pub fn project<Tz: TimeZone>(pivots: &[SwingPoint<Tz>]) -> Result<Vec<ProjectionRow<Tz>>> {
    pivots.iter().map(project_one).collect()
}

/// Project highs and lows into their own tables.
pub fn project_pivots<Tz: TimeZone>(pivots: &Pivots<Tz>) -> Result<ProjectionTables<Tz>> {
    Ok(ProjectionTables {
        highs: ProjectionTable {
            kind: PivotKind::High,
            rows: project(&pivots.highs)?,
        },
        lows: ProjectionTable {
            kind: PivotKind::Low,
            rows: project(&pivots.lows)?,
        },
    })
}

fn project_one<Tz: TimeZone>(pivot: &SwingPoint<Tz>) -> Result<ProjectionRow<Tz>> {
    let projections = PROJECTION_OFFSETS
        .iter()
        .map(|&offset_days| {
            add_calendar_days(&pivot.timestamp, offset_days).map(|date| ProjectedDate {
                offset_days,
                date,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ProjectionRow {
        kind: pivot.kind,
        source_index: pivot.index,
        source_date: pivot.timestamp.clone(),
        source_price: pivot.price,
        projections,
    })
}

/// Add `days` calendar days to the local wall-clock time of `date`.
///
/// Ambiguous local times (clocks turned back) resolve to the earlier instant.
/// Nonexistent local times (clocks turned forward) are read with the offset in
/// force just before the gap, so they land the same distance past it.
pub fn add_calendar_days<Tz: TimeZone>(date: &DateTime<Tz>, days: u32) -> Result<DateTime<Tz>> {
    let overflow = || SwingError::DateOverflow { offset_days: days };

    let local = date
        .naive_local()
        .checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(overflow)?;
    let tz = date.timezone();

    if let Some(shifted) = tz.from_local_datetime(&local).earliest() {
        return Ok(shifted);
    }

    // Offsets never exceed a day, so a day earlier read as UTC precedes the gap.
    let day_before = local.checked_sub_days(Days::new(1)).ok_or_else(overflow)?;
    let before_gap = tz.offset_from_utc_datetime(&day_before).fix().local_minus_utc();
    let utc = local
        .checked_sub_signed(TimeDelta::seconds(i64::from(before_gap)))
        .ok_or_else(overflow)?;
    Ok(tz.from_utc_datetime(&utc))
}

// ============================================================
// TESTS
// ============================================================
