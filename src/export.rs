//! CSV export of projection tables.
//!
//! Layout: one row per pivot, columns `<Kind> Date`, `<Kind> Price`, then one
//! `<Kind> +<offset>d` column per projection offset.

use std::io;

use chrono::TimeZone;

use crate::pivots::PivotKind;
use crate::projection::{ProjectionTable, PROJECTION_OFFSETS};
use crate::Result;

/// Timestamp format used in exported cells, e.g. `2024-01-01 09:15:00+05:30`
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// Column headers for a table of `kind`
pub fn headers(kind: PivotKind) -> Vec<String> {
    let label = kind.label();
    let mut headers = Vec::with_capacity(PROJECTION_OFFSETS.len() + 2);
    headers.push(format!("{label} Date"));
    headers.push(format!("{label} Price"));
    headers.extend(PROJECTION_OFFSETS.iter().map(|offset| format!("{label} +{offset}d")));
    headers
}

/// Write `table` as CSV. An empty table writes nothing.
pub fn write_csv<Tz: TimeZone, W: io::Write>(table: &ProjectionTable<Tz>, writer: W) -> Result<()> {
    if table.is_empty() {
        return Ok(());
    }

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(headers(table.kind))?;

    for row in &table.rows {
        let mut record = Vec::with_capacity(row.projections.len() + 2);
        record.push(row.source_date.fixed_offset().format(DATE_FORMAT).to_string());
        record.push(row.source_price.to_string());
        record.extend(
            row.projections
                .iter()
                .map(|p| p.date.fixed_offset().format(DATE_FORMAT).to_string()),
        );
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Render `table` as a CSV string
pub fn to_csv_string<Tz: TimeZone>(table: &ProjectionTable<Tz>) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    let csv = String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(csv)
}

/// Download file name for a table, e.g. `sbin_swing_high_projections.csv`
pub fn export_file_name(symbol: &str, kind: PivotKind) -> String {
    format!("{symbol}_{}_projections.csv", kind.slug())
}
