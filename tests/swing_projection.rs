//! End-to-end tests: bar series -> pivots -> projection tables -> CSV.

use chrono::{DateTime, Days, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Asia::Kolkata;
use chrono_tz::Tz;
use swingcast::prelude::*;

/// Daily bars from (high, low) pairs, starting 2024-01-01 09:15 IST
fn ist_bars(hl: &[(f64, f64)]) -> Vec<Bar<Tz>> {
    let start = Kolkata.with_ymd_and_hms(2024, 1, 1, 9, 15, 0).unwrap();
    hl.iter()
        .enumerate()
        .map(|(i, &(h, l))| {
            let o = l + (h - l) * 0.25;
            let c = l + (h - l) * 0.75;
            Bar::new(start + Days::new(i as u64), o, h, l, c).with_volume(10_000.0)
        })
        .collect()
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_ten_bar_single_high() {
    let highs = [10.0, 11.0, 12.0, 13.0, 14.0, 20.0, 14.0, 13.0, 12.0, 11.0];
    let hl: Vec<_> = highs.iter().map(|&h| (h, h - 2.0)).collect();
    let bars = ist_bars(&hl);

    let pivots = detect_pivots(&bars, 3, 3).unwrap();
    assert_eq!(pivots.highs.len(), 1);
    assert_eq!(pivots.highs[0].index, 5);
    assert_eq!(pivots.highs[0].timestamp, bars[5].timestamp);
    assert!(pivots.lows.is_empty());
}

#[test]
fn test_series_exactly_at_boundary() {
    let bars = ist_bars(&[(3.0, 1.0), (5.0, 2.0), (9.0, 0.5), (4.0, 1.5)]);
    assert!(detect_pivots(&bars, 2, 2).unwrap().is_empty());
    assert!(detect_pivots(&bars, 1, 3).unwrap().is_empty());
}

#[test]
fn test_bar_both_high_and_low_in_both_tables() {
    let bars = ist_bars(&[
        (10.0, 8.0),
        (11.0, 7.0),
        (15.0, 2.0), // outside bar
        (12.0, 6.0),
        (11.0, 7.5),
    ]);
    let analysis = AnalyzerBuilder::new()
        .left_len(2)
        .right_len(2)
        .validate_data(true)
        .build()
        .unwrap()
        .analyze(&bars)
        .unwrap();

    assert_eq!(analysis.projections.highs.rows.len(), 1);
    assert_eq!(analysis.projections.lows.rows.len(), 1);
    assert_eq!(analysis.projections.highs.rows[0].source_index, 2);
    assert_eq!(analysis.projections.lows.rows[0].source_index, 2);
    assert_eq!(analysis.projections.highs.rows[0].source_price, 15.0);
    assert_eq!(analysis.projections.lows.rows[0].source_price, 2.0);
}

#[test]
fn test_projection_of_new_year_pivot() {
    let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let pivot = SwingPoint {
        index: 0,
        timestamp: ts,
        price: 42.0,
        kind: PivotKind::High,
    };
    let rows = project(&[pivot]).unwrap();

    let expected = [
        (30, ymd(2024, 1, 31)),
        (60, ymd(2024, 3, 1)),
        (90, ymd(2024, 3, 31)),
        (120, ymd(2024, 4, 30)),
        (180, ymd(2024, 6, 29)),
        (270, ymd(2024, 9, 27)),
        (360, ymd(2024, 12, 26)),
    ];
    for (offset, date) in expected {
        assert_eq!(rows[0].date_for(offset).unwrap().date_naive(), date);
    }
}

#[test]
fn test_ist_pipeline_keeps_session_time() {
    // two full cycles of a zig-zag
    let hl = [
        (100.0, 98.0),
        (102.0, 99.0),
        (105.0, 101.0),
        (103.0, 100.0),
        (101.0, 97.0),
        (99.0, 95.0),
        (100.0, 96.0),
        (104.0, 99.0),
        (107.0, 102.0),
        (104.0, 100.0),
        (102.0, 98.0),
    ];
    let bars = ist_bars(&hl);
    let analysis = AnalyzerBuilder::new()
        .left_len(2)
        .right_len(2)
        .validate_data(true)
        .build()
        .unwrap()
        .analyze(&bars)
        .unwrap();

    let high_idx: Vec<_> = analysis.pivots.highs.iter().map(|p| p.index).collect();
    let low_idx: Vec<_> = analysis.pivots.lows.iter().map(|p| p.index).collect();
    assert_eq!(high_idx, vec![2, 8]);
    assert_eq!(low_idx, vec![5]);

    for row in analysis
        .projections
        .highs
        .rows
        .iter()
        .chain(&analysis.projections.lows.rows)
    {
        for p in &row.projections {
            assert_eq!(p.date.timezone(), Kolkata);
            assert_eq!((p.date.hour(), p.date.minute()), (9, 15));
            assert!(p.date > row.source_date);
        }
    }

    // Only offsets up to the last bar (2024-01-11) would be drawn; none reach it.
    let last: DateTime<Tz> = bars.last().unwrap().timestamp;
    assert!(analysis.projections.highs.reference_lines(&last).is_empty());
}

#[test]
fn test_csv_export_of_analysis() {
    let hl = [
        (10.0, 9.0),
        (12.0, 10.0),
        (11.0, 8.0),
        (13.0, 10.5),
        (12.5, 11.0),
    ];
    let bars = ist_bars(&hl);
    let pivots = detect_pivots(&bars, 1, 1).unwrap();
    let tables = project_pivots(&pivots).unwrap();

    let highs_csv = to_csv_string(&tables.highs).unwrap();
    let mut rdr = csv::Reader::from_reader(highs_csv.as_bytes());
    let headers: Vec<String> = rdr.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers[0], "Swing High Date");
    assert_eq!(headers[8], "Swing High +360d");

    let records: Vec<csv::StringRecord> = rdr.records().collect::<std::result::Result<_, _>>().unwrap();
    assert_eq!(records.len(), pivots.highs.len());
    assert_eq!(&records[0][0], "2024-01-02 09:15:00+05:30");
    assert_eq!(&records[0][1], "12");
    assert_eq!(&records[0][2], "2024-02-01 09:15:00+05:30");

    let lows_csv = to_csv_string(&tables.lows).unwrap();
    assert!(lows_csv.starts_with("Swing Low Date,Swing Low Price,Swing Low +30d"));
}

#[test]
fn test_invalid_window_is_not_clamped() {
    let bars = ist_bars(&[(1.0, 0.5); 10]);
    let err = detect_pivots(&bars, 0, 0).unwrap_err();
    assert!(matches!(err, SwingError::InvalidWindow { side: "left", value: 0 }));
    assert_eq!(err.to_string(), "Invalid left window length 0: must be >= 1");
}
