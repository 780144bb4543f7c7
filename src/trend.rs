use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use tracing::{debug, warn};

use crate::record::{as_number, Record};
use crate::schema::{self, TrendFields};
use crate::stats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    pub fn from_slope(slope: f64) -> Self {
        if slope > 0.0 {
            TrendDirection::Increasing
        } else if slope < 0.0 {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesTrend {
    pub slope: f64,
    pub trend: TrendDirection,
    pub data_points: usize,
    pub average_value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSummary {
    pub total_records: usize,
    pub time_series_analyzed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_field: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_series: Option<TimeSeriesTrend>,
    pub summary: TrendSummary,
}

/// Parses the time axis value: RFC 3339, common date/time layouts, a bare
/// date, or epoch seconds/milliseconds.
pub fn parse_time_value(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::String(s) => parse_time_str(s.trim()),
        Value::Number(n) => {
            let x = n.as_f64()?;
            // Magnitudes past 1e11 are treated as milliseconds.
            if x.abs() >= 1e11 {
                Utc.timestamp_millis_opt(x as i64).single()
            } else {
                Utc.timestamp_opt(x as i64, 0).single()
            }
        }
        _ => None,
    }
}

fn parse_time_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let fmts = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
    ];
    for f in fmts.iter() {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, f) {
            return Some(Utc.from_utc_datetime(&ndt));
        }
    }
    for f in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, f) {
            return d.and_hms_opt(0, 0, 0).map(|ndt| Utc.from_utc_datetime(&ndt));
        }
    }
    None
}

fn has_time(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// Unparsable timestamps sort after every parsable one.
fn cmp_time(a: &Option<DateTime<Utc>>, b: &Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Values of `fields.value_field` ordered by the time axis.
pub fn ordered_series(batch: &[Record], fields: &TrendFields) -> Vec<f64> {
    let mut points: Vec<(Option<DateTime<Utc>>, f64)> = batch
        .iter()
        .filter_map(|rec| {
            let t = rec.get(&fields.time_field).filter(|v| has_time(v))?;
            let y = as_number(rec.get(&fields.value_field)?)?;
            Some((parse_time_value(t), y))
        })
        .collect();
    let unparsed = points.iter().filter(|(t, _)| t.is_none()).count();
    if unparsed > 0 {
        warn!(field = %fields.time_field, unparsed, "unparsable timestamps sorted last");
    }
    points.sort_by(|a, b| cmp_time(&a.0, &b.0));
    points.into_iter().map(|(_, y)| y).collect()
}

pub fn analyze_trend(batch: &[Record]) -> TrendAnalysis {
    let mut out = TrendAnalysis::default();
    out.summary.total_records = batch.len();
    let Some(fields) = schema::infer_trend_fields(batch) else {
        return out;
    };
    out.summary.time_field = Some(fields.time_field.clone());
    out.summary.value_field = Some(fields.value_field.clone());

    // A slope needs at least two points; fewer leaves the series empty.
    let values = ordered_series(batch, &fields);
    if values.len() < 2 {
        debug!(points = values.len(), "not enough points for a trend");
        return out;
    }
    // Index-based regression: spacing between timestamps is ignored.
    let slope = stats::least_squares_slope(&values);
    out.time_series = Some(TimeSeriesTrend {
        slope,
        trend: TrendDirection::from_slope(slope),
        data_points: values.len(),
        average_value: stats::mean(&values),
    });
    out.summary.time_series_analyzed = true;
    debug!(time = %fields.time_field, value = %fields.value_field, slope, "trend analysis complete");
    out
}
