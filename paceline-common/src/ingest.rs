//! Plan ingestion: format detection, normalization, validation
//!
//! Two incompatible wire schemas are accepted:
//!
//! - **Simple format**: `name` + `intervals` array, timestamps in
//!   seconds, speeds already in km/h.
//! - **Step format**: `name` + `steps` array, start times in minutes,
//!   speeds in mph (single value or array), inclines in percent
//!   (single value or array).
//!
//! Both normalize into one canonical [`Plan`], which is then validated
//! against the structural invariants exactly once. Downstream code
//! (clock, scheduler, storage) never re-checks them.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};
use crate::model::{Interval, Plan, MPH_TO_KMH};

/// Wire schema of a raw plan document
///
/// Selection is dispatched through a match on this tag; there is no
/// runtime strategy object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFormat {
    /// `intervals` array, seconds and km/h
    Simple,
    /// `steps` array, minutes and mph
    Step,
}

/// Detect which wire schema a parsed document uses
///
/// Presence of a `steps` key selects [`PlanFormat::Step`]; anything
/// else is treated as the simple format.
pub fn detect_format(value: &Value) -> PlanFormat {
    if value.get("steps").is_some() {
        PlanFormat::Step
    } else {
        PlanFormat::Simple
    }
}

/// Parse and normalize a plan from a JSON string
pub fn parse_plan(input: &str) -> Result<Plan> {
    let value: Value =
        serde_json::from_str(input).map_err(|e| Error::InvalidJson(e.to_string()))?;

    if !value.is_object() {
        return Err(Error::InvalidJson(
            "top-level JSON value is not an object".to_string(),
        ));
    }

    let plan = match detect_format(&value) {
        PlanFormat::Simple => normalize_simple(value)?,
        PlanFormat::Step => normalize_step(value)?,
    };

    validate(&plan)?;
    Ok(plan)
}

/// Parse and normalize a plan from a JSON file
pub fn parse_plan_file(path: &Path) -> Result<Plan> {
    let input = std::fs::read_to_string(path)?;
    parse_plan(&input)
}

// ---------------------------------------------------------------------
// Raw wire types
//
// Numeric interval fields are decoded as raw JSON values so that a
// missing or non-numeric field surfaces as InvalidIntervalData rather
// than a generic decode failure.
// ---------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawSimplePlan {
    name: Option<String>,
    #[serde(rename = "totalDuration")]
    total_duration: Option<f64>,
    intervals: Option<Vec<RawSimpleInterval>>,
}

#[derive(Debug, Deserialize)]
struct RawSimpleInterval {
    timestamp: Option<Value>,
    speed: Option<Value>,
    incline: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawStepPlan {
    name: Option<String>,
    total_duration_minutes: Option<f64>,
    steps: Option<Vec<RawStep>>,
}

#[derive(Debug, Deserialize)]
struct RawStep {
    start_min: Option<Value>,
    end_min: Option<f64>,
    speed_mph: Option<Value>,
    incline_percent: Option<Value>,
}

/// Extract a required non-negative numeric field
///
/// `None` (absent), non-numeric, negative, and NaN all fail with
/// [`Error::InvalidIntervalData`].
fn numeric_field(value: Option<&Value>, field: &str) -> Result<f64> {
    let value = value
        .ok_or_else(|| Error::InvalidIntervalData(format!("missing field '{field}'")))?;
    let number = value
        .as_f64()
        .ok_or_else(|| Error::InvalidIntervalData(format!("field '{field}' is not numeric")))?;
    if !(number >= 0.0) {
        return Err(Error::InvalidIntervalData(format!(
            "field '{field}' must be >= 0, got {number}"
        )));
    }
    Ok(number)
}

/// Extract a required non-negative value that may be a single number
/// or an array of numbers
///
/// When an array is supplied only the first element is used; the rest
/// are discarded (behavior preserved from the source format — the
/// extra values presumably describe sub-phases within one step).
fn first_numeric(value: Option<&Value>, field: &str) -> Result<f64> {
    match value {
        Some(Value::Array(items)) => {
            let first = items.first().ok_or_else(|| {
                Error::InvalidIntervalData(format!("field '{field}' is an empty array"))
            })?;
            if items.len() > 1 {
                warn!(
                    field,
                    discarded = items.len() - 1,
                    "using first value of array field, discarding the rest"
                );
            }
            numeric_field(Some(first), field)
        }
        other => numeric_field(other, field),
    }
}

fn required_name(name: Option<String>) -> Result<String> {
    match name {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(Error::MissingRequiredFields("name".to_string())),
    }
}

// ---------------------------------------------------------------------
// Normalizers
// ---------------------------------------------------------------------

/// Normalize a simple-format document
///
/// Speeds and inclines pass through unchanged (already km/h and
/// percent). `totalDuration` falls back to the last interval's
/// timestamp when absent.
fn normalize_simple(value: Value) -> Result<Plan> {
    let raw: RawSimplePlan =
        serde_json::from_value(value).map_err(|e| Error::InvalidJson(e.to_string()))?;

    let name = required_name(raw.name)?;

    let raw_intervals = match raw.intervals {
        Some(intervals) if !intervals.is_empty() => intervals,
        _ => return Err(Error::MissingRequiredFields("intervals".to_string())),
    };

    let mut intervals = Vec::with_capacity(raw_intervals.len());
    for raw_interval in &raw_intervals {
        intervals.push(Interval {
            timestamp_secs: numeric_field(raw_interval.timestamp.as_ref(), "timestamp")?,
            speed_kmh: numeric_field(raw_interval.speed.as_ref(), "speed")?,
            incline_percent: numeric_field(raw_interval.incline.as_ref(), "incline")?,
        });
    }

    let total_duration_secs = match raw.total_duration {
        Some(provided) => provided,
        // Last interval's timestamp; intervals is non-empty here
        None => intervals.last().map(|i| i.timestamp_secs).unwrap_or(0.0),
    };

    Ok(Plan::new(name, total_duration_secs, intervals))
}

/// Normalize a step-format document
///
/// Start times convert minutes to seconds, speeds convert mph to km/h.
/// The result is re-sorted by timestamp ascending — step order in the
/// input is not trusted. Total duration falls back from
/// `total_duration_minutes` to the last step's `end_min` to the last
/// normalized interval's timestamp.
fn normalize_step(value: Value) -> Result<Plan> {
    let raw: RawStepPlan =
        serde_json::from_value(value).map_err(|e| Error::InvalidJson(e.to_string()))?;

    let name = required_name(raw.name)?;

    let steps = match raw.steps {
        Some(steps) if !steps.is_empty() => steps,
        _ => return Err(Error::MissingRequiredFields("steps".to_string())),
    };

    let mut intervals = Vec::with_capacity(steps.len());
    for step in &steps {
        let start_min = numeric_field(step.start_min.as_ref(), "start_min")?;
        let speed_mph = first_numeric(step.speed_mph.as_ref(), "speed_mph")?;
        let incline_percent = first_numeric(step.incline_percent.as_ref(), "incline_percent")?;

        intervals.push(Interval {
            timestamp_secs: start_min * 60.0,
            speed_kmh: speed_mph * MPH_TO_KMH,
            incline_percent,
        });
    }

    intervals.sort_by(|a, b| a.timestamp_secs.total_cmp(&b.timestamp_secs));

    let total_duration_secs = if let Some(minutes) = raw.total_duration_minutes {
        minutes * 60.0
    } else if let Some(end_min) = steps.last().and_then(|s| s.end_min) {
        end_min * 60.0
    } else {
        intervals.last().map(|i| i.timestamp_secs).unwrap_or(0.0)
    };

    Ok(Plan::new(name, total_duration_secs, intervals))
}

// ---------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------

/// Validate the structural invariants of a normalized plan
///
/// Fails with [`Error::InvalidPlanData`] on the first violated
/// invariant: empty name, no intervals, non-monotonic timestamps,
/// first timestamp != 0, a negative interval field, or a non-positive
/// total duration.
pub fn validate(plan: &Plan) -> Result<()> {
    if plan.name.is_empty() {
        return Err(Error::InvalidPlanData("plan name is empty".to_string()));
    }

    if plan.intervals.is_empty() {
        return Err(Error::InvalidPlanData("plan has no intervals".to_string()));
    }

    for pair in plan.intervals.windows(2) {
        if pair[1].timestamp_secs < pair[0].timestamp_secs {
            return Err(Error::InvalidPlanData(format!(
                "interval timestamps not in ascending order ({} after {})",
                pair[1].timestamp_secs, pair[0].timestamp_secs
            )));
        }
    }

    // First interval must cover the start of the workout
    let first = &plan.intervals[0];
    if first.timestamp_secs != 0.0 {
        return Err(Error::InvalidPlanData(format!(
            "first interval starts at {}, expected 0",
            first.timestamp_secs
        )));
    }

    for interval in &plan.intervals {
        if !(interval.timestamp_secs >= 0.0)
            || !(interval.speed_kmh >= 0.0)
            || !(interval.incline_percent >= 0.0)
        {
            return Err(Error::InvalidPlanData(
                "interval contains a negative or invalid value".to_string(),
            ));
        }
    }

    if !(plan.total_duration_secs > 0.0) {
        return Err(Error::InvalidPlanData(format!(
            "total duration must be positive, got {}",
            plan.total_duration_secs
        )));
    }

    Ok(())
}
