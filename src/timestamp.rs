//! Log timestamp handling
//!
//! Activity logs carry `ts` as epoch milliseconds. It is rendered once into a
//! local-time string (`start_time`), and every calendar field of the time
//! dimension is read back from that string, so `start_time` stays the single
//! source of truth for both the time and songplay tables.

use crate::config::TimeZoneMode;
use arrow::array::{AsArray, StringArray};
use arrow::datatypes::{DataType, Int64Type};
use chrono::{DateTime, Local, TimeZone, Utc};
use datafusion::error::{DataFusionError, Result as DFResult};
use datafusion::functions::expr_fn::{date_part, to_timestamp};
use datafusion::logical_expr::{
    cast, col, lit, ColumnarValue, Expr, ScalarUDF, ScalarUDFImpl, Signature, Volatility,
};
use std::any::Any;
use std::fmt::Display;
use std::sync::Arc;

const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render epoch milliseconds as `YYYY-MM-DD HH:MM:SS[.ffffff]` in `tz`
///
/// The microsecond suffix only appears when the sub-second part is non-zero.
/// Returns `None` when the instant is out of range.
pub fn render_start_time<Tz>(ts_millis: i64, tz: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let local: DateTime<Tz> = tz.timestamp_millis_opt(ts_millis).single()?;
    let micros = ts_millis.rem_euclid(1000) * 1000;
    let base = local.format(START_TIME_FORMAT).to_string();
    if micros == 0 {
        Some(base)
    } else {
        Some(format!("{base}.{micros:06}"))
    }
}

/// Render a start time in the configured time zone
pub fn render_in(ts_millis: i64, mode: TimeZoneMode) -> Option<String> {
    match mode {
        TimeZoneMode::Local => render_start_time(ts_millis, &Local),
        TimeZoneMode::Utc => render_start_time(ts_millis, &Utc),
    }
}

// ============================================================================
// start_time UDF
// ============================================================================

/// Scalar function `render_start_time(ts BIGINT) -> VARCHAR`
#[derive(Debug)]
struct RenderStartTime {
    time_zone: TimeZoneMode,
    signature: Signature,
}

impl RenderStartTime {
    fn new(time_zone: TimeZoneMode) -> Self {
        Self {
            time_zone,
            signature: Signature::exact(vec![DataType::Int64], Volatility::Immutable),
        }
    }
}

impl ScalarUDFImpl for RenderStartTime {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn name(&self) -> &str {
        "render_start_time"
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn return_type(&self, _arg_types: &[DataType]) -> DFResult<DataType> {
        Ok(DataType::Utf8)
    }

    fn invoke(&self, args: &[ColumnarValue]) -> DFResult<ColumnarValue> {
        let arrays = ColumnarValue::values_to_arrays(args)?;
        let Some(ts) = arrays
            .first()
            .and_then(|a| a.as_primitive_opt::<Int64Type>())
        else {
            return Err(DataFusionError::Execution(format!(
                "{} expects one Int64 argument of epoch milliseconds",
                self.name()
            )));
        };

        let rendered: StringArray = ts
            .iter()
            .map(|v| v.and_then(|ms| render_in(ms, self.time_zone)))
            .collect();
        Ok(ColumnarValue::Array(Arc::new(rendered)))
    }
}

/// Expression rendering the epoch-millisecond column `ts_column` as a
/// `start_time` string in `mode`
pub fn start_time_expr(ts_column: &str, mode: TimeZoneMode) -> Expr {
    ScalarUDF::new_from_impl(RenderStartTime::new(mode)).call(vec![col(ts_column)])
}

// ============================================================================
// Calendar fields
// ============================================================================

fn field(part: &str, start_time: &Expr) -> Expr {
    let ts = to_timestamp(vec![start_time.clone()]);
    cast(date_part(lit(part), ts), DataType::Int32)
}

/// Calendar fields of a rendered start-time expression, as
/// `(name, Int32 expression)` in `hour, day, week, month, year, weekday` order
///
/// `week` is the ISO 8601 week. `weekday` is the week of the month counted
/// from the 1st, `(day - 1) / 7 + 1`, so days 1-7 are 1 and days 29-31 are 5.
pub fn calendar_exprs(start_time: &Expr) -> Vec<(&'static str, Expr)> {
    let day = field("day", start_time);
    let weekday = (day.clone() - lit(1i32)) / lit(7i32) + lit(1i32);
    vec![
        ("hour", field("hour", start_time)),
        ("day", day),
        ("week", field("week", start_time)),
        ("month", field("month", start_time)),
        ("year", field("year", start_time)),
        ("weekday", weekday),
    ]
}

/// Year and month of a rendered start-time expression
pub fn year_month_exprs(start_time: &Expr) -> Vec<Expr> {
    vec![field("year", start_time), field("month", start_time)]
}
