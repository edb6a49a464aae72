use std::time::Duration;

use tera::Tera;

use crate::config::{SECONDS_PER_DAY, SECONDS_PER_HOUR, SECONDS_PER_MINUTE};
use crate::error::AppError;

/// Name the dashboard template is registered under
pub const DASHBOARD_TEMPLATE: &str = "dashboard.html";

const DASHBOARD_SOURCE: &str = include_str!("../templates/dashboard.html");

/// Initialize the Tera template engine with the embedded dashboard
pub fn init_templates() -> Result<Tera, AppError> {
    let mut tera = Tera::default();
    tera.add_raw_template(DASHBOARD_TEMPLATE, DASHBOARD_SOURCE)?;

    tera.register_filter("humanize_secs", humanize_secs_filter);

    Ok(tera)
}

/// Render a duration compactly, e.g. `45s`, `2m5s`, `1h0m12s`, `3d4h0m1s`.
/// Sub-second precision is dropped.
pub fn humanize_duration(duration: Duration) -> String {
    humanize_secs(duration.as_secs())
}

pub fn humanize_secs(total: u64) -> String {
    let days = total / SECONDS_PER_DAY;
    let hours = (total % SECONDS_PER_DAY) / SECONDS_PER_HOUR;
    let minutes = (total % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE;
    let seconds = total % SECONDS_PER_MINUTE;

    if days > 0 {
        format!("{}d{}h{}m{}s", days, hours, minutes, seconds)
    } else if hours > 0 {
        format!("{}h{}m{}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Tera filter wrapping `humanize_secs`
fn humanize_secs_filter(
    value: &tera::Value,
    _args: &std::collections::HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let secs = value
        .as_u64()
        .ok_or_else(|| tera::Error::msg("humanize_secs filter expects a non-negative integer"))?;
    Ok(tera::Value::String(humanize_secs(secs)))
}
