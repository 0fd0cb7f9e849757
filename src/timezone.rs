//! Timezone for the display times in item descriptions.

use anyhow::{Result, anyhow};
use chrono_tz::Tz;

/// Use `configured` if given, otherwise the system timezone, otherwise UTC.
pub fn resolve_display_timezone(configured: Option<&str>) -> Result<Tz> {
    if let Some(name) = configured {
        return name
            .parse::<Tz>()
            .map_err(|e| anyhow!("Unknown timezone '{}': {}", name, e));
    }

    Ok(system_timezone().unwrap_or_else(|| {
        tracing::warn!("Could not determine the local timezone, using UTC");
        Tz::UTC
    }))
}

/// `TZ` if it names an IANA zone, else what the OS reports.
fn system_timezone() -> Option<Tz> {
    std::env::var("TZ")
        .ok()
        .and_then(|tz| parse_tz_env(&tz))
        .or_else(|| {
            iana_time_zone::get_timezone()
                .ok()
                .and_then(|name| name.parse().ok())
        })
}

/// `TZ` may carry a leading `:` (`TZ=:Europe/Berlin`).
fn parse_tz_env(value: &str) -> Option<Tz> {
    value.trim_start_matches(':').parse().ok()
}
