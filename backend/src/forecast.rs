use chrono::{DateTime, Duration, Utc};
use shared::{JourneyWindow, ProductKind, TimingMode, WeatherProductInfo};

/// Projection boundaries. The weather source publishes observations on a
/// 15-minute grid, forecast model runs every 3 hours, short-range lead times
/// in 15-minute steps up to 11 hours and whole hours beyond that. A wrong
/// boundary here asks the source for imagery it does not have.
const OBSERVATION_CUTOFF_MIN: i64 = 20;
const OBSERVATION_GRID_S: i64 = 15 * 60;
const MODEL_RUN_CADENCE_S: i64 = 3 * 3600;
const SHORT_RANGE_MAX_LEAD_S: i64 = 11 * 3600;
const SHORT_RANGE_GRID_S: i64 = 15 * 60;
const LONG_RANGE_GRID_S: i64 = 3600;

/// Map a fractional progress along a journey to a real-world instant.
/// In "arrive by" mode the anchor is the arrival time and the start is
/// computed backward from it.
pub fn project_time(progress: f64, journey: JourneyWindow) -> DateTime<Utc> {
    let start = journey_start(journey);
    let clamped = if progress.is_finite() {
        progress.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let duration_s = (journey.duration_hours.max(0.0) * 3600.0 * clamped).round() as i64;
    start + Duration::seconds(duration_s)
}

pub fn journey_start(journey: JourneyWindow) -> DateTime<Utc> {
    let anchor = DateTime::<Utc>::from_timestamp(journey.anchor_unix, 0).unwrap_or_else(Utc::now);
    match journey.mode {
        TimingMode::Depart => anchor,
        TimingMode::Arrive => {
            anchor - Duration::seconds((journey.duration_hours.max(0.0) * 3600.0).round() as i64)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherProduct {
    /// Past conditions: an archived observation on the 15-minute grid.
    Observation { valid_at: DateTime<Utc> },
    /// Current or future conditions: a forecast frame from the most recent
    /// model run at or before `now`.
    Forecast {
        model_run: DateTime<Utc>,
        lead: LeadTime,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadTime {
    /// Lead ≤ 11 h, expressed in 15-minute-rounded minutes.
    ShortRange { minutes: i64 },
    /// Lead > 11 h, expressed in whole-hour-rounded hours.
    LongRange { hours: i64 },
}

/// Decide which weather imagery product covers a simulated instant.
///
/// More than 20 minutes in the past selects an archived observation;
/// anything newer selects a forecast frame, with the lead-time bucket chosen
/// by the 11-hour short/long threshold.
pub fn select_weather_product(simulated: DateTime<Utc>, now: DateTime<Utc>) -> WeatherProduct {
    if simulated < now - Duration::minutes(OBSERVATION_CUTOFF_MIN) {
        return WeatherProduct::Observation {
            valid_at: round_to_grid(simulated, OBSERVATION_GRID_S),
        };
    }

    let model_run = floor_to_grid(now, MODEL_RUN_CADENCE_S);
    let lead_s = (simulated - model_run).num_seconds().max(0);
    let lead = if lead_s <= SHORT_RANGE_MAX_LEAD_S {
        LeadTime::ShortRange {
            minutes: round_seconds(lead_s, SHORT_RANGE_GRID_S) / 60,
        }
    } else {
        LeadTime::LongRange {
            hours: round_seconds(lead_s, LONG_RANGE_GRID_S) / 3600,
        }
    };
    WeatherProduct::Forecast { model_run, lead }
}

/// Display-only radar tile URL for the selected product. Fetching and
/// caching the image belongs to whoever renders it.
pub fn radar_product_url(base: &str, product: &WeatherProduct) -> String {
    let base = base.trim_end_matches('/');
    match product {
        WeatherProduct::Observation { valid_at } => {
            format!("{base}/observation/{}", valid_at.format("%Y%m%dT%H%MZ"))
        }
        WeatherProduct::Forecast { model_run, lead } => {
            let run = model_run.format("%Y%m%dT%H%MZ");
            match lead {
                LeadTime::ShortRange { minutes } => format!("{base}/forecast/{run}/PT{minutes}M"),
                LeadTime::LongRange { hours } => format!("{base}/forecast/{run}/PT{hours}H"),
            }
        }
    }
}

/// Serializable description of a product, as returned by the HTTP surface.
pub fn product_info(product: &WeatherProduct, radar_base: &str) -> WeatherProductInfo {
    let radar_url = radar_product_url(radar_base, product);
    match product {
        WeatherProduct::Observation { valid_at } => WeatherProductInfo {
            kind: ProductKind::Observation,
            valid_at_unix: Some(valid_at.timestamp()),
            model_run_unix: None,
            lead_minutes: None,
            lead_hours: None,
            radar_url,
        },
        WeatherProduct::Forecast { model_run, lead } => {
            let (lead_minutes, lead_hours) = match lead {
                LeadTime::ShortRange { minutes } => (Some(*minutes), None),
                LeadTime::LongRange { hours } => (None, Some(*hours)),
            };
            WeatherProductInfo {
                kind: ProductKind::Forecast,
                valid_at_unix: None,
                model_run_unix: Some(model_run.timestamp()),
                lead_minutes,
                lead_hours,
                radar_url,
            }
        }
    }
}

fn floor_to_grid(t: DateTime<Utc>, grid_s: i64) -> DateTime<Utc> {
    let ts = t.timestamp();
    DateTime::<Utc>::from_timestamp(ts - ts.rem_euclid(grid_s), 0).unwrap_or(t)
}

fn round_to_grid(t: DateTime<Utc>, grid_s: i64) -> DateTime<Utc> {
    let ts = t.timestamp();
    DateTime::<Utc>::from_timestamp(round_seconds(ts, grid_s), 0).unwrap_or(t)
}

fn round_seconds(seconds: i64, grid_s: i64) -> i64 {
    ((seconds + grid_s / 2).div_euclid(grid_s)) * grid_s
}
