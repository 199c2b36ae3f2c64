use shared::{Coordinate, WeatherObservation};

use crate::geometry::segments;

/// Fixed classification thresholds: an angular difference between the travel
/// bearing and the wind-toward bearing strictly below 45° is a tailwind,
/// strictly above 135° a headwind, anything else a crosswind.
const TAILWIND_MAX_DIFF_DEG: f64 = 45.0;
const HEADWIND_MIN_DIFF_DEG: f64 = 135.0;

/// Ceiling, floor, and density divisor of the per-route weather sampling.
/// Fetching one observation per coordinate would be thousands of requests;
/// instead a bounded set of points is sampled evenly by array index.
const MAX_WEATHER_SAMPLES: usize = 15;
const MIN_WEATHER_SAMPLES: usize = 3;
const POINTS_PER_SAMPLE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindImpact {
    Tailwind,
    Headwind,
    Crosswind,
}

/// Classify wind relative to the direction of travel on one segment.
///
/// `wind_origin_deg` is the direction the wind blows *from*; the wind-toward
/// bearing is origin + 180°. Total function: any finite inputs produce one of
/// the three classes.
pub fn classify(segment_bearing_deg: f64, wind_origin_deg: f64) -> WindImpact {
    let wind_toward = (wind_origin_deg + 180.0).rem_euclid(360.0);
    let mut diff = (segment_bearing_deg.rem_euclid(360.0) - wind_toward).abs();
    if diff > 180.0 {
        diff = 360.0 - diff;
    }

    if diff < TAILWIND_MAX_DIFF_DEG {
        WindImpact::Tailwind
    } else if diff > HEADWIND_MIN_DIFF_DEG {
        WindImpact::Headwind
    } else {
        WindImpact::Crosswind
    }
}

/// Distance-weighted share of a route ridden with tail-, head-, and
/// crosswind. Percentages sum to 100 ± 1 (independent rounding) for any
/// non-degenerate geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindExposure {
    pub tail_pct: u8,
    pub head_pct: u8,
    pub cross_pct: u8,
}

impl WindExposure {
    /// The documented result for geometry too short to carry any segment:
    /// fully neutral.
    pub fn degenerate() -> Self {
        Self {
            tail_pct: 0,
            head_pct: 0,
            cross_pct: 100,
        }
    }
}

/// Indices into a `point_count`-long coordinate array at which weather is
/// sampled: `point_count / 50 + 2` points, clamped to [3, 15], spread evenly
/// by index with the first and last coordinate always included.
pub fn sample_indices(point_count: usize) -> Vec<usize> {
    if point_count < 2 {
        return Vec::new();
    }
    let num_samples = (point_count / POINTS_PER_SAMPLE + 2)
        .clamp(MIN_WEATHER_SAMPLES, MAX_WEATHER_SAMPLES);
    let last = point_count - 1;

    (0..num_samples)
        .map(|k| {
            let t = k as f64 / (num_samples - 1) as f64;
            ((last as f64) * t).round() as usize
        })
        .collect()
}

/// Pad a partially failed batch of observations so its length matches the
/// requested sample count: repeat the most recent valid observation, or
/// `None` when the batch holds none, rather than failing the aggregation.
pub fn pad_samples(
    mut samples: Vec<Option<WeatherObservation>>,
    expected: usize,
) -> Vec<Option<WeatherObservation>> {
    let filler = samples.iter().rev().find_map(|s| *s);
    while samples.len() < expected {
        samples.push(filler);
    }
    samples.truncate(expected);
    samples
}

/// Aggregate per-segment wind classifications into route-level percentages.
///
/// `samples[k]` is the observation fetched at `sample_indices(coords.len())[k]`.
/// Every segment is assigned to the sample whose index is closest to the
/// segment's midpoint index; this is index proximity, not geographic
/// proximity, matching the even-spacing assumption of the sampling scheme.
/// Segments without an observation count as crosswind so the percentage base
/// always covers the full route length.
pub fn aggregate_wind_exposure(
    coords: &[Coordinate],
    samples: &[Option<WeatherObservation>],
) -> WindExposure {
    if coords.len() < 2 {
        return WindExposure::degenerate();
    }
    let indices = sample_indices(coords.len());

    let mut tail_m = 0.0;
    let mut head_m = 0.0;
    let mut cross_m = 0.0;

    for seg in segments(coords) {
        let midpoint = seg.start_index as f64 + 0.5;
        let nearest = indices
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let da = (midpoint - **a as f64).abs();
                let db = (midpoint - **b as f64).abs();
                da.total_cmp(&db)
            })
            .map(|(k, _)| k);

        let observation = nearest.and_then(|k| samples.get(k).copied().flatten());
        let impact = match observation {
            Some(obs) => classify(seg.bearing_deg, obs.wind_origin_deg),
            None => WindImpact::Crosswind,
        };
        match impact {
            WindImpact::Tailwind => tail_m += seg.length_m,
            WindImpact::Headwind => head_m += seg.length_m,
            WindImpact::Crosswind => cross_m += seg.length_m,
        }
    }

    let total_m = tail_m + head_m + cross_m;
    if total_m <= 0.0 {
        // All points coincide; nothing to classify.
        return WindExposure::degenerate();
    }

    let pct = |part: f64| ((part / total_m) * 100.0).round().min(100.0) as u8;
    WindExposure {
        tail_pct: pct(tail_m),
        head_pct: pct(head_m),
        cross_pct: pct(cross_m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate { lat, lon }
    }

    #[test]
    fn wind_from_north_opposes_northbound_travel() {
        assert_eq!(classify(0.0, 0.0), WindImpact::Headwind);
    }

    #[test]
    fn wind_from_north_pushes_southbound_travel() {
        assert_eq!(classify(180.0, 0.0), WindImpact::Tailwind);
    }

    #[test]
    fn boundaries_are_strict() {
        // Wind from north blows toward 180; pick travel bearings producing
        // the exact angular differences.
        assert_eq!(classify(135.1, 0.0), WindImpact::Tailwind); // diff 44.9
        assert_eq!(classify(135.0, 0.0), WindImpact::Crosswind); // diff 45.0
        assert_eq!(classify(45.0, 0.0), WindImpact::Crosswind); // diff 135.0
        assert_eq!(classify(44.9, 0.0), WindImpact::Headwind); // diff 135.1
    }

    #[test]
    fn classify_handles_wraparound() {
        // Wind from 350 blows toward 170; travelling at 10 gives a raw diff
        // of 160, a headwind either way around the circle.
        assert_eq!(classify(10.0, 350.0), WindImpact::Headwind);
        // Travelling at 170 is a pure tailwind.
        assert_eq!(classify(170.0, 350.0), WindImpact::Tailwind);
    }

    #[test]
    fn sample_count_scales_with_point_count() {
        assert_eq!(sample_indices(0), Vec::<usize>::new());
        assert_eq!(sample_indices(1), Vec::<usize>::new());
        assert_eq!(sample_indices(10).len(), 3); // floor
        assert_eq!(sample_indices(200).len(), 6); // 200/50 + 2
        assert_eq!(sample_indices(5000).len(), 15); // ceiling
    }

    #[test]
    fn sample_indices_cover_endpoints() {
        let indices = sample_indices(120);
        assert_eq!(*indices.first().unwrap(), 0);
        assert_eq!(*indices.last().unwrap(), 119);
        assert!(indices.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn pad_repeats_last_valid_observation() {
        let obs = WeatherObservation::from_bearing(90.0);
        let padded = pad_samples(vec![Some(obs)], 3);
        assert_eq!(padded.len(), 3);
        assert!(padded.iter().all(|s| s.is_some()));

        // A trailing failure does not poison the filler; the most recent
        // valid observation is what gets repeated.
        let padded = pad_samples(vec![Some(obs), None], 4);
        assert_eq!(padded, vec![Some(obs), None, Some(obs), Some(obs)]);

        let padded = pad_samples(Vec::new(), 3);
        assert_eq!(padded, vec![None, None, None]);
    }

    fn northbound_route() -> Vec<Coordinate> {
        (0..5).map(|i| coord(50.0 + 0.01 * i as f64, 0.0)).collect()
    }

    #[test]
    fn degenerate_geometry_is_all_crosswind() {
        let exposure = aggregate_wind_exposure(&[], &[]);
        assert_eq!(exposure, WindExposure::degenerate());
        let exposure = aggregate_wind_exposure(&[coord(50.0, 0.0)], &[]);
        assert_eq!(exposure, WindExposure::degenerate());
        // Distinct-looking input of coincident points is equally degenerate.
        let exposure = aggregate_wind_exposure(&[coord(50.0, 0.0); 4], &[None, None, None]);
        assert_eq!(exposure, WindExposure::degenerate());
    }

    #[test]
    fn uniform_headwind_covers_whole_route() {
        let route = northbound_route();
        let samples = vec![Some(WeatherObservation::from_bearing(0.0)); 3];
        let exposure = aggregate_wind_exposure(&route, &samples);
        assert_eq!(exposure.head_pct, 100);
        assert_eq!(exposure.tail_pct, 0);
        assert_eq!(exposure.cross_pct, 0);
    }

    #[test]
    fn uniform_tailwind_covers_whole_route() {
        let route = northbound_route();
        let samples = vec![Some(WeatherObservation::from_bearing(180.0)); 3];
        let exposure = aggregate_wind_exposure(&route, &samples);
        assert_eq!(exposure.tail_pct, 100);
    }

    #[test]
    fn missing_observations_fall_back_to_crosswind() {
        let route = northbound_route();
        let exposure = aggregate_wind_exposure(&route, &[None, None, None]);
        assert_eq!(exposure.cross_pct, 100);
        assert_eq!(exposure.tail_pct, 0);
        assert_eq!(exposure.head_pct, 0);
    }

    #[test]
    fn segments_split_between_samples() {
        // Northbound route; first sample gives wind from the north
        // (headwind), last from the south (tailwind). Segments split by
        // midpoint-index proximity.
        let route = northbound_route();
        let samples = vec![
            Some(WeatherObservation::from_bearing(0.0)),
            Some(WeatherObservation::from_bearing(0.0)),
            Some(WeatherObservation::from_bearing(180.0)),
        ];
        let exposure = aggregate_wind_exposure(&route, &samples);
        assert!(exposure.head_pct > 0);
        assert!(exposure.tail_pct > 0);
        let sum = exposure.tail_pct as i32 + exposure.head_pct as i32 + exposure.cross_pct as i32;
        assert!((99..=101).contains(&sum));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_classify_total(bearing in 0.0f64..360.0, origin in 0.0f64..360.0) {
                // Just must not panic and must return one of three classes.
                let _ = classify(bearing, origin);
            }

            #[test]
            fn prop_percentages_sum_to_hundred(
                lats in prop::collection::vec(49.0f64..51.0, 2..40),
                origin in 0.0f64..360.0,
            ) {
                let route: Vec<Coordinate> = lats
                    .iter()
                    .enumerate()
                    .map(|(i, lat)| Coordinate { lat: *lat, lon: 0.001 * i as f64 })
                    .collect();
                let n = sample_indices(route.len()).len();
                let samples = vec![Some(WeatherObservation::from_bearing(origin)); n];
                let exposure = aggregate_wind_exposure(&route, &samples);
                let sum = exposure.tail_pct as i32
                    + exposure.head_pct as i32
                    + exposure.cross_pct as i32;
                prop_assert!((99..=101).contains(&sum));
            }

            #[test]
            fn prop_sample_indices_bounded(n in 2usize..5000) {
                let indices = sample_indices(n);
                prop_assert!((3..=15).contains(&indices.len()));
                prop_assert_eq!(*indices.first().unwrap(), 0);
                prop_assert_eq!(*indices.last().unwrap(), n - 1);
                prop_assert!(indices.iter().all(|&i| i < n));
            }
        }
    }
}
