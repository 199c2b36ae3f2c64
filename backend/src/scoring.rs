use shared::{RouteAlternative, RoutePreferences, RouteScore, ScoredRoute};

use crate::characteristics::RouteCharacteristics;
use crate::wind::WindExposure;

/// Weights of the composite score. These are the product's fixed heuristic
/// constants, not calibrated utilities: a fully motorway-bound route takes a
/// −500 hit and will sink below nearly anything else, which is the intended
/// reading of "do not send a bicycle onto a motorway".
const BASE_SCORE: f64 = 50.0;
const WIND_MIDPOINT_PCT: f64 = 50.0;
const CYCLE_LANE_WEIGHT: f64 = 0.5;
const SCENIC_WEIGHT: f64 = 2.0;
const A_ROAD_WEIGHT: f64 = 1.5;
const MOTORWAY_WEIGHT: f64 = 5.0;
const METERS_CLIMBED_PER_POINT: f64 = 10.0;
const SLOWER_MINUTE_WEIGHT: f64 = 2.0;
const AVOID_A_ROAD_PENALTY: f64 = 50.0;
const AVOID_A_ROAD_THRESHOLD_PCT: u8 = 5;

/// Everything the ranking needs for one alternative, gathered upstream by
/// the planner; this module stays pure.
#[derive(Debug, Clone)]
pub struct RankingInput {
    pub alternative: RouteAlternative,
    pub wind: WindExposure,
    pub characteristics: RouteCharacteristics,
    pub ascent_m: f64,
}

/// Deterministic weighted blend of wind favorability, infrastructure,
/// road danger, climbing effort, and time lost against the fastest
/// alternative. Higher is better.
pub fn composite_score(
    wind: WindExposure,
    characteristics: RouteCharacteristics,
    ascent_m: f64,
    duration_s: f64,
    fastest_duration_s: f64,
    prefs: RoutePreferences,
) -> f64 {
    let ascent_m = if ascent_m.is_finite() { ascent_m } else { 0.0 };
    let minutes_slower = if duration_s.is_finite() && fastest_duration_s.is_finite() {
        ((duration_s - fastest_duration_s) / 60.0).max(0.0)
    } else {
        0.0
    };

    let mut score = BASE_SCORE
        + (wind.tail_pct as f64 - WIND_MIDPOINT_PCT)
        + characteristics.cycle_lane_pct as f64 * CYCLE_LANE_WEIGHT
        - characteristics.a_road_pct as f64 * A_ROAD_WEIGHT
        - characteristics.motorway_pct as f64 * MOTORWAY_WEIGHT
        - ascent_m / METERS_CLIMBED_PER_POINT
        - minutes_slower * SLOWER_MINUTE_WEIGHT;

    if prefs.prefer_scenic {
        score += characteristics.scenic_pct as f64 * SCENIC_WEIGHT;
    }
    if prefs.avoid_a_roads && characteristics.a_road_pct > AVOID_A_ROAD_THRESHOLD_PCT {
        score -= AVOID_A_ROAD_PENALTY;
    }

    score
}

/// Score every alternative against the fastest one and sort best-first.
/// Index 0 of the result is the recommendation.
pub fn rank(inputs: Vec<RankingInput>, prefs: RoutePreferences) -> Vec<ScoredRoute> {
    let fastest_duration_s = inputs
        .iter()
        .map(|input| input.alternative.duration_s)
        .filter(|d| d.is_finite())
        .fold(f64::INFINITY, f64::min);

    let mut scored: Vec<ScoredRoute> = inputs
        .into_iter()
        .map(|input| {
            let composite = composite_score(
                input.wind,
                input.characteristics,
                input.ascent_m,
                input.alternative.duration_s,
                fastest_duration_s,
                prefs,
            );
            ScoredRoute {
                score: RouteScore {
                    tail_pct: input.wind.tail_pct,
                    head_pct: input.wind.head_pct,
                    cross_pct: input.wind.cross_pct,
                    a_road_pct: input.characteristics.a_road_pct,
                    motorway_pct: input.characteristics.motorway_pct,
                    cycle_lane_pct: input.characteristics.cycle_lane_pct,
                    scenic_pct: input.characteristics.scenic_pct,
                    ascent_m: input.ascent_m,
                    composite,
                    rank: 0,
                },
                alternative: input.alternative,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.score.composite.total_cmp(&a.score.composite));
    for (rank, route) in scored.iter_mut().enumerate() {
        route.score.rank = rank;
    }
    scored
}
