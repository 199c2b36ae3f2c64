use shared::RouteStep;

/// Road-class and amenity exposure of one route alternative, each category
/// an independent percentage of the route's total distance. A step may count
/// toward several categories at once ("Regents Canal Path" is both
/// cycle-friendly and scenic), so the percentages are not meant to sum to
/// anything in particular.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteCharacteristics {
    pub a_road_pct: u8,
    pub motorway_pct: u8,
    pub cycle_lane_pct: u8,
    pub scenic_pct: u8,
}

const CYCLE_KEYWORDS: [&str; 4] = ["cycle", "path", "greenway", "towpath"];
const SCENIC_KEYWORDS: [&str; 8] = [
    "park", "forest", "wood", "common", "trail", "river", "canal", "lake",
];

/// Scan a route's step annotations for road-class and amenity markers and
/// accumulate the matched distance per category.
///
/// Missing or empty step lists yield all-zero percentages, never an error.
pub fn analyze<'a>(
    steps: impl IntoIterator<Item = &'a RouteStep>,
    total_distance_m: f64,
) -> RouteCharacteristics {
    let mut a_road_m = 0.0;
    let mut motorway_m = 0.0;
    let mut cycle_m = 0.0;
    let mut scenic_m = 0.0;

    for step in steps {
        let name = step.name.to_lowercase();
        let road_ref = step.road_ref.to_lowercase();

        if has_road_code(&name, 'a') || has_road_code(&road_ref, 'a') {
            a_road_m += step.distance_m;
        }
        if has_road_code(&name, 'm') || has_road_code(&road_ref, 'm') {
            motorway_m += step.distance_m;
        }
        if CYCLE_KEYWORDS
            .iter()
            .any(|kw| name.contains(kw) || road_ref.contains(kw))
            || road_ref.contains("ncn")
        {
            cycle_m += step.distance_m;
        }
        if SCENIC_KEYWORDS.iter().any(|kw| name.contains(kw)) {
            scenic_m += step.distance_m;
        }
    }

    if total_distance_m <= 0.0 {
        return RouteCharacteristics::default();
    }
    let pct = |matched_m: f64| ((matched_m / total_distance_m) * 100.0).round().min(100.0) as u8;

    RouteCharacteristics {
        a_road_pct: pct(a_road_m),
        motorway_pct: pct(motorway_m),
        cycle_lane_pct: pct(cycle_m),
        scenic_pct: pct(scenic_m),
    }
}

/// Whole-word match for a road code: the class letter followed by one or
/// more digits, e.g. "a406" in lowercased text. Embedded digit runs inside
/// longer tokens ("abbey") never match.
fn has_road_code(lower_text: &str, class_letter: char) -> bool {
    lower_text
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| {
            let mut chars = word.chars();
            chars.next() == Some(class_letter)
                && !chars.as_str().is_empty()
                && chars.as_str().chars().all(|c| c.is_ascii_digit())
        })
}
