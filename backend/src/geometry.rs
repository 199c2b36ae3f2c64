use shared::Coordinate;

const EARTH_RADIUS_M: f64 = 6_371_000.0;
const METERS_PER_DEGREE_LAT: f64 = 111_000.0;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("polyline requires at least two points")]
    InvalidGeometry,
}

/// Initial great-circle bearing from `a` to `b`, degrees in [0, 360).
///
/// Undefined for two identical points; callers iterate with [`segments`]
/// which skips zero-length pairs instead of calling this on them.
pub fn bearing_between(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Haversine great-circle distance in meters.
pub fn distance_between(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// One non-degenerate consecutive coordinate pair of a route polyline.
#[derive(Debug, Clone, Copy)]
pub struct Segment {
    /// Index of the segment's first coordinate in the source polyline.
    pub start_index: usize,
    pub start: Coordinate,
    pub end: Coordinate,
    pub bearing_deg: f64,
    pub length_m: f64,
}

/// Iterate the segments of a polyline, skipping duplicate consecutive
/// points so no caller ever sees a zero-length segment or a NaN bearing.
pub fn segments(coords: &[Coordinate]) -> impl Iterator<Item = Segment> + '_ {
    coords.windows(2).enumerate().filter_map(|(i, pair)| {
        let length_m = distance_between(pair[0], pair[1]);
        if length_m <= 0.0 {
            return None;
        }
        Some(Segment {
            start_index: i,
            start: pair[0],
            end: pair[1],
            bearing_deg: bearing_between(pair[0], pair[1]),
            length_m,
        })
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineProjection {
    /// Minimum distance from the point to the polyline, meters.
    pub distance_m: f64,
    /// Fractional along-line position of the closest point, in [0, 1].
    pub fraction: f64,
}

/// Project a point onto a polyline: minimum distance to any segment and the
/// fractional along-line position of the closest point. Works in a local
/// equirectangular plane around the query point, accurate at route scale.
pub fn project_onto_line(
    point: Coordinate,
    line: &[Coordinate],
) -> Result<LineProjection, GeometryError> {
    if line.len() < 2 {
        return Err(GeometryError::InvalidGeometry);
    }

    let meters_per_degree_lon = METERS_PER_DEGREE_LAT * point.lat.to_radians().cos();
    let to_plane = |c: Coordinate| -> (f64, f64) {
        (
            (c.lon - point.lon) * meters_per_degree_lon,
            (c.lat - point.lat) * METERS_PER_DEGREE_LAT,
        )
    };

    let total_length: f64 = line
        .windows(2)
        .map(|pair| distance_between(pair[0], pair[1]))
        .sum();

    let mut best = LineProjection {
        distance_m: f64::INFINITY,
        fraction: 0.0,
    };
    let mut travelled = 0.0;

    for pair in line.windows(2) {
        let seg_len = distance_between(pair[0], pair[1]);
        let (ax, ay) = to_plane(pair[0]);
        let (bx, by) = to_plane(pair[1]);
        let (dx, dy) = (bx - ax, by - ay);
        let seg_sq = dx * dx + dy * dy;

        // Duplicate points project onto the point itself.
        let t = if seg_sq > 0.0 {
            ((-ax * dx - ay * dy) / seg_sq).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let (cx, cy) = (ax + dx * t, ay + dy * t);
        let distance_m = (cx * cx + cy * cy).sqrt();

        if distance_m < best.distance_m {
            let along = travelled + seg_len * t;
            best = LineProjection {
                distance_m,
                fraction: if total_length > 0.0 {
                    (along / total_length).clamp(0.0, 1.0)
                } else {
                    0.0
                },
            };
        }
        travelled += seg_len;
    }

    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate { lat, lon }
    }

    #[test]
    fn bearing_due_north_is_zero() {
        let b = bearing_between(coord(50.0, 0.0), coord(51.0, 0.0));
        assert!(b.abs() < 1e-9);
    }

    #[test]
    fn bearing_due_east_is_ninety() {
        let b = bearing_between(coord(0.0, 0.0), coord(0.0, 1.0));
        assert!((b - 90.0).abs() < 1e-9);
    }

    #[test]
    fn bearing_due_south_is_one_eighty() {
        let b = bearing_between(coord(51.0, 0.0), coord(50.0, 0.0));
        assert!((b - 180.0).abs() < 1e-9);
    }

    #[test]
    fn distance_zero_for_same_point() {
        let p = coord(45.0, 5.0);
        assert_eq!(distance_between(p, p), 0.0);
    }

    #[test]
    fn distance_paris_to_london() {
        // Known distance ~343 km.
        let d = distance_between(coord(48.8566, 2.3522), coord(51.5074, -0.1278));
        assert!((d - 343_000.0).abs() < 5_000.0);
    }

    #[test]
    fn segments_skip_duplicate_points() {
        let line = vec![
            coord(51.5, -0.1),
            coord(51.5, -0.1),
            coord(51.6, -0.1),
            coord(51.6, -0.1),
        ];
        let segs: Vec<_> = segments(&line).collect();
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].start_index, 1);
        assert!(segs[0].bearing_deg.is_finite());
    }

    #[test]
    fn project_rejects_short_line() {
        let err = project_onto_line(coord(0.0, 0.0), &[coord(1.0, 1.0)]).unwrap_err();
        assert_eq!(err, GeometryError::InvalidGeometry);
        let err = project_onto_line(coord(0.0, 0.0), &[]).unwrap_err();
        assert_eq!(err, GeometryError::InvalidGeometry);
    }

    #[test]
    fn project_onto_midpoint_of_straight_line() {
        // Point due east of a north-south line's midpoint.
        let line = vec![coord(50.0, 0.0), coord(50.2, 0.0)];
        let p = project_onto_line(coord(50.1, 0.01), &line).unwrap();
        assert!((p.fraction - 0.5).abs() < 0.01);
        // ~0.01 deg of longitude at 50N ≈ 715 m
        assert!((p.distance_m - 715.0).abs() < 30.0);
    }

    #[test]
    fn project_clamps_before_line_start() {
        let line = vec![coord(50.0, 0.0), coord(50.2, 0.0)];
        let p = project_onto_line(coord(49.9, 0.0), &line).unwrap();
        assert_eq!(p.fraction, 0.0);
        assert!(p.distance_m > 10_000.0);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn valid_coord() -> impl Strategy<Value = Coordinate> {
            (-85.0..=85.0, -180.0..=180.0).prop_map(|(lat, lon)| Coordinate { lat, lon })
        }

        proptest! {
            #[test]
            fn prop_bearing_in_range(a in valid_coord(), b in valid_coord()) {
                prop_assume!((a.lat - b.lat).abs() > 1e-9 || (a.lon - b.lon).abs() > 1e-9);
                let bearing = bearing_between(a, b);
                prop_assert!((0.0..360.0).contains(&bearing));
            }

            #[test]
            fn prop_distance_symmetric(a in valid_coord(), b in valid_coord()) {
                prop_assert!((distance_between(a, b) - distance_between(b, a)).abs() < 1e-6);
            }

            #[test]
            fn prop_distance_non_negative_and_bounded(a in valid_coord(), b in valid_coord()) {
                let d = distance_between(a, b);
                prop_assert!(d >= 0.0);
                prop_assert!(d <= std::f64::consts::PI * EARTH_RADIUS_M + 1.0);
            }

            #[test]
            fn prop_segments_never_degenerate(
                coords in prop::collection::vec(valid_coord(), 0..20)
            ) {
                for seg in segments(&coords) {
                    prop_assert!(seg.length_m > 0.0);
                    prop_assert!(seg.bearing_deg.is_finite());
                    prop_assert!((0.0..360.0).contains(&seg.bearing_deg));
                }
            }

            #[test]
            fn prop_projection_fraction_in_unit_interval(
                point in valid_coord(),
                line in prop::collection::vec(valid_coord(), 2..10)
            ) {
                let p = project_onto_line(point, &line).unwrap();
                prop_assert!((0.0..=1.0).contains(&p.fraction));
                prop_assert!(p.distance_m >= 0.0);
            }
        }
    }
}
