//! Angle and range helpers.

/// Reduce an integer angle in degrees into `[0, 360)`.
pub fn wrap_degrees(degrees: i64) -> i64 {
    degrees.rem_euclid(360)
}

/// Circular distance between two headings in degrees.
///
/// The minimum of the direct difference and the two wrap-around candidates
/// (`a + (360 - b)` and `(360 - a) + b`). For headings in `[0, 360)` the
/// result lies in `[0, 180]`.
pub fn circular_distance_deg(a: f64, b: f64) -> f64 {
    let direct = (a - b).abs();
    let wrap_forward = (a + (360.0 - b)).abs();
    let wrap_backward = ((360.0 - a) + b).abs();
    direct.min(wrap_forward).min(wrap_backward)
}

/// Min-max scale `value` into the unit interval defined by `[min, max]`.
///
/// Values outside the range map outside `[0, 1]`; no clamping is applied.
pub fn min_max_scale(value: f64, min: f64, max: f64) -> f64 {
    (value - min) / (max - min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_degrees_handles_negatives() {
        assert_eq!(wrap_degrees(-30), 330);
        assert_eq!(wrap_degrees(360), 0);
        assert_eq!(wrap_degrees(725), 5);
    }

    #[test]
    fn circular_distance_takes_short_way_round() {
        assert_eq!(circular_distance_deg(10.0, 350.0), 20.0);
        assert_eq!(circular_distance_deg(350.0, 10.0), 20.0);
        assert_eq!(circular_distance_deg(90.0, 270.0), 180.0);
        assert_eq!(circular_distance_deg(45.0, 45.0), 0.0);
    }

    #[test]
    fn min_max_scale_maps_endpoints() {
        assert_eq!(min_max_scale(-16.0, -16.0, 19.0), 0.0);
        assert_eq!(min_max_scale(19.0, -16.0, 19.0), 1.0);
        assert_eq!(min_max_scale(90.0, 0.0, 180.0), 0.5);
    }
}
