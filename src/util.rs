use log::LevelFilter;

/// Velocity bounds of a MIDI note-on.
pub const VELOCITY_RANGE: (f64, f64) = (1.0, 127.0);

/// Linearly maps `value` from `from` onto `to`. Values outside `from` are not clamped.
pub fn min_max_norm(value: f64, from: (f64, f64), to: (f64, f64)) -> f64 {
    (value - from.0) / (from.1 - from.0) * (to.1 - to.0) + to.0
}

/// Opacity for a note velocity, `1 -> 0.0` and `127 -> 1.0`.
pub fn velocity_to_alpha(velocity: u8) -> f64 {
    min_max_norm(velocity as f64, VELOCITY_RANGE, (0.0, 1.0))
}

pub fn parse_verbosity(input: &str) -> Option<LevelFilter> {
    match input.to_uppercase().as_str() {
        "DEBUG" => Some(LevelFilter::Debug),
        "INFO" => Some(LevelFilter::Info),
        "WARN" | "WARNING" => Some(LevelFilter::Warn),
        // `log` has no level above error
        "ERROR" | "FATAL" => Some(LevelFilter::Error),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn alpha_bounds_are_exact() {
        assert_eq!(velocity_to_alpha(1), 0.0);
        assert_eq!(velocity_to_alpha(127), 1.0);
        assert_eq!(velocity_to_alpha(64), 63.0 / 126.0);
    }

    #[test]
    fn alpha_is_linear_in_velocity() {
        let step = velocity_to_alpha(2) - velocity_to_alpha(1);
        for v in 1..127u8 {
            let diff = velocity_to_alpha(v + 1) - velocity_to_alpha(v);
            assert!((diff - step).abs() < 1e-12);
        }
    }

    #[test]
    fn out_of_range_velocity_is_not_clamped() {
        assert!(velocity_to_alpha(0) < 0.0);
        assert_eq!(min_max_norm(253.0, VELOCITY_RANGE, (0.0, 1.0)), 2.0);
    }

    #[test]
    fn verbosity_names() {
        assert_eq!(parse_verbosity("DEBUG"), Some(LevelFilter::Debug));
        assert_eq!(parse_verbosity("warn"), Some(LevelFilter::Warn));
        assert_eq!(parse_verbosity("FATAL"), Some(LevelFilter::Error));
        assert_eq!(parse_verbosity("LOUD"), None);
    }
}
