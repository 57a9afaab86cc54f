//! Rounding helpers for rendering minute values in the trace.

/// Round half away from zero to two decimals
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Drop everything past the second decimal
pub fn truncate2(v: f64) -> f64 {
    (v * 100.0).trunc() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_to_two_decimals() {
        assert_eq!(truncate2(3.14159), 3.14);
        assert_eq!(truncate2(2.71828), 2.71);
        assert_eq!(truncate2(1.005), 1.0);
    }

    #[test]
    fn round_to_two_decimals() {
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(2.71828), 2.72);
        assert_eq!(round2(-0.125), -0.13);
    }
}
