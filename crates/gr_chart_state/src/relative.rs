use gr_types::TimeInt;

/// Relative ("percentage change") mode for line-family series: every value
/// becomes the percentage change against the value at the series' first
/// point in the window.
///
/// Two guarded edge cases, both pinned by tests:
/// * a window where start == end makes relative mode meaningless — the
///   caller must skip the transform entirely (identity), never divide a
///   value by itself into `NaN`;
/// * a series whose start value is zero or missing is excluded (`None`),
///   not mapped through a division by zero.
pub fn relative_change_from_start(points: &[(TimeInt, f64)]) -> Option<Vec<(TimeInt, f64)>> {
    let &(_, start_value) = points.first()?;
    if start_value == 0.0 {
        return None;
    }
    Some(
        points
            .iter()
            .map(|&(time, value)| (time, 100.0 * (value - start_value) / start_value))
            .collect(),
    )
}

/// Relative mode for stacks: each segment becomes its share (in percent) of
/// the stack's total at that time. An all-zero (or all-missing) total maps
/// every segment to 0 — never `NaN`.
pub fn share_of_total(value: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        100.0 * value / total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(time: i64, value: f64) -> (TimeInt, f64) {
        (TimeInt::new(time), value)
    }

    #[test]
    fn percentage_change_against_first_point() {
        let points = vec![t(2000, 50.0), t(2001, 75.0), t(2002, 25.0)];
        assert_eq!(
            relative_change_from_start(&points).unwrap(),
            vec![t(2000, 0.0), t(2001, 50.0), t(2002, -50.0)]
        );
    }

    #[test]
    fn zero_start_value_is_excluded_not_infinite() {
        let points = vec![t(2000, 0.0), t(2001, 10.0)];
        assert_eq!(relative_change_from_start(&points), None);
        assert_eq!(relative_change_from_start(&[]), None);
    }

    #[test]
    fn share_of_zero_total_is_zero_not_nan() {
        assert_eq!(share_of_total(0.0, 0.0), 0.0);
        assert_eq!(share_of_total(25.0, 100.0), 25.0);
    }
}
