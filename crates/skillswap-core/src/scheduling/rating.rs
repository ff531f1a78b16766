#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregateRating {
    /// Arithmetic mean rounded to one decimal, half-up at the 0.05 boundary.
    pub mean: f64,
    pub sessions: i32,
}

/// Aggregate the ratings of a teacher's completed, rated appointments.
/// Returns `None` on an empty set; callers only recompute after a feedback
/// write, so the set is non-empty in practice.
pub fn aggregate_ratings(ratings: &[i32]) -> Option<AggregateRating> {
    if ratings.is_empty() {
        return None;
    }

    let sum: i64 = ratings.iter().map(|r| *r as i64).sum();
    let mean = sum as f64 / ratings.len() as f64;

    Some(AggregateRating {
        mean: (mean * 10.0).round() / 10.0,
        sessions: ratings.len() as i32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_yields_nothing() {
        assert_eq!(aggregate_ratings(&[]), None);
    }

    #[test]
    fn first_rating_is_the_mean() {
        let agg = aggregate_ratings(&[5]).unwrap();
        assert_eq!(agg.mean, 5.0);
        assert_eq!(agg.sessions, 1);
    }

    #[test]
    fn second_rating_averages() {
        let agg = aggregate_ratings(&[5, 3]).unwrap();
        assert_eq!(agg.mean, 4.0);
        assert_eq!(agg.sessions, 2);
    }

    #[test]
    fn rounds_to_one_decimal() {
        // 5 + 5 + 4 = 14 / 3 = 4.666... -> 4.7
        let agg = aggregate_ratings(&[5, 5, 4]).unwrap();
        assert_eq!(agg.mean, 4.7);
    }

    #[test]
    fn rounds_half_up_at_the_boundary() {
        // 4 + 5 + 4 + 4 = 17 / 4 = 4.25 -> 4.3
        let agg = aggregate_ratings(&[4, 5, 4, 4]).unwrap();
        assert_eq!(agg.mean, 4.3);
    }
}
