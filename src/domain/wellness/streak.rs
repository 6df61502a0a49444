//! Streak computation over activity dates.

use chrono::NaiveDate;

/// Computes the current streak: consecutive calendar days with at least one
/// qualifying record, counted backward from the most recent active day with
/// no gaps.
///
/// `dates` may arrive in any order and contain duplicates (several records
/// on one day count once).
pub fn current_streak(dates: &[NaiveDate]) -> u32 {
    if dates.is_empty() {
        return 0;
    }

    let mut days: Vec<NaiveDate> = dates.to_vec();
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();

    let mut streak = 1;
    let mut cursor = days[0];
    for day in &days[1..] {
        let expected = cursor.pred_opt();
        match expected {
            Some(previous) if *day == previous => {
                streak += 1;
                cursor = *day;
            }
            _ => break,
        }
    }
    streak
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn no_activity_means_no_streak() {
        assert_eq!(current_streak(&[]), 0);
    }

    #[test]
    fn single_day_counts_as_one() {
        assert_eq!(current_streak(&[date(2026, 8, 7)]), 1);
    }

    #[test]
    fn consecutive_days_accumulate() {
        let days = vec![
            date(2026, 8, 5),
            date(2026, 8, 6),
            date(2026, 8, 7),
        ];
        assert_eq!(current_streak(&days), 3);
    }

    #[test]
    fn gap_breaks_the_streak() {
        let days = vec![
            date(2026, 8, 3), // gap on the 4th
            date(2026, 8, 5),
            date(2026, 8, 6),
            date(2026, 8, 7),
        ];
        assert_eq!(current_streak(&days), 3);
    }

    #[test]
    fn multiple_records_on_one_day_count_once() {
        let days = vec![
            date(2026, 8, 6),
            date(2026, 8, 7),
            date(2026, 8, 7),
            date(2026, 8, 7),
        ];
        assert_eq!(current_streak(&days), 2);
    }

    #[test]
    fn order_of_input_does_not_matter() {
        let days = vec![
            date(2026, 8, 7),
            date(2026, 8, 5),
            date(2026, 8, 6),
        ];
        assert_eq!(current_streak(&days), 3);
    }

    #[test]
    fn streak_crosses_month_boundaries() {
        let days = vec![
            date(2026, 7, 30),
            date(2026, 7, 31),
            date(2026, 8, 1),
        ];
        assert_eq!(current_streak(&days), 3);
    }

    #[test]
    fn seven_day_streak_counts_exactly_seven() {
        let days: Vec<_> = (1..=7).map(|d| date(2026, 8, d)).collect();
        assert_eq!(current_streak(&days), 7);
    }
}
