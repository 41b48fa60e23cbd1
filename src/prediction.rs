use chrono::{Duration, NaiveDate};

use crate::error::{PredictionError, ValidationError};

pub const DEFAULT_LOOKBACK: usize = 6;
/// Assumed cycle length when only one start date is known. A fixed policy,
/// not an estimate.
pub const FALLBACK_CYCLE_DAYS: f64 = 28.0;
/// Sample standard deviation above which cycles are flagged as irregular.
pub const IRREGULARITY_THRESHOLD_DAYS: f64 = 6.0;
const LUTEAL_PHASE_DAYS: i64 = 14;
const FERTILE_HALF_WIDTH_DAYS: i64 = 4;

pub const SINGLE_DATE_NOTE: &str = "Only one date provided. Using standard 28-day cycle.";
pub const IRREGULAR_NOTE: &str =
    "Your cycles appear irregular. Consider consulting a healthcare provider.";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Full-precision prediction. Rounding happens at the wire boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub predicted_date: NaiveDate,
    pub mean_cycle: f64,
    pub std_dev: f64,
    pub ci_lower: NaiveDate,
    pub ci_upper: NaiveDate,
    pub fertile_window_start: NaiveDate,
    pub fertile_window_end: NaiveDate,
    pub note: Option<&'static str>,
}

/// Parse period start dates. Rejects the whole history on the first bad entry.
pub fn parse_history<S: AsRef<str>>(past_starts: &[S]) -> Result<Vec<NaiveDate>, ValidationError> {
    if past_starts.is_empty() {
        return Err(ValidationError::EmptyHistory);
    }

    past_starts
        .iter()
        .map(|raw| {
            let raw = raw.as_ref().trim();
            let invalid = || ValidationError::InvalidDate {
                input: raw.to_string(),
            };
            if !has_four_digit_year(raw) {
                return Err(invalid());
            }
            NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| invalid())
        })
        .collect()
}

/// chrono's `%Y` also takes signed and short years; only `YYYY-` is allowed.
fn has_four_digit_year(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() > 4 && bytes[..4].iter().all(u8::is_ascii_digit) && bytes[4] == b'-'
}

pub fn predict_from_strings<S: AsRef<str>>(
    past_starts: &[S],
    lookback: usize,
) -> Result<Prediction, PredictionError> {
    let history = parse_history(past_starts)?;
    predict(&history, lookback)
}

/// Predict the next period start from a history of start dates.
/// Input order does not matter; duplicates are kept as zero-length cycles.
pub fn predict(history: &[NaiveDate], lookback: usize) -> Result<Prediction, PredictionError> {
    if history.is_empty() {
        return Err(ValidationError::EmptyHistory.into());
    }
    if lookback == 0 {
        return Err(ValidationError::InvalidLookback.into());
    }

    let mut dates = history.to_vec();
    dates.sort_unstable();
    let last_start = dates[dates.len() - 1];

    let (mean_cycle, std_dev, note) = if dates.len() == 1 {
        (FALLBACK_CYCLE_DAYS, 0.0, Some(SINGLE_DATE_NOTE))
    } else {
        let cycle_lengths: Vec<f64> = dates
            .windows(2)
            .map(|w| (w[1] - w[0]).num_days() as f64)
            .collect();
        let recent = &cycle_lengths[cycle_lengths.len().saturating_sub(lookback)..];

        let std_dev = std_deviation(recent);
        let note = (std_dev > IRREGULARITY_THRESHOLD_DAYS).then_some(IRREGULAR_NOTE);
        (mean(recent), std_dev, note)
    };

    // Offsets truncate toward zero rather than round.
    let predicted_date = shift(last_start, mean_cycle.trunc() as i64)?;
    let spread = std_dev.trunc() as i64;
    let ovulation_day = shift(predicted_date, -LUTEAL_PHASE_DAYS)?;

    Ok(Prediction {
        predicted_date,
        mean_cycle,
        std_dev,
        ci_lower: shift(predicted_date, -spread)?,
        ci_upper: shift(predicted_date, spread)?,
        fertile_window_start: shift(ovulation_day, -FERTILE_HALF_WIDTH_DAYS)?,
        fertile_window_end: shift(ovulation_day, FERTILE_HALF_WIDTH_DAYS)?,
        note,
    })
}

/// Round to one decimal on the exact binary value, ties to even.
///
/// `28.15` is stored just below the midpoint and rounds down. The only exact
/// midpoints a double can hold at one decimal are odd multiples of `0.25`.
pub fn round_one_decimal(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        return (value * 10.0).round_ties_even() / 10.0;
    }
    format!("{value:.1}").parse().unwrap_or(value)
}

fn shift(date: NaiveDate, days: i64) -> Result<NaiveDate, PredictionError> {
    Duration::try_days(days)
        .and_then(|offset| date.checked_add_signed(offset))
        .ok_or_else(|| {
            PredictionError::Internal(format!("date {date} shifted by {days} days is out of range"))
        })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn std_deviation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let variance =
        values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    const REGULAR: [&str; 5] = [
        "2025-07-01",
        "2025-07-29",
        "2025-08-27",
        "2025-09-25",
        "2025-10-23",
    ];

    #[test]
    fn single_date_uses_standard_cycle() {
        let pred = predict_from_strings(&["2025-10-01"], DEFAULT_LOOKBACK).unwrap();
        assert_eq!(pred.mean_cycle, 28.0);
        assert_eq!(pred.std_dev, 0.0);
        assert_eq!(pred.predicted_date, date("2025-10-29"));
        assert_eq!(pred.ci_lower, pred.predicted_date);
        assert_eq!(pred.ci_upper, pred.predicted_date);
        assert_eq!(pred.note, Some(SINGLE_DATE_NOTE));
    }

    #[test]
    fn regular_history() {
        let pred = predict_from_strings(&REGULAR, DEFAULT_LOOKBACK).unwrap();
        assert_eq!(pred.mean_cycle, 28.5);
        assert!((pred.std_dev - 0.5773502691896257).abs() < 1e-12);
        // floor(28.5) = 28
        assert_eq!(pred.predicted_date, date("2025-11-20"));
        assert_eq!(pred.ci_lower, date("2025-11-20"));
        assert_eq!(pred.ci_upper, date("2025-11-20"));
        // Ovulation: Nov 20 - 14 = Nov 6
        assert_eq!(pred.fertile_window_start, date("2025-11-02"));
        assert_eq!(pred.fertile_window_end, date("2025-11-10"));
        assert_eq!(pred.note, None);
    }

    #[test]
    fn irregular_history_widens_interval_and_warns() {
        // Cycle lengths 20, 35, 21, 38: mean 28.5, sample std dev sqrt(87)
        let pred = predict_from_strings(
            &[
                "2025-01-01",
                "2025-01-21",
                "2025-02-25",
                "2025-03-18",
                "2025-04-25",
            ],
            DEFAULT_LOOKBACK,
        )
        .unwrap();
        assert!((pred.std_dev - 87f64.sqrt()).abs() < 1e-12);
        assert_eq!(pred.predicted_date, date("2025-05-23"));
        assert_eq!(pred.ci_lower, date("2025-05-14"));
        assert_eq!(pred.ci_upper, date("2025-06-01"));
        assert_eq!(pred.note, Some(IRREGULAR_NOTE));
    }

    #[test]
    fn two_dates_have_zero_spread() {
        let pred = predict_from_strings(&["2026-01-01", "2026-01-29"], DEFAULT_LOOKBACK).unwrap();
        assert_eq!(pred.mean_cycle, 28.0);
        assert_eq!(pred.std_dev, 0.0);
        assert_eq!(pred.predicted_date, date("2026-02-26"));
        assert_eq!(pred.note, None);
    }

    #[test]
    fn order_does_not_matter() {
        let unsorted =
            predict_from_strings(&["2025-08-27", "2025-07-01", "2025-07-29"], 6).unwrap();
        let sorted = predict_from_strings(&["2025-07-01", "2025-07-29", "2025-08-27"], 6).unwrap();
        assert_eq!(unsorted, sorted);
    }

    #[test]
    fn lookback_keeps_most_recent_cycles() {
        // Cycle lengths 40, 28, 28
        let history = ["2025-01-01", "2025-02-10", "2025-03-10", "2025-04-07"];
        let pred = predict_from_strings(&history, 2).unwrap();
        assert_eq!(pred.mean_cycle, 28.0);
        assert_eq!(pred.std_dev, 0.0);
        assert_eq!(pred.predicted_date, date("2025-05-05"));

        let all = predict_from_strings(&history, 3).unwrap();
        assert!((all.mean_cycle - 32.0).abs() < 1e-12);
    }

    #[test]
    fn oversized_lookback_uses_everything() {
        let wide = predict_from_strings(&REGULAR, 50).unwrap();
        let exact = predict_from_strings(&REGULAR, 4).unwrap();
        assert_eq!(wide, exact);
    }

    #[test]
    fn duplicates_count_as_zero_length_cycles() {
        let pred = predict_from_strings(&["2025-07-01", "2025-07-01"], 6).unwrap();
        assert_eq!(pred.mean_cycle, 0.0);
        assert_eq!(pred.predicted_date, date("2025-07-01"));
    }

    #[test]
    fn empty_history_is_rejected() {
        let empty: [&str; 0] = [];
        assert_eq!(
            predict_from_strings(&empty, 6),
            Err(PredictionError::Validation(ValidationError::EmptyHistory))
        );
        assert_eq!(
            predict(&[], 6),
            Err(PredictionError::Validation(ValidationError::EmptyHistory))
        );
    }

    #[test]
    fn malformed_dates_reject_the_whole_history() {
        for bad in [
            "2025-13-45",
            "invalid-date",
            "2025-02-30",
            "01/02/2025",
            "",
            "+2025-01-01",
            "-0001-01-01",
            "99-01-01",
            "20250-01-01",
        ] {
            let err = predict_from_strings(&["2025-07-01", bad], 6).unwrap_err();
            assert!(
                matches!(
                    err,
                    PredictionError::Validation(ValidationError::InvalidDate { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let dates = parse_history(&[" 2025-07-01 ", "2025-07-29\n"]).unwrap();
        assert_eq!(dates, vec![date("2025-07-01"), date("2025-07-29")]);
    }

    #[test]
    fn zero_lookback_is_rejected() {
        assert_eq!(
            predict_from_strings(&REGULAR, 0),
            Err(PredictionError::Validation(ValidationError::InvalidLookback))
        );
    }

    #[test]
    fn out_of_range_dates_are_internal_errors() {
        let err = predict(&[NaiveDate::MAX], 6).unwrap_err();
        assert!(matches!(err, PredictionError::Internal(_)));
    }

    #[test]
    fn rounds_half_to_even() {
        assert_eq!(round_one_decimal(28.25), 28.2);
        assert_eq!(round_one_decimal(28.75), 28.8);
        assert_eq!(round_one_decimal(0.5773502691896257), 0.6);
        assert_eq!(round_one_decimal(28.0), 28.0);
        assert_eq!(round_one_decimal(-0.25), -0.2);
    }

    #[test]
    fn rounds_the_stored_value_not_the_scaled_one() {
        // 28.15 is stored as 28.1499999...
        assert_eq!(round_one_decimal(28.15), 28.1);
        assert_eq!(round_one_decimal(0.05), 0.1);
    }

    #[test]
    fn long_history_mean_rounds_down() {
        // Twenty cycles: 17 of 28 days, then 3 of 29 days. Mean 28.15.
        let mut history = vec![date("2025-01-01")];
        for len in std::iter::repeat(28).take(17).chain(std::iter::repeat(29).take(3)) {
            let last = history[history.len() - 1];
            history.push(last + Duration::days(len));
        }
        assert_eq!(history.len(), 21);

        let pred = predict(&history, 20).unwrap();
        assert!((pred.mean_cycle - 28.15).abs() < 1e-12);
        assert_eq!(round_one_decimal(pred.mean_cycle), 28.1);
        assert_eq!(pred.predicted_date, history[20] + Duration::days(28));
    }

    #[test]
    fn std_dev_of_exactly_six_is_not_irregular() {
        // Cycle lengths 22, 28, 34
        let history = ["2025-01-01", "2025-01-23", "2025-02-20", "2025-03-26"];
        let pred = predict_from_strings(&history, 6).unwrap();
        assert_eq!(pred.std_dev, IRREGULARITY_THRESHOLD_DAYS);
        assert_eq!(pred.note, None);
        assert_eq!(pred.predicted_date, date("2025-04-23"));
        assert_eq!(pred.ci_lower, date("2025-04-17"));
        assert_eq!(pred.ci_upper, date("2025-04-29"));
    }
}
