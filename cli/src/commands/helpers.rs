use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use serde::Serialize;

use taper_core::timeline::{Bounds, TimelinePoint};

pub(crate) const LBS_PER_KG: f64 = 2.20462;
pub(crate) const KG_PER_LB: f64 = 0.453_592;
pub(crate) const CM_PER_IN: f64 = 2.54;

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "yesterday" => Ok(Local::now().date_naive() - chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .with_context(|| format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday")),
        },
    }
}

/// Parse a weight with an optional unit suffix: "81.5", "81.5kg", "180lbs",
/// "180 lb". Returns kilograms.
pub(crate) fn parse_weight_kg(s: &str) -> Result<f64> {
    let (value, unit) = split_value_unit(s)?;
    let kg = match unit.as_deref() {
        None | Some("kg") => value,
        Some("lbs" | "lb") => {
            let kg = value * KG_PER_LB;
            eprintln!("Converting {value:.1} lbs → {kg:.2} kg");
            kg
        }
        Some(other) => bail!("Unknown weight unit '{other}'. Use 'kg' or 'lbs'"),
    };
    if kg <= 0.0 {
        bail!("Weight must be greater than 0");
    }
    Ok(kg)
}

/// Parse a waist size with an optional unit suffix: "92", "92cm", "36in",
/// "36 in". Returns centimeters.
pub(crate) fn parse_waist_cm(s: &str) -> Result<f64> {
    let (value, unit) = split_value_unit(s)?;
    let cm = match unit.as_deref() {
        None | Some("cm") => value,
        Some("in") => {
            let cm = value * CM_PER_IN;
            eprintln!("Converting {value:.1} in → {cm:.1} cm");
            cm
        }
        Some(other) => bail!("Unknown waist unit '{other}'. Use 'cm' or 'in'"),
    };
    if cm <= 0.0 {
        bail!("Waist must be greater than 0");
    }
    Ok(cm)
}

/// Split "81.5kg" or "81.5 kg" into value and lowercased unit.
fn split_value_unit(s: &str) -> Result<(f64, Option<String>)> {
    let s = s.trim();
    if let Ok(v) = s.parse::<f64>() {
        return Ok((v, None));
    }
    let idx = s
        .find(|c: char| c.is_alphabetic())
        .with_context(|| format!("Invalid value: '{s}'"))?;
    if idx == 0 {
        bail!("Invalid value: '{s}'");
    }
    let (num_part, unit_part) = s.split_at(idx);
    let value: f64 = num_part
        .trim()
        .parse()
        .with_context(|| format!("Invalid value: '{s}'"))?;
    Ok((value, Some(unit_part.trim().to_lowercase())))
}

/// "+1.5", "-0.3", or "0.0" without a stray sign.
pub(crate) fn format_signed(value: f64) -> String {
    let value = no_neg_zero(value);
    if value > 0.0 {
        format!("+{value:.1}")
    } else {
        format!("{value:.1}")
    }
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

const SPARK_LEVELS: &[char] = &['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render a reconciled series as a sparkline. Days without a measurement
/// come out as spaces, so gaps stay visible instead of being interpolated.
pub(crate) fn sparkline(series: &[TimelinePoint], bounds: Bounds) -> String {
    let span = bounds.max - bounds.min;
    series
        .iter()
        .map(|point| match point.value {
            None => ' ',
            Some(v) => {
                let norm = if span > 0.0 {
                    ((v - bounds.min) / span).clamp(0.0, 1.0)
                } else {
                    0.5
                };
                #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
                let idx = ((norm * (SPARK_LEVELS.len() - 1) as f64).round()) as usize;
                SPARK_LEVELS[idx.min(SPARK_LEVELS.len() - 1)]
            }
        })
        .collect()
}

/// Text progress gauge for a weekly goal, e.g. `[████░░░░░░] 2/5`.
pub(crate) fn progress_gauge(completed: i64, frequency: i64, width: usize) -> String {
    let ratio = if frequency > 0 {
        #[allow(clippy::cast_precision_loss)]
        let r = completed as f64 / frequency as f64;
        r.clamp(0.0, 1.0)
    } else {
        0.0
    };
    #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
    let filled = (ratio * width as f64).round() as usize;
    let filled = filled.min(width);
    format!(
        "[{}{}] {completed}/{frequency}",
        "█".repeat(filled),
        "░".repeat(width - filled)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(date: &str, value: Option<f64>) -> TimelinePoint {
        TimelinePoint {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            value,
        }
    }

    #[test]
    fn test_parse_date_none_is_today() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(None).unwrap(), today);
    }

    #[test]
    fn test_parse_date_keywords() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(Some("today".to_string())).unwrap(), today);
        assert_eq!(
            parse_date(Some("yesterday".to_string())).unwrap(),
            today - chrono::Duration::days(1)
        );
    }

    #[test]
    fn test_parse_date_iso() {
        let date = parse_date(Some("2024-01-15".to_string())).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date(Some("nope".to_string())).is_err());
    }

    #[test]
    fn test_parse_weight_plain_and_kg() {
        assert!((parse_weight_kg("81.5").unwrap() - 81.5).abs() < f64::EPSILON);
        assert!((parse_weight_kg("81.5kg").unwrap() - 81.5).abs() < f64::EPSILON);
        assert!((parse_weight_kg("81.5 kg").unwrap() - 81.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_weight_lbs() {
        let kg = parse_weight_kg("180lbs").unwrap();
        assert!((kg - 81.646_56).abs() < 0.001);
    }

    #[test]
    fn test_parse_weight_invalid() {
        assert!(parse_weight_kg("abc").is_err());
        assert!(parse_weight_kg("81.5 stone").is_err());
        assert!(parse_weight_kg("0").is_err());
        assert!(parse_weight_kg("-5").is_err());
    }

    #[test]
    fn test_parse_waist() {
        assert!((parse_waist_cm("92").unwrap() - 92.0).abs() < f64::EPSILON);
        assert!((parse_waist_cm("92cm").unwrap() - 92.0).abs() < f64::EPSILON);
        assert!((parse_waist_cm("36in").unwrap() - 91.44).abs() < 0.001);
        assert!(parse_waist_cm("36 furlongs").is_err());
        assert!(parse_waist_cm("0").is_err());
    }

    #[test]
    fn test_format_signed() {
        assert_eq!(format_signed(1.5), "+1.5");
        assert_eq!(format_signed(-0.3), "-0.3");
        assert_eq!(format_signed(0.0), "0.0");
        assert_eq!(format_signed(-0.0), "0.0");
    }

    #[test]
    fn test_sparkline_gaps_are_spaces() {
        let series = [
            point("2024-01-01", Some(80.0)),
            point("2024-01-02", None),
            point("2024-01-03", Some(79.0)),
        ];
        let line = sparkline(&series, Bounds {
            min: 77.0,
            max: 82.0,
        });
        assert_eq!(line.chars().count(), 3);
        assert_eq!(line.chars().nth(1), Some(' '));
        assert_ne!(line.chars().next(), Some(' '));
    }

    #[test]
    fn test_sparkline_levels_follow_values() {
        let series = [
            point("2024-01-01", Some(77.0)),
            point("2024-01-02", Some(82.0)),
        ];
        let line = sparkline(&series, Bounds {
            min: 77.0,
            max: 82.0,
        });
        let chars: Vec<char> = line.chars().collect();
        assert_eq!(chars[0], '▁');
        assert_eq!(chars[1], '█');
    }

    #[test]
    fn test_progress_gauge() {
        assert_eq!(progress_gauge(0, 3, 6), "[░░░░░░] 0/3");
        assert_eq!(progress_gauge(3, 3, 6), "[██████] 3/3");
        assert_eq!(progress_gauge(1, 2, 6), "[███░░░] 1/2");
    }

    #[test]
    fn test_no_neg_zero() {
        assert_eq!(no_neg_zero(-0.0).to_bits(), 0.0_f64.to_bits());
        assert_eq!(no_neg_zero(5.0), 5.0);
        assert_eq!(no_neg_zero(-3.0), -3.0);
    }
}
