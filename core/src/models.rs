use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    pub id: i64,
    #[serde(default)]
    pub uuid: String,
    pub date: NaiveDate,
    pub weight_kg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waist_cm: Option<f64>,
    /// BMI precomputed at log time, when the height setting was known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewMeasurement {
    pub date: NaiveDate,
    pub weight_kg: f64,
    pub waist_cm: Option<f64>,
    pub bmi: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateMeasurement {
    pub date: Option<NaiveDate>,
    pub weight_kg: Option<f64>,
    pub waist_cm: Option<Option<f64>>,
    pub bmi: Option<Option<f64>>,
    pub notes: Option<Option<String>>,
}

/// Per-user tracking settings. Every field is optional; saving merges the
/// provided fields over what is already stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
}

impl Settings {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start_weight_kg.is_none()
            && self.goal_weight_kg.is_none()
            && self.start_date.is_none()
            && self.goal_date.is_none()
            && self.height_cm.is_none()
    }
}

/// A recurring weekly activity goal. `completed` stays in `[0, frequency]`
/// and resets to 0 when a new ISO week begins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    #[serde(default)]
    pub uuid: String,
    pub activity: String,
    pub frequency: i64,
    pub completed: i64,
    pub week_start: NaiveDate,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct NewGoal {
    pub activity: String,
    pub frequency: i64,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateGoal {
    pub activity: Option<String>,
    pub frequency: Option<i64>,
}

// --- Derived metrics ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Underweight => "Underweight",
            Self::Normal => "Normal",
            Self::Overweight => "Overweight",
            Self::Obese => "Obese",
        }
    }
}

/// BMI = weight(kg) / height(m)². `None` when height is absent or nonsense.
#[must_use]
pub fn bmi(weight_kg: f64, height_cm: Option<f64>) -> Option<f64> {
    let height_cm = height_cm?;
    if weight_kg <= 0.0 || height_cm <= 0.0 {
        return None;
    }
    let height_m = height_cm / 100.0;
    Some(weight_kg / (height_m * height_m))
}

#[must_use]
pub fn bmi_category(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// BMI history condensed to start / previous / current, over the measurements
/// that carry a stored BMI.
#[derive(Debug, Clone, Serialize)]
pub struct BmiPanel {
    pub start: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<f64>,
    pub current: f64,
    pub delta_start: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_previous: Option<f64>,
    pub category: BmiCategory,
}

/// Snapshot for the overview screen: latest measurement, deltas against the
/// previous one, and the BMI panel. Computed over the full history,
/// independent of any chart interval.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<Measurement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<Measurement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_delta_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waist_delta_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bmi: Option<BmiPanel>,
}

// --- Validation ---

pub fn validate_weight_kg(value: f64) -> Result<()> {
    if value <= 0.0 {
        bail!("Weight must be greater than 0");
    }
    Ok(())
}

pub fn validate_waist_cm(value: f64) -> Result<()> {
    if value <= 0.0 {
        bail!("Waist must be greater than 0");
    }
    Ok(())
}

pub fn validate_height_cm(value: f64) -> Result<()> {
    if value <= 0.0 {
        bail!("Height must be greater than 0");
    }
    Ok(())
}

pub fn validate_activity(activity: &str) -> Result<String> {
    let trimmed = activity.trim();
    if trimmed.is_empty() {
        bail!("Activity must not be empty");
    }
    Ok(trimmed.to_string())
}

pub fn validate_frequency(frequency: i64) -> Result<()> {
    if frequency < 1 {
        bail!("Frequency must be at least 1 per week");
    }
    Ok(())
}

// --- Export / Import ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportData {
    pub exported_at: String,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub measurements: Vec<ExportMeasurement>,
    #[serde(default)]
    pub goals: Vec<ExportGoal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMeasurement {
    pub uuid: String,
    pub date: String,
    pub weight_kg: f64,
    pub waist_cm: Option<f64>,
    pub bmi: Option<f64>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportGoal {
    pub uuid: String,
    pub activity: String,
    pub frequency: i64,
    pub completed: i64,
    pub week_start: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub measurements_added: usize,
    pub measurements_updated: usize,
    pub measurements_skipped: usize,
    pub goals_added: usize,
    pub goals_updated: usize,
    pub goals_skipped: usize,
}

/// Validate an imported measurement: weight > 0, valid date.
pub fn validate_export_measurement(entry: &ExportMeasurement) -> Result<()> {
    validate_weight_kg(entry.weight_kg)?;
    if let Some(waist) = entry.waist_cm {
        validate_waist_cm(waist)?;
    }
    NaiveDate::parse_from_str(&entry.date, "%Y-%m-%d").map_err(|_| {
        anyhow::anyhow!("Invalid measurement date '{}'. Must be YYYY-MM-DD", entry.date)
    })?;
    Ok(())
}

/// Validate an imported goal: non-empty activity, frequency >= 1, valid
/// week_start date. `completed` is clamped on import, not rejected.
pub fn validate_export_goal(goal: &ExportGoal) -> Result<()> {
    validate_activity(&goal.activity)?;
    validate_frequency(goal.frequency)?;
    NaiveDate::parse_from_str(&goal.week_start, "%Y-%m-%d").map_err(|_| {
        anyhow::anyhow!("Invalid week_start '{}'. Must be YYYY-MM-DD", goal.week_start)
    })?;
    Ok(())
}
