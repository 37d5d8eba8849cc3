use std::path::Path;

use anyhow::Result;
use chrono::{Local, NaiveDate};

use crate::db::Database;
use crate::models::{
    self, ExportData, Goal, ImportSummary, Measurement, NewGoal, NewMeasurement, Overview,
    Settings, UpdateGoal, UpdateMeasurement, validate_export_goal, validate_export_measurement,
};
use crate::timeline::{ChartView, Sample, Timeline};
use crate::week;

const START_WEIGHT_KEY: &str = "start_weight_kg";
const GOAL_WEIGHT_KEY: &str = "goal_weight_kg";
const START_DATE_KEY: &str = "start_date";
const GOAL_DATE_KEY: &str = "goal_date";
const HEIGHT_KEY: &str = "height_cm";

pub struct TaperService {
    db: Database,
}

impl TaperService {
    pub fn new(db_path: &Path) -> Result<Self> {
        let db = Database::open(db_path)?;
        Ok(Self { db })
    }

    pub fn new_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self { db })
    }

    // --- Measurements ---

    /// Log (or overwrite) the measurement for a date. BMI is precomputed
    /// here when the height setting is known.
    pub fn log_measurement(
        &self,
        date: NaiveDate,
        weight_kg: f64,
        waist_cm: Option<f64>,
        notes: Option<String>,
    ) -> Result<Measurement> {
        models::validate_weight_kg(weight_kg)?;
        if let Some(waist) = waist_cm {
            models::validate_waist_cm(waist)?;
        }
        let height_cm = self.get_settings()?.height_cm;
        self.db.upsert_measurement(&NewMeasurement {
            date,
            weight_kg,
            waist_cm,
            bmi: models::bmi(weight_kg, height_cm),
            notes,
        })
    }

    pub fn get_measurement(&self, date: NaiveDate) -> Result<Option<Measurement>> {
        self.db.get_measurement(date)
    }

    pub fn get_history(&self, days: Option<i64>) -> Result<Vec<Measurement>> {
        self.db.get_measurement_history(days)
    }

    pub fn update_measurement(
        &self,
        id: i64,
        mut update: UpdateMeasurement,
    ) -> Result<Measurement> {
        if let Some(weight) = update.weight_kg {
            models::validate_weight_kg(weight)?;
            // Weight changed, so the stored BMI is stale
            let height_cm = self.get_settings()?.height_cm;
            update.bmi = Some(models::bmi(weight, height_cm));
        }
        if let Some(Some(waist)) = update.waist_cm {
            models::validate_waist_cm(waist)?;
        }
        self.db.update_measurement(id, &update)
    }

    pub fn delete_measurement(&self, id: i64) -> Result<bool> {
        self.db.delete_measurement(id)
    }

    // --- Settings ---

    pub fn get_settings(&self) -> Result<Settings> {
        Ok(Settings {
            start_weight_kg: self.get_f64_setting(START_WEIGHT_KEY)?,
            goal_weight_kg: self.get_f64_setting(GOAL_WEIGHT_KEY)?,
            start_date: self.get_date_setting(START_DATE_KEY)?,
            goal_date: self.get_date_setting(GOAL_DATE_KEY)?,
            height_cm: self.get_f64_setting(HEIGHT_KEY)?,
        })
    }

    /// Merge-on-write: only the fields present in `update` are stored,
    /// everything else keeps its current value. Returns the merged result.
    pub fn save_settings(&self, update: &Settings) -> Result<Settings> {
        if let Some(w) = update.start_weight_kg {
            models::validate_weight_kg(w)?;
            self.db.set_setting(START_WEIGHT_KEY, &w.to_string())?;
        }
        if let Some(w) = update.goal_weight_kg {
            models::validate_weight_kg(w)?;
            self.db.set_setting(GOAL_WEIGHT_KEY, &w.to_string())?;
        }
        if let Some(d) = update.start_date {
            self.db
                .set_setting(START_DATE_KEY, &d.format("%Y-%m-%d").to_string())?;
        }
        if let Some(d) = update.goal_date {
            self.db
                .set_setting(GOAL_DATE_KEY, &d.format("%Y-%m-%d").to_string())?;
        }
        if let Some(h) = update.height_cm {
            models::validate_height_cm(h)?;
            self.db.set_setting(HEIGHT_KEY, &h.to_string())?;
        }
        self.get_settings()
    }

    fn get_f64_setting(&self, key: &str) -> Result<Option<f64>> {
        match self.db.get_setting(key)? {
            Some(v) => Ok(Some(v.parse::<f64>()?)),
            None => Ok(None),
        }
    }

    fn get_date_setting(&self, key: &str) -> Result<Option<NaiveDate>> {
        match self.db.get_setting(key)? {
            Some(v) => Ok(Some(NaiveDate::parse_from_str(&v, "%Y-%m-%d")?)),
            None => Ok(None),
        }
    }

    // --- Goals ---

    pub fn add_goal(&self, activity: &str, frequency: i64) -> Result<Goal> {
        let activity = models::validate_activity(activity)?;
        models::validate_frequency(frequency)?;
        let monday = week::week_start(Local::now().date_naive());
        self.db.insert_goal(&NewGoal { activity, frequency }, monday)
    }

    pub fn list_goals(&self) -> Result<Vec<Goal>> {
        self.list_goals_as_of(Local::now().date_naive())
    }

    /// Read the goal list, lazily rolling any stale goal over into the
    /// current week (counter reset to 0, `week_start` moved to this week's
    /// Monday). Resets are persisted before the list is returned, so a crash
    /// midway self-corrects on the next read.
    pub fn list_goals_as_of(&self, today: NaiveDate) -> Result<Vec<Goal>> {
        let monday = week::week_start(today);
        for goal in self.db.list_goals()? {
            if week::needs_reset(goal.week_start, today) {
                self.db.set_goal_progress(goal.id, 0, monday)?;
            }
        }
        self.db.list_goals()
    }

    pub fn adjust_goal(&self, id: i64, delta: i64) -> Result<Goal> {
        self.adjust_goal_as_of(id, delta, Local::now().date_naive())
    }

    /// Increment/decrement a goal's counter, clamped into `[0, frequency]`.
    /// The persisted value is the same clamped value handed back to the
    /// caller. A stale goal rolls over into the current week first.
    pub fn adjust_goal_as_of(&self, id: i64, delta: i64, today: NaiveDate) -> Result<Goal> {
        let goal = self.db.get_goal(id)?;
        let monday = week::week_start(today);
        let (base, week_start) = if week::needs_reset(goal.week_start, today) {
            (0, monday)
        } else {
            (goal.completed, goal.week_start)
        };
        let completed = week::adjust_completed(base, delta, goal.frequency);
        self.db.set_goal_progress(id, completed, week_start)
    }

    /// Edit activity and/or frequency. Lowering the frequency below the
    /// current counter clamps the counter immediately, keeping it inside
    /// `[0, frequency]`.
    pub fn edit_goal(&self, id: i64, update: &UpdateGoal) -> Result<Goal> {
        let update = UpdateGoal {
            activity: update
                .activity
                .as_deref()
                .map(models::validate_activity)
                .transpose()?,
            frequency: update.frequency,
        };
        if let Some(frequency) = update.frequency {
            models::validate_frequency(frequency)?;
        }
        let goal = self.db.update_goal(id, &update)?;
        if goal.completed > goal.frequency {
            return self
                .db
                .set_goal_progress(goal.id, goal.frequency, goal.week_start);
        }
        Ok(goal)
    }

    pub fn delete_goal(&self, id: i64) -> Result<bool> {
        self.db.delete_goal(id)
    }

    // --- Views ---

    /// Latest/previous measurement and deltas over the full, unfiltered
    /// history, independent of any chart interval.
    pub fn overview(&self) -> Result<Overview> {
        let all = self.db.list_measurements()?;
        let latest = all.last().cloned();
        let previous = if all.len() > 1 {
            all.get(all.len() - 2).cloned()
        } else {
            None
        };

        let weight_delta_kg = match (&latest, &previous) {
            (Some(l), Some(p)) => Some(l.weight_kg - p.weight_kg),
            _ => None,
        };
        let waist_delta_cm = match (&latest, &previous) {
            (Some(l), Some(p)) => match (l.waist_cm, p.waist_cm) {
                (Some(lw), Some(pw)) => Some(lw - pw),
                _ => None,
            },
            _ => None,
        };

        let bmi_series: Vec<f64> = all.iter().filter_map(|m| m.bmi).collect();
        let bmi = match (bmi_series.first(), bmi_series.last()) {
            (Some(&start), Some(&current)) => {
                let prev = if bmi_series.len() > 1 {
                    bmi_series.get(bmi_series.len() - 2).copied()
                } else {
                    None
                };
                Some(models::BmiPanel {
                    start,
                    previous: prev,
                    current,
                    delta_start: current - start,
                    delta_previous: prev.map(|p| current - p),
                    category: models::bmi_category(current),
                })
            }
            _ => None,
        };

        Ok(Overview {
            latest,
            previous,
            weight_delta_kg,
            waist_delta_cm,
            bmi,
        })
    }

    /// Weight series reconciled over `[start_date, goal_date]`, with the
    /// start-to-goal trajectory when all four settings are present. Missing
    /// interval dates degrade to an empty chart.
    pub fn weight_chart(&self) -> Result<ChartView> {
        let settings = self.get_settings()?;
        let (Some(start), Some(end)) = (settings.start_date, settings.goal_date) else {
            return Ok(ChartView::new(&Timeline::empty()));
        };

        let samples: Vec<Sample> = self
            .db
            .list_measurements()?
            .iter()
            .map(|m| Sample {
                date: m.date,
                value: m.weight_kg,
            })
            .collect();
        let timeline = Timeline::reconcile(&samples, start, end);

        match (settings.start_weight_kg, settings.goal_weight_kg) {
            (Some(start_weight), Some(goal_weight)) => Ok(ChartView::with_goal_line(&timeline, [
                Sample {
                    date: start,
                    value: start_weight,
                },
                Sample {
                    date: end,
                    value: goal_weight,
                },
            ])),
            _ => Ok(ChartView::new(&timeline)),
        }
    }

    /// Waist series reconciled over the same interval; days without a waist
    /// value stay gaps even when a weight was logged.
    pub fn waist_chart(&self) -> Result<ChartView> {
        let settings = self.get_settings()?;
        let (Some(start), Some(end)) = (settings.start_date, settings.goal_date) else {
            return Ok(ChartView::new(&Timeline::empty()));
        };

        let samples: Vec<Sample> = self
            .db
            .list_measurements()?
            .iter()
            .filter_map(|m| {
                m.waist_cm.map(|value| Sample {
                    date: m.date,
                    value,
                })
            })
            .collect();
        Ok(ChartView::new(&Timeline::reconcile(&samples, start, end)))
    }

    // --- Export / Import ---

    pub fn export_all(&self) -> Result<ExportData> {
        Ok(ExportData {
            exported_at: Local::now().to_rfc3339(),
            settings: self.get_settings()?,
            measurements: self.db.get_all_measurements_export()?,
            goals: self.db.get_all_goals_export()?,
        })
    }

    /// Merge an export document into this database. Newer `updated_at` wins
    /// per measurement date and per goal uuid; imported goal counters are
    /// clamped and their week markers normalized to a Monday.
    pub fn import_all(&self, data: &ExportData) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();

        for entry in &data.measurements {
            validate_export_measurement(entry)?;
            let date = NaiveDate::parse_from_str(&entry.date, "%Y-%m-%d")?;
            match self.db.get_measurement(date)? {
                None => {
                    self.db.put_measurement_import(entry)?;
                    summary.measurements_added += 1;
                }
                Some(existing) if existing.updated_at < entry.updated_at => {
                    self.db.put_measurement_import(entry)?;
                    summary.measurements_updated += 1;
                }
                Some(_) => summary.measurements_skipped += 1,
            }
        }

        for goal in &data.goals {
            validate_export_goal(goal)?;
            let mut doc = goal.clone();
            doc.completed = doc.completed.clamp(0, doc.frequency);
            let week = NaiveDate::parse_from_str(&doc.week_start, "%Y-%m-%d")?;
            doc.week_start = week::week_start(week).format("%Y-%m-%d").to_string();
            match self.db.get_goal_by_uuid(&doc.uuid)? {
                None => {
                    self.db.put_goal_import(&doc)?;
                    summary.goals_added += 1;
                }
                Some(existing) if existing.updated_at < doc.updated_at => {
                    self.db.put_goal_import(&doc)?;
                    summary.goals_updated += 1;
                }
                Some(_) => summary.goals_skipped += 1,
            }
        }

        if !data.settings.is_empty() {
            self.save_settings(&data.settings)?;
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExportGoal, ExportMeasurement};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn svc_with_interval() -> TaperService {
        let svc = TaperService::new_in_memory().unwrap();
        svc.save_settings(&Settings {
            start_date: Some(d("2024-01-01")),
            goal_date: Some(d("2024-01-03")),
            ..Settings::default()
        })
        .unwrap();
        svc
    }

    #[test]
    fn test_log_measurement_precomputes_bmi() {
        let svc = TaperService::new_in_memory().unwrap();
        svc.save_settings(&Settings {
            height_cm: Some(180.0),
            ..Settings::default()
        })
        .unwrap();

        let entry = svc
            .log_measurement(d("2024-01-15"), 80.0, Some(92.0), None)
            .unwrap();
        let bmi = entry.bmi.unwrap();
        assert!((bmi - 24.69).abs() < 0.01);
    }

    #[test]
    fn test_log_measurement_without_height_has_no_bmi() {
        let svc = TaperService::new_in_memory().unwrap();
        let entry = svc.log_measurement(d("2024-01-15"), 80.0, None, None).unwrap();
        assert!(entry.bmi.is_none());
    }

    #[test]
    fn test_log_measurement_rejects_bad_values() {
        let svc = TaperService::new_in_memory().unwrap();
        assert!(svc.log_measurement(d("2024-01-15"), 0.0, None, None).is_err());
        assert!(
            svc.log_measurement(d("2024-01-15"), 80.0, Some(-1.0), None)
                .is_err()
        );
    }

    #[test]
    fn test_update_measurement_recomputes_bmi() {
        let svc = TaperService::new_in_memory().unwrap();
        svc.save_settings(&Settings {
            height_cm: Some(180.0),
            ..Settings::default()
        })
        .unwrap();
        let entry = svc.log_measurement(d("2024-01-15"), 80.0, None, None).unwrap();

        let updated = svc
            .update_measurement(entry.id, UpdateMeasurement {
                weight_kg: Some(77.0),
                ..UpdateMeasurement::default()
            })
            .unwrap();
        assert!((updated.bmi.unwrap() - 23.77).abs() < 0.01);
    }

    #[test]
    fn test_settings_merge_on_write() {
        let svc = TaperService::new_in_memory().unwrap();
        svc.save_settings(&Settings {
            start_weight_kg: Some(85.0),
            height_cm: Some(180.0),
            ..Settings::default()
        })
        .unwrap();

        // Saving a different subset leaves the earlier keys alone
        let merged = svc
            .save_settings(&Settings {
                goal_weight_kg: Some(75.0),
                ..Settings::default()
            })
            .unwrap();

        assert_eq!(merged.start_weight_kg, Some(85.0));
        assert_eq!(merged.goal_weight_kg, Some(75.0));
        assert_eq!(merged.height_cm, Some(180.0));
        assert!(merged.start_date.is_none());
    }

    #[test]
    fn test_overview_deltas() {
        let svc = TaperService::new_in_memory().unwrap();
        svc.save_settings(&Settings {
            height_cm: Some(180.0),
            ..Settings::default()
        })
        .unwrap();
        svc.log_measurement(d("2024-01-10"), 83.0, Some(95.0), None)
            .unwrap();
        svc.log_measurement(d("2024-01-17"), 81.5, Some(93.5), None)
            .unwrap();

        let overview = svc.overview().unwrap();
        assert_eq!(overview.latest.as_ref().unwrap().date, d("2024-01-17"));
        assert!((overview.weight_delta_kg.unwrap() - -1.5).abs() < 0.001);
        assert!((overview.waist_delta_cm.unwrap() - -1.5).abs() < 0.001);

        let bmi = overview.bmi.unwrap();
        assert!(bmi.delta_start < 0.0);
        assert_eq!(bmi.previous, Some(bmi.start));
    }

    #[test]
    fn test_overview_empty_history() {
        let svc = TaperService::new_in_memory().unwrap();
        let overview = svc.overview().unwrap();
        assert!(overview.latest.is_none());
        assert!(overview.weight_delta_kg.is_none());
        assert!(overview.bmi.is_none());
    }

    #[test]
    fn test_overview_uses_full_history_not_chart_interval() {
        let svc = svc_with_interval();
        // Outside the chart interval, but still the latest measurement
        svc.log_measurement(d("2024-02-20"), 79.0, None, None).unwrap();

        let overview = svc.overview().unwrap();
        assert_eq!(overview.latest.unwrap().date, d("2024-02-20"));
    }

    #[test]
    fn test_weight_chart_matches_reconciler_contract() {
        let svc = svc_with_interval();
        svc.log_measurement(d("2024-01-01"), 80.0, None, None).unwrap();
        svc.log_measurement(d("2024-01-03"), 79.0, None, None).unwrap();

        let chart = svc.weight_chart().unwrap();
        assert_eq!(chart.series.len(), 3);
        assert_eq!(chart.series[0].value, Some(80.0));
        assert_eq!(chart.series[1].value, None);
        assert_eq!(chart.series[2].value, Some(79.0));
        assert_eq!(chart.ticks, vec![d("2024-01-01"), d("2024-01-03")]);
        let bounds = chart.bounds.unwrap();
        assert!((bounds.min - 77.0).abs() < f64::EPSILON);
        assert!((bounds.max - 82.0).abs() < f64::EPSILON);
        assert!(chart.goal_line.is_none());
    }

    #[test]
    fn test_weight_chart_goal_line() {
        let svc = svc_with_interval();
        svc.save_settings(&Settings {
            start_weight_kg: Some(85.0),
            goal_weight_kg: Some(75.0),
            ..Settings::default()
        })
        .unwrap();
        svc.log_measurement(d("2024-01-02"), 80.0, None, None).unwrap();

        let chart = svc.weight_chart().unwrap();
        let line = chart.goal_line.unwrap();
        assert_eq!(line[0].date, d("2024-01-01"));
        assert!((line[0].value - 85.0).abs() < f64::EPSILON);
        assert!((line[1].value - 75.0).abs() < f64::EPSILON);
        // Bounds widened to cover the trajectory
        let bounds = chart.bounds.unwrap();
        assert!((bounds.min - 73.0).abs() < f64::EPSILON);
        assert!((bounds.max - 87.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_charts_empty_without_interval_settings() {
        let svc = TaperService::new_in_memory().unwrap();
        svc.log_measurement(d("2024-01-02"), 80.0, Some(92.0), None)
            .unwrap();

        let weight = svc.weight_chart().unwrap();
        assert!(weight.series.is_empty());
        assert!(weight.bounds.is_none());
        let waist = svc.waist_chart().unwrap();
        assert!(waist.series.is_empty());
    }

    #[test]
    fn test_waist_chart_skips_weight_only_days() {
        let svc = svc_with_interval();
        svc.log_measurement(d("2024-01-01"), 80.0, Some(92.0), None)
            .unwrap();
        svc.log_measurement(d("2024-01-02"), 79.5, None, None).unwrap();

        let chart = svc.waist_chart().unwrap();
        assert_eq!(chart.series[0].value, Some(92.0));
        assert_eq!(chart.series[1].value, None);
        assert_eq!(chart.ticks, vec![d("2024-01-01")]);
    }

    #[test]
    fn test_goal_weekly_reset_on_read() {
        let svc = TaperService::new_in_memory().unwrap();
        let goal = svc.add_goal("Running", 3).unwrap();
        // Fill the counter, then pretend it was last touched a week ago
        svc.adjust_goal_as_of(goal.id, 3, goal.week_start).unwrap();

        let next_week = goal.week_start + chrono::Duration::days(9);
        let goals = svc.list_goals_as_of(next_week).unwrap();
        assert_eq!(goals[0].completed, 0);
        assert_eq!(goals[0].week_start, week::week_start(next_week));
    }

    #[test]
    fn test_goal_list_same_week_untouched() {
        let svc = TaperService::new_in_memory().unwrap();
        let goal = svc.add_goal("Running", 3).unwrap();
        svc.adjust_goal_as_of(goal.id, 2, goal.week_start).unwrap();

        let same_week = goal.week_start + chrono::Duration::days(3);
        let goals = svc.list_goals_as_of(same_week).unwrap();
        assert_eq!(goals[0].completed, 2);
        assert_eq!(goals[0].week_start, goal.week_start);
    }

    #[test]
    fn test_adjust_goal_clamps_at_bounds() {
        let svc = TaperService::new_in_memory().unwrap();
        let goal = svc.add_goal("Running", 3).unwrap();
        let today = goal.week_start;

        // Decrement at 0 stays 0
        let g = svc.adjust_goal_as_of(goal.id, -1, today).unwrap();
        assert_eq!(g.completed, 0);

        for _ in 0..5 {
            svc.adjust_goal_as_of(goal.id, 1, today).unwrap();
        }
        let g = svc.adjust_goal_as_of(goal.id, 1, today).unwrap();
        assert_eq!(g.completed, 3);
    }

    #[test]
    fn test_adjust_stale_goal_rolls_over_first() {
        let svc = TaperService::new_in_memory().unwrap();
        let goal = svc.add_goal("Running", 3).unwrap();
        svc.adjust_goal_as_of(goal.id, 3, goal.week_start).unwrap();

        let next_week = goal.week_start + chrono::Duration::days(7);
        let g = svc.adjust_goal_as_of(goal.id, 1, next_week).unwrap();
        assert_eq!(g.completed, 1);
        assert_eq!(g.week_start, next_week);
    }

    #[test]
    fn test_edit_goal_clamps_counter_when_frequency_drops() {
        let svc = TaperService::new_in_memory().unwrap();
        let goal = svc.add_goal("Running", 5).unwrap();
        svc.adjust_goal_as_of(goal.id, 4, goal.week_start).unwrap();

        let edited = svc
            .edit_goal(goal.id, &UpdateGoal {
                activity: None,
                frequency: Some(2),
            })
            .unwrap();
        assert_eq!(edited.frequency, 2);
        assert_eq!(edited.completed, 2);
    }

    #[test]
    fn test_edit_goal_validation() {
        let svc = TaperService::new_in_memory().unwrap();
        let goal = svc.add_goal("Running", 3).unwrap();
        assert!(
            svc.edit_goal(goal.id, &UpdateGoal {
                activity: Some("  ".to_string()),
                frequency: None,
            })
            .is_err()
        );
        assert!(
            svc.edit_goal(goal.id, &UpdateGoal {
                activity: None,
                frequency: Some(0),
            })
            .is_err()
        );
    }

    #[test]
    fn test_export_import_roundtrip() {
        let svc = TaperService::new_in_memory().unwrap();
        svc.save_settings(&Settings {
            start_weight_kg: Some(85.0),
            height_cm: Some(180.0),
            ..Settings::default()
        })
        .unwrap();
        svc.log_measurement(d("2024-01-10"), 83.0, Some(95.0), None)
            .unwrap();
        svc.add_goal("Running", 3).unwrap();

        let exported = svc.export_all().unwrap();

        let other = TaperService::new_in_memory().unwrap();
        let summary = other.import_all(&exported).unwrap();
        assert_eq!(summary.measurements_added, 1);
        assert_eq!(summary.goals_added, 1);

        assert_eq!(other.get_settings().unwrap().start_weight_kg, Some(85.0));
        assert_eq!(other.get_history(None).unwrap().len(), 1);
        assert_eq!(other.db.list_goals().unwrap().len(), 1);

        // Importing the same document again changes nothing
        let summary = other.import_all(&exported).unwrap();
        assert_eq!(summary.measurements_skipped, 1);
        assert_eq!(summary.goals_skipped, 1);
    }

    #[test]
    fn test_import_goal_clamps_counter_and_normalizes_week() {
        let svc = TaperService::new_in_memory().unwrap();

        let incoming = ExportData {
            exported_at: String::new(),
            settings: Settings::default(),
            measurements: vec![],
            goals: vec![ExportGoal {
                uuid: "remote-goal".to_string(),
                activity: "Running".to_string(),
                frequency: 3,
                // Counter above frequency, week marker on a Wednesday
                completed: 5,
                week_start: "2024-06-12".to_string(),
                created_at: "2024-06-12T08:00:00+00:00".to_string(),
                updated_at: "2024-06-12T08:00:00+00:00".to_string(),
            }],
        };

        let summary = svc.import_all(&incoming).unwrap();
        assert_eq!(summary.goals_added, 1);

        let goal = svc.db.get_goal_by_uuid("remote-goal").unwrap().unwrap();
        assert_eq!(goal.completed, 3);
        assert_eq!(goal.week_start, d("2024-06-10"));
    }

    #[test]
    fn test_import_newer_measurement_wins() {
        let svc = TaperService::new_in_memory().unwrap();
        svc.log_measurement(d("2024-01-10"), 83.0, None, None).unwrap();

        let incoming = ExportData {
            exported_at: String::new(),
            settings: Settings::default(),
            measurements: vec![ExportMeasurement {
                uuid: "remote".to_string(),
                date: "2024-01-10".to_string(),
                weight_kg: 82.0,
                waist_cm: None,
                bmi: None,
                notes: None,
                created_at: "2024-01-10T08:00:00+00:00".to_string(),
                // Far in the future relative to the local row
                updated_at: "2999-01-01T00:00:00+00:00".to_string(),
            }],
            goals: vec![],
        };

        let summary = svc.import_all(&incoming).unwrap();
        assert_eq!(summary.measurements_updated, 1);
        let entry = svc.get_measurement(d("2024-01-10")).unwrap().unwrap();
        assert!((entry.weight_kg - 82.0).abs() < f64::EPSILON);
    }
}
