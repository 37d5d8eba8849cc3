use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, params};
use uuid::Uuid;

use crate::models::{
    ExportGoal, ExportMeasurement, Goal, Measurement, NewGoal, NewMeasurement, UpdateGoal,
    UpdateMeasurement,
};

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS measurements (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    uuid TEXT NOT NULL UNIQUE,
                    date TEXT NOT NULL UNIQUE,
                    weight_kg REAL NOT NULL,
                    waist_cm REAL,
                    bmi REAL,
                    notes TEXT,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS goals (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    uuid TEXT NOT NULL UNIQUE,
                    activity TEXT NOT NULL,
                    frequency INTEGER NOT NULL,
                    completed INTEGER NOT NULL DEFAULT 0,
                    week_start TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS user_settings (
                    key TEXT PRIMARY KEY NOT NULL,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_measurements_date ON measurements(date);
                CREATE INDEX IF NOT EXISTS idx_goals_week_start ON goals(week_start);

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    // --- Row mapping helpers ---

    fn parse_date_column(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .unwrap_or_else(|_| NaiveDate::from_ymd_opt(2000, 1, 1).expect("valid date"))
    }

    fn measurement_from_row(row: &rusqlite::Row) -> rusqlite::Result<Measurement> {
        let date_str: String = row.get(2)?;
        Ok(Measurement {
            id: row.get(0)?,
            uuid: row.get(1)?,
            date: Self::parse_date_column(&date_str),
            weight_kg: row.get(3)?,
            waist_cm: row.get(4)?,
            bmi: row.get(5)?,
            notes: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn goal_from_row(row: &rusqlite::Row) -> rusqlite::Result<Goal> {
        let week_start_str: String = row.get(5)?;
        Ok(Goal {
            id: row.get(0)?,
            uuid: row.get(1)?,
            activity: row.get(2)?,
            frequency: row.get(3)?,
            completed: row.get(4)?,
            week_start: Self::parse_date_column(&week_start_str),
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }

    const MEASUREMENT_COLUMNS: &'static str =
        "id, uuid, date, weight_kg, waist_cm, bmi, notes, created_at, updated_at";
    const GOAL_COLUMNS: &'static str =
        "id, uuid, activity, frequency, completed, week_start, created_at, updated_at";

    // --- Measurements ---

    /// One measurement per calendar day: logging twice for the same date
    /// overwrites the earlier entry.
    pub fn upsert_measurement(&self, entry: &NewMeasurement) -> Result<Measurement> {
        let now = Local::now().to_rfc3339();
        let uuid = Uuid::new_v4().to_string();
        let date_str = entry.date.format("%Y-%m-%d").to_string();
        self.conn.execute(
            "INSERT INTO measurements (uuid, date, weight_kg, waist_cm, bmi, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(date) DO UPDATE SET
                weight_kg = excluded.weight_kg,
                waist_cm = excluded.waist_cm,
                bmi = excluded.bmi,
                notes = excluded.notes,
                updated_at = excluded.updated_at",
            params![
                uuid,
                date_str,
                entry.weight_kg,
                entry.waist_cm,
                entry.bmi,
                entry.notes,
                now,
                now
            ],
        )?;
        self.get_measurement(entry.date)?
            .context("Measurement not found after upsert")
    }

    pub fn get_measurement(&self, date: NaiveDate) -> Result<Option<Measurement>> {
        let date_str = date.format("%Y-%m-%d").to_string();
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM measurements WHERE date = ?1",
            Self::MEASUREMENT_COLUMNS
        ))?;
        let mut rows = stmt.query(params![date_str])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::measurement_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn get_measurement_by_id(&self, id: i64) -> Result<Measurement> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM measurements WHERE id = ?1",
                    Self::MEASUREMENT_COLUMNS
                ),
                params![id],
                Self::measurement_from_row,
            )
            .with_context(|| format!("Measurement {id} not found"))
    }

    /// Full history, oldest first. Chart and overview computations work over
    /// this unfiltered list.
    pub fn list_measurements(&self) -> Result<Vec<Measurement>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM measurements ORDER BY date",
            Self::MEASUREMENT_COLUMNS
        ))?;
        let entries = stmt
            .query_map([], Self::measurement_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Newest first, optionally limited to the last `days` entries.
    pub fn get_measurement_history(&self, days: Option<i64>) -> Result<Vec<Measurement>> {
        let query = match days {
            Some(n) => format!(
                "SELECT {} FROM measurements ORDER BY date DESC LIMIT {n}",
                Self::MEASUREMENT_COLUMNS
            ),
            None => format!(
                "SELECT {} FROM measurements ORDER BY date DESC",
                Self::MEASUREMENT_COLUMNS
            ),
        };
        let mut stmt = self.conn.prepare(&query)?;
        let entries = stmt
            .query_map([], Self::measurement_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn update_measurement(&self, id: i64, update: &UpdateMeasurement) -> Result<Measurement> {
        let current = self.get_measurement_by_id(id)?;
        let now = Local::now().to_rfc3339();

        let date = update.date.unwrap_or(current.date);
        let weight_kg = update.weight_kg.unwrap_or(current.weight_kg);
        let waist_cm = update.waist_cm.unwrap_or(current.waist_cm);
        let bmi = update.bmi.unwrap_or(current.bmi);
        let notes = update.notes.clone().unwrap_or(current.notes);

        let date_str = date.format("%Y-%m-%d").to_string();
        self.conn
            .execute(
                "UPDATE measurements
                 SET date = ?1, weight_kg = ?2, waist_cm = ?3, bmi = ?4, notes = ?5, updated_at = ?6
                 WHERE id = ?7",
                params![date_str, weight_kg, waist_cm, bmi, notes, now, id],
            )
            .with_context(|| format!("Failed to update measurement {id}"))?;
        self.get_measurement_by_id(id)
    }

    pub fn delete_measurement(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM measurements WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // --- Goals ---

    pub fn insert_goal(&self, goal: &NewGoal, week_start: NaiveDate) -> Result<Goal> {
        let now = Local::now().to_rfc3339();
        let uuid = Uuid::new_v4().to_string();
        let week_start_str = week_start.format("%Y-%m-%d").to_string();
        self.conn.execute(
            "INSERT INTO goals (uuid, activity, frequency, completed, week_start, created_at, updated_at)
             VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6)",
            params![uuid, goal.activity, goal.frequency, week_start_str, now, now],
        )?;
        let id = self.conn.last_insert_rowid();
        self.get_goal(id)
    }

    pub fn get_goal(&self, id: i64) -> Result<Goal> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM goals WHERE id = ?1", Self::GOAL_COLUMNS),
                params![id],
                Self::goal_from_row,
            )
            .with_context(|| format!("Goal {id} not found"))
    }

    pub fn get_goal_by_uuid(&self, uuid: &str) -> Result<Option<Goal>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM goals WHERE uuid = ?1", Self::GOAL_COLUMNS))?;
        let mut rows = stmt.query(params![uuid])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Self::goal_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn list_goals(&self) -> Result<Vec<Goal>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM goals ORDER BY id",
            Self::GOAL_COLUMNS
        ))?;
        let goals = stmt
            .query_map([], Self::goal_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(goals)
    }

    pub fn update_goal(&self, id: i64, update: &UpdateGoal) -> Result<Goal> {
        let current = self.get_goal(id)?;
        let now = Local::now().to_rfc3339();

        let activity = update.activity.clone().unwrap_or(current.activity);
        let frequency = update.frequency.unwrap_or(current.frequency);

        self.conn.execute(
            "UPDATE goals SET activity = ?1, frequency = ?2, updated_at = ?3 WHERE id = ?4",
            params![activity, frequency, now, id],
        )?;
        self.get_goal(id)
    }

    /// Write a goal's counter and week marker together. Used both for
    /// increment/decrement and for the weekly reset.
    pub fn set_goal_progress(&self, id: i64, completed: i64, week_start: NaiveDate) -> Result<Goal> {
        let now = Local::now().to_rfc3339();
        let week_start_str = week_start.format("%Y-%m-%d").to_string();
        let rows = self.conn.execute(
            "UPDATE goals SET completed = ?1, week_start = ?2, updated_at = ?3 WHERE id = ?4",
            params![completed, week_start_str, now, id],
        )?;
        if rows == 0 {
            anyhow::bail!("Goal {id} not found");
        }
        self.get_goal(id)
    }

    pub fn delete_goal(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM goals WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // --- User settings (key/value) ---

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO user_settings (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM user_settings WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    pub fn delete_setting(&self, key: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM user_settings WHERE key = ?1", params![key])?;
        Ok(rows > 0)
    }

    // --- Export ---

    pub fn get_all_measurements_export(&self) -> Result<Vec<ExportMeasurement>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, date, weight_kg, waist_cm, bmi, notes, created_at, updated_at
             FROM measurements ORDER BY date",
        )?;
        let entries = stmt
            .query_map([], |row| {
                Ok(ExportMeasurement {
                    uuid: row.get(0)?,
                    date: row.get(1)?,
                    weight_kg: row.get(2)?,
                    waist_cm: row.get(3)?,
                    bmi: row.get(4)?,
                    notes: row.get(5)?,
                    created_at: row.get(6)?,
                    updated_at: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn get_all_goals_export(&self) -> Result<Vec<ExportGoal>> {
        let mut stmt = self.conn.prepare(
            "SELECT uuid, activity, frequency, completed, week_start, created_at, updated_at
             FROM goals ORDER BY id",
        )?;
        let goals = stmt
            .query_map([], |row| {
                Ok(ExportGoal {
                    uuid: row.get(0)?,
                    activity: row.get(1)?,
                    frequency: row.get(2)?,
                    completed: row.get(3)?,
                    week_start: row.get(4)?,
                    created_at: row.get(5)?,
                    updated_at: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(goals)
    }

    /// Insert or overwrite a measurement from an import document, keeping
    /// its uuid and timestamps.
    pub fn put_measurement_import(&self, entry: &ExportMeasurement) -> Result<()> {
        self.conn.execute(
            "INSERT INTO measurements (uuid, date, weight_kg, waist_cm, bmi, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(date) DO UPDATE SET
                uuid = excluded.uuid,
                weight_kg = excluded.weight_kg,
                waist_cm = excluded.waist_cm,
                bmi = excluded.bmi,
                notes = excluded.notes,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at",
            params![
                entry.uuid,
                entry.date,
                entry.weight_kg,
                entry.waist_cm,
                entry.bmi,
                entry.notes,
                entry.created_at,
                entry.updated_at
            ],
        )?;
        Ok(())
    }

    /// Insert or overwrite a goal from an import document by uuid.
    pub fn put_goal_import(&self, goal: &ExportGoal) -> Result<()> {
        self.conn.execute(
            "INSERT INTO goals (uuid, activity, frequency, completed, week_start, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(uuid) DO UPDATE SET
                activity = excluded.activity,
                frequency = excluded.frequency,
                completed = excluded.completed,
                week_start = excluded.week_start,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at",
            params![
                goal.uuid,
                goal.activity,
                goal.frequency,
                goal.completed,
                goal.week_start,
                goal.created_at,
                goal.updated_at
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewGoal, NewMeasurement, UpdateGoal, UpdateMeasurement};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample_measurement(date: &str, weight: f64) -> NewMeasurement {
        NewMeasurement {
            date: d(date),
            weight_kg: weight,
            waist_cm: Some(92.0),
            bmi: None,
            notes: None,
        }
    }

    #[test]
    fn test_upsert_and_get_measurement() {
        let db = Database::open_in_memory().unwrap();
        let entry = db
            .upsert_measurement(&sample_measurement("2024-01-15", 82.5))
            .unwrap();

        assert_eq!(entry.date, d("2024-01-15"));
        assert!((entry.weight_kg - 82.5).abs() < f64::EPSILON);
        assert_eq!(entry.waist_cm, Some(92.0));
        assert!(entry.bmi.is_none());
        assert!(!entry.uuid.is_empty());

        let fetched = db.get_measurement(d("2024-01-15")).unwrap().unwrap();
        assert_eq!(fetched.id, entry.id);
    }

    #[test]
    fn test_upsert_same_date_overwrites() {
        let db = Database::open_in_memory().unwrap();
        let first = db
            .upsert_measurement(&sample_measurement("2024-01-15", 82.5))
            .unwrap();
        let second = db
            .upsert_measurement(&sample_measurement("2024-01-15", 81.9))
            .unwrap();

        assert_eq!(first.id, second.id);
        assert!((second.weight_kg - 81.9).abs() < f64::EPSILON);
        assert_eq!(db.list_measurements().unwrap().len(), 1);
    }

    #[test]
    fn test_list_measurements_sorted_ascending() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_measurement(&sample_measurement("2024-01-20", 81.0))
            .unwrap();
        db.upsert_measurement(&sample_measurement("2024-01-10", 83.0))
            .unwrap();
        db.upsert_measurement(&sample_measurement("2024-01-15", 82.0))
            .unwrap();

        let all = db.list_measurements().unwrap();
        let dates: Vec<NaiveDate> = all.iter().map(|m| m.date).collect();
        assert_eq!(dates, vec![d("2024-01-10"), d("2024-01-15"), d("2024-01-20")]);
    }

    #[test]
    fn test_history_newest_first_with_limit() {
        let db = Database::open_in_memory().unwrap();
        for (date, w) in [("2024-01-10", 83.0), ("2024-01-11", 82.5), ("2024-01-12", 82.0)] {
            db.upsert_measurement(&sample_measurement(date, w)).unwrap();
        }

        let recent = db.get_measurement_history(Some(2)).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].date, d("2024-01-12"));
        assert_eq!(recent[1].date, d("2024-01-11"));
    }

    #[test]
    fn test_update_measurement() {
        let db = Database::open_in_memory().unwrap();
        let entry = db
            .upsert_measurement(&sample_measurement("2024-01-15", 82.5))
            .unwrap();

        let updated = db
            .update_measurement(entry.id, &UpdateMeasurement {
                weight_kg: Some(81.0),
                waist_cm: Some(None),
                ..UpdateMeasurement::default()
            })
            .unwrap();

        assert!((updated.weight_kg - 81.0).abs() < f64::EPSILON);
        assert!(updated.waist_cm.is_none());
        // Untouched fields survive
        assert_eq!(updated.date, d("2024-01-15"));
    }

    #[test]
    fn test_update_missing_measurement() {
        let db = Database::open_in_memory().unwrap();
        assert!(
            db.update_measurement(99, &UpdateMeasurement::default())
                .is_err()
        );
    }

    #[test]
    fn test_delete_measurement() {
        let db = Database::open_in_memory().unwrap();
        let entry = db
            .upsert_measurement(&sample_measurement("2024-01-15", 82.5))
            .unwrap();

        assert!(db.delete_measurement(entry.id).unwrap());
        assert!(!db.delete_measurement(entry.id).unwrap());
        assert!(db.get_measurement(d("2024-01-15")).unwrap().is_none());
    }

    #[test]
    fn test_insert_goal_starts_at_zero() {
        let db = Database::open_in_memory().unwrap();
        let goal = db
            .insert_goal(
                &NewGoal {
                    activity: "Running".to_string(),
                    frequency: 3,
                },
                d("2024-06-10"),
            )
            .unwrap();

        assert_eq!(goal.activity, "Running");
        assert_eq!(goal.frequency, 3);
        assert_eq!(goal.completed, 0);
        assert_eq!(goal.week_start, d("2024-06-10"));
    }

    #[test]
    fn test_update_goal_keeps_progress() {
        let db = Database::open_in_memory().unwrap();
        let goal = db
            .insert_goal(
                &NewGoal {
                    activity: "Running".to_string(),
                    frequency: 3,
                },
                d("2024-06-10"),
            )
            .unwrap();
        db.set_goal_progress(goal.id, 2, goal.week_start).unwrap();

        let updated = db
            .update_goal(goal.id, &UpdateGoal {
                activity: Some("Cycling".to_string()),
                frequency: None,
            })
            .unwrap();

        assert_eq!(updated.activity, "Cycling");
        assert_eq!(updated.frequency, 3);
        assert_eq!(updated.completed, 2);
    }

    #[test]
    fn test_set_goal_progress_missing_goal() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.set_goal_progress(42, 1, d("2024-06-10")).is_err());
    }

    #[test]
    fn test_delete_goal() {
        let db = Database::open_in_memory().unwrap();
        let goal = db
            .insert_goal(
                &NewGoal {
                    activity: "Running".to_string(),
                    frequency: 3,
                },
                d("2024-06-10"),
            )
            .unwrap();

        assert!(db.delete_goal(goal.id).unwrap());
        assert!(!db.delete_goal(goal.id).unwrap());
        assert!(db.list_goals().unwrap().is_empty());
    }

    #[test]
    fn test_settings_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_setting("height_cm").unwrap().is_none());

        db.set_setting("height_cm", "180").unwrap();
        assert_eq!(db.get_setting("height_cm").unwrap().as_deref(), Some("180"));

        db.set_setting("height_cm", "181").unwrap();
        assert_eq!(db.get_setting("height_cm").unwrap().as_deref(), Some("181"));

        assert!(db.delete_setting("height_cm").unwrap());
        assert!(!db.delete_setting("height_cm").unwrap());
    }

    #[test]
    fn test_export_measurements() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_measurement(&sample_measurement("2024-01-15", 82.5))
            .unwrap();

        let exported = db.get_all_measurements_export().unwrap();
        assert_eq!(exported.len(), 1);
        assert_eq!(exported[0].date, "2024-01-15");
        assert!(!exported[0].uuid.is_empty());
    }

    #[test]
    fn test_import_goal_by_uuid() {
        let db = Database::open_in_memory().unwrap();
        let doc = ExportGoal {
            uuid: "abc-123".to_string(),
            activity: "Swimming".to_string(),
            frequency: 2,
            completed: 1,
            week_start: "2024-06-10".to_string(),
            created_at: "2024-06-10T08:00:00+00:00".to_string(),
            updated_at: "2024-06-12T08:00:00+00:00".to_string(),
        };
        db.put_goal_import(&doc).unwrap();
        db.put_goal_import(&doc).unwrap();

        let goals = db.list_goals().unwrap();
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].uuid, "abc-123");
        assert_eq!(goals[0].completed, 1);

        let by_uuid = db.get_goal_by_uuid("abc-123").unwrap().unwrap();
        assert_eq!(by_uuid.id, goals[0].id);
        assert!(db.get_goal_by_uuid("nope").unwrap().is_none());
    }
}
