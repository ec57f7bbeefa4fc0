use anyhow::{bail, Context, Result};
use chrono_tz::Tz;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use studyplan_core::{StudySession, Task};

pub fn studyplan_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".studyplan"))
}

pub fn ensure_studyplan_home() -> Result<PathBuf> {
    let dir = studyplan_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Task and session collections, one JSON array per file.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
    /// Zone for offset-less stored timestamps.
    tz: Tz,
}

impl Store {
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            tz: Tz::UTC,
        }
    }

    pub fn open_default() -> Result<Self> {
        Ok(Self::open(ensure_studyplan_home()?))
    }

    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.tz = tz;
        self
    }

    pub fn tasks_path(&self) -> PathBuf {
        self.dir.join("tasks.json")
    }

    pub fn sessions_path(&self) -> PathBuf {
        self.dir.join("sessions.json")
    }

    pub fn load_tasks(&self) -> Result<Vec<Task>> {
        let mut tasks: Vec<Task> = read_collection(&self.tasks_path())?;
        for task in &mut tasks {
            task.resolve_in(&self.tz);
        }
        Ok(tasks)
    }

    pub fn save_tasks(&self, tasks: &[Task]) -> Result<()> {
        write_collection(&self.tasks_path(), tasks)
    }

    /// Sessions that parse; records that don't are logged and skipped.
    pub fn load_sessions(&self) -> Result<Vec<StudySession>> {
        let path = self.sessions_path();
        let records: Vec<Value> = read_collection(&path)?;
        let sessions = records
            .into_iter()
            .enumerate()
            .filter_map(|(i, record)| match serde_json::from_value(record) {
                Ok(session) => Some(session),
                Err(e) => {
                    tracing::warn!(path = %path.display(), index = i, error = %e, "skipping unreadable session");
                    None
                }
            })
            .collect();
        Ok(sessions)
    }

    /// Append one session, leaving existing records untouched.
    pub fn append_session(&self, session: &StudySession) -> Result<()> {
        let path = self.sessions_path();
        let mut records: Vec<Value> = read_collection(&path)?;
        records.push(serde_json::to_value(session)?);
        write_collection(&path, &records)
    }
}

/// Resolve a full id or a unique id prefix to an index into `tasks`.
pub fn find_task(tasks: &[Task], id: &str) -> Result<usize> {
    if let Some(i) = tasks.iter().position(|t| t.id == id) {
        return Ok(i);
    }
    let matches: Vec<usize> = tasks
        .iter()
        .enumerate()
        .filter(|(_, t)| !id.is_empty() && t.id.starts_with(id))
        .map(|(i, _)| i)
        .collect();
    match matches.as_slice() {
        [i] => Ok(*i),
        [] => bail!("no task with id '{id}'"),
        _ => bail!("id prefix '{id}' matches {} tasks; use more characters", matches.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use studyplan_core::TaskStatus;

    #[test]
    fn missing_files_are_empty_collections() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path());
        assert!(store.load_tasks().unwrap().is_empty());
        assert!(store.load_sessions().unwrap().is_empty());
    }

    #[test]
    fn round_trips_tasks_and_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("nested"));
        let now = Utc.with_ymd_and_hms(2026, 2, 19, 12, 0, 0).unwrap();

        let mut task = Task::new("t1", "Read paper").with_created(now).with_due(now);
        task.set_status(TaskStatus::Completed, now);
        store.save_tasks(std::slice::from_ref(&task)).unwrap();
        store
            .append_session(&StudySession::start("s1", "t1", now))
            .unwrap();

        assert_eq!(store.load_tasks().unwrap(), vec![task]);
        assert_eq!(store.load_sessions().unwrap()[0].task_id, "t1");
    }

    #[test]
    fn malformed_file_is_an_error_not_an_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path());
        fs::write(store.tasks_path(), "{ not json").unwrap();
        let err = store.load_tasks().unwrap_err();
        assert!(format!("{err:#}").contains("tasks.json"));
    }

    #[test]
    fn offset_less_stamps_load_in_store_zone() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).with_timezone(chrono_tz::America::Chicago);
        fs::write(
            store.tasks_path(),
            r#"[{"id":"a","title":"Lab","dueDate":"2026-03-12T17:00","estimatedTime":60,
                "priority":"high","category":"assignment","status":"pending",
                "createdAt":"2026-03-01T10:00:00.000Z"}]"#,
        )
        .unwrap();

        let tasks = store.load_tasks().unwrap();
        // 17:00 CDT; 26h after `now` rather than 21h
        assert_eq!(tasks[0].due_date, Some(Utc.with_ymd_and_hms(2026, 3, 12, 22, 0, 0).unwrap()));
        let now = Utc.with_ymd_and_hms(2026, 3, 11, 20, 0, 0).unwrap();
        assert_eq!(studyplan_core::procrastination_score(&tasks[0], now), 70.0);

        // Saving untouched tasks writes the stored text back.
        store.save_tasks(&tasks).unwrap();
        let raw = fs::read_to_string(store.tasks_path()).unwrap();
        assert!(raw.contains(r#""dueDate": "2026-03-12T17:00""#));
        assert!(raw.contains(r#""createdAt": "2026-03-01T10:00:00.000Z""#));
    }

    #[test]
    fn unreadable_sessions_are_skipped_and_kept() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path());
        fs::write(
            store.sessions_path(),
            r#"[{"id":"bad","taskId":"t1","startTime":"whenever","productivity":5}]"#,
        )
        .unwrap();
        assert!(store.load_sessions().unwrap().is_empty());

        let now = Utc.with_ymd_and_hms(2026, 3, 11, 20, 0, 0).unwrap();
        store.append_session(&StudySession::start("s1", "t1", now)).unwrap();
        let sessions = store.load_sessions().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, "s1");

        let raw: Vec<Value> =
            serde_json::from_str(&fs::read_to_string(store.sessions_path()).unwrap()).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0]["startTime"], "whenever");
    }

    #[test]
    fn finds_by_id_or_unique_prefix() {
        let tasks = vec![Task::new("abc123", "a"), Task::new("abd456", "b")];
        assert_eq!(find_task(&tasks, "abd456").unwrap(), 1);
        assert_eq!(find_task(&tasks, "abc").unwrap(), 0);
        assert!(find_task(&tasks, "ab").is_err());
        assert!(find_task(&tasks, "zzz").is_err());
        assert!(find_task(&tasks, "").is_err());
    }
}
