//! Workout progress tracker
//!
//! Owns the in-progress state of one workout session:
//! - which exercise is active in the linear flow
//! - per-exercise done flags (checklist)
//! - elapsed session time
//!
//! Every change to the plan is written to a snapshot store on a
//! best-effort basis. The in-memory state stays authoritative.

pub mod clock;
pub mod session;

pub use clock::{ClockTick, SessionClock};
pub use session::{Progress, Progression, SessionState, Timer};

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::workout::{Exercise, WorkoutPlan};

/// Storage slot holding the current workout snapshot
pub const SNAPSHOT_KEY: &str = "@sparta:workout";

/// Exercises shown in the "next up" list
pub const UPCOMING_PREVIEW: usize = 3;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("workout has no exercises")]
    EmptyPlan,
    #[error("workout already finished")]
    SessionFinished,
    #[error("no exercise with id {0}")]
    UnknownExercise(String),
}

/// Single-slot store for the serialized current workout
pub trait SnapshotStore {
    fn load_snapshot(&self) -> Result<Option<WorkoutPlan>>;
    fn save_snapshot(&self, plan: &WorkoutPlan) -> Result<()>;
}

impl SnapshotStore for Database {
    fn load_snapshot(&self) -> Result<Option<WorkoutPlan>> {
        match self.get_item(SNAPSHOT_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save_snapshot(&self, plan: &WorkoutPlan) -> Result<()> {
        self.set_item(SNAPSHOT_KEY, &serde_json::to_string(plan)?)
    }
}

impl<T: SnapshotStore + ?Sized> SnapshotStore for &T {
    fn load_snapshot(&self) -> Result<Option<WorkoutPlan>> {
        (**self).load_snapshot()
    }

    fn save_snapshot(&self, plan: &WorkoutPlan) -> Result<()> {
        (**self).save_snapshot(plan)
    }
}

/// What the tracker reports when the last exercise is done
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSummary {
    pub workout_id: String,
    pub workout_name: String,
    pub exercises: usize,
    pub completed: usize,
    pub elapsed_secs: u64,
    pub finished_at: DateTime<Utc>,
}

/// Receives the "workout completed" signal (streak, history...)
pub trait CompletionSink {
    fn workout_completed(&mut self, summary: &WorkoutSummary);
}

pub struct WorkoutProgressTracker<S: SnapshotStore> {
    plan: WorkoutPlan,
    session: SessionState,
    store: S,
}

impl<S: SnapshotStore> WorkoutProgressTracker<S> {
    /// Start a session over `plan`. `start_at` is clamped into range.
    pub fn initialize(plan: WorkoutPlan, start_at: Option<i64>, start_timer: bool, store: S) -> Self {
        let count = plan.exercises.len();
        let session = SessionState::new(count, start_at, start_timer);

        if count == 0 {
            warn!("Workout {} has no exercises", plan.id);
        } else if let (Some(requested), Some(actual)) = (start_at, session.active_index()) {
            if requested != actual as i64 {
                debug!("start index {} clamped to {}", requested, actual);
            }
        }

        info!(
            "Session started: {} ({} exercises, timer {})",
            plan.name,
            count,
            if start_timer { "on" } else { "off" }
        );

        let tracker = Self { plan, session, store };
        tracker.persist();
        tracker
    }

    pub fn plan(&self) -> &WorkoutPlan {
        &self.plan
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn completed_count(&self) -> usize {
        self.plan.completed_count()
    }

    /// Exercise being performed, or the reason there is none
    pub fn current_exercise(&self) -> Result<&Exercise, TrackerError> {
        match self.session.progression {
            Progression::AtExercise(i) => self.plan.exercises.get(i).ok_or(TrackerError::EmptyPlan),
            Progression::Empty => Err(TrackerError::EmptyPlan),
            Progression::Finished => Err(TrackerError::SessionFinished),
        }
    }

    /// Up to `limit` exercises after the active one
    pub fn upcoming(&self, limit: usize) -> &[Exercise] {
        match self.session.active_index() {
            Some(i) => {
                let start = (i + 1).min(self.plan.exercises.len());
                let end = (start + limit).min(self.plan.exercises.len());
                &self.plan.exercises[start..end]
            }
            None => &[],
        }
    }

    /// Mark the active exercise done and move on. On the last one the
    /// session finishes and `sink` is told exactly once.
    pub fn advance<C: CompletionSink + ?Sized>(&mut self, sink: &mut C) -> Progress {
        let progress = self.session.advance(self.plan.exercises.len());

        match progress {
            Progress::Moved { from, to } => {
                self.plan.exercises[from].done = true;
                debug!("exercise {} -> {}", from, to);
                self.persist();
            }
            Progress::Finished { last } => {
                self.plan.exercises[last].done = true;
                self.persist();

                let summary = self.summary();
                info!(
                    "Workout finished: {} in {}",
                    summary.workout_name,
                    format_clock(summary.elapsed_secs)
                );
                sink.workout_completed(&summary);
            }
            Progress::Idle => {
                debug!("advance ignored: {:?}", self.session.progression);
            }
        }

        progress
    }

    /// Flip the done flag of one exercise (checklist view). Returns the new value.
    pub fn toggle_exercise_done(&mut self, exercise_id: &str) -> Result<bool, TrackerError> {
        let exercise = self
            .plan
            .exercises
            .iter_mut()
            .find(|e| e.id == exercise_id)
            .ok_or_else(|| TrackerError::UnknownExercise(exercise_id.to_string()))?;

        exercise.done = !exercise.done;
        let done = exercise.done;
        debug!("exercise {} done={}", exercise_id, done);

        self.persist();
        Ok(done)
    }

    /// One second elapsed. No-op unless the timer is running.
    pub fn tick(&mut self) -> bool {
        self.session.tick()
    }

    pub fn start_timer(&mut self) {
        self.session.start_timer();
    }

    pub fn stop_timer(&mut self) {
        self.session.stop_timer();
    }

    pub fn summary(&self) -> WorkoutSummary {
        WorkoutSummary {
            workout_id: self.plan.id.clone(),
            workout_name: self.plan.name.clone(),
            exercises: self.plan.exercises.len(),
            completed: self.completed_count(),
            elapsed_secs: self.session.elapsed_secs,
            finished_at: Utc::now(),
        }
    }

    /// Snapshot is a convenience cache: failures are logged and dropped
    fn persist(&self) {
        if let Err(e) = self.store.save_snapshot(&self.plan) {
            warn!("Failed to save workout snapshot: {}", e);
        }
    }
}

/// Format seconds as MM:SS
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workout::{MuscleGroup, demo_workout};

    struct Completions(Vec<WorkoutSummary>);

    impl CompletionSink for Completions {
        fn workout_completed(&mut self, summary: &WorkoutSummary) {
            self.0.push(summary.clone());
        }
    }

    struct BrokenStore;

    impl SnapshotStore for BrokenStore {
        fn load_snapshot(&self) -> Result<Option<WorkoutPlan>> {
            Ok(None)
        }

        fn save_snapshot(&self, _plan: &WorkoutPlan) -> Result<()> {
            anyhow::bail!("quota exceeded")
        }
    }

    fn empty_plan() -> WorkoutPlan {
        WorkoutPlan {
            exercises: vec![],
            ..demo_workout()
        }
    }

    #[test]
    fn test_scenario_linear_flow_finishes() {
        let db = Database::open_in_memory().unwrap();
        let mut tracker = WorkoutProgressTracker::initialize(demo_workout(), None, false, &db);
        let mut sink = Completions(vec![]);

        assert_eq!(tracker.session().active_index(), Some(0));
        assert_eq!(tracker.current_exercise().unwrap().id, "ex-1");

        assert_eq!(tracker.advance(&mut sink), Progress::Moved { from: 0, to: 1 });
        assert_eq!(tracker.advance(&mut sink), Progress::Moved { from: 1, to: 2 });
        assert!(sink.0.is_empty());
        assert_eq!(tracker.advance(&mut sink), Progress::Finished { last: 2 });

        assert!(tracker.session().is_finished());
        assert_eq!(tracker.completed_count(), 3);
        assert_eq!(tracker.current_exercise(), Err(TrackerError::SessionFinished));
        assert_eq!(sink.0.len(), 1);
        assert_eq!(sink.0[0].workout_id, "demo-1");
        assert_eq!(sink.0[0].completed, 3);

        // guarded after the end: no second notification
        assert_eq!(tracker.advance(&mut sink), Progress::Idle);
        assert_eq!(sink.0.len(), 1);
    }

    #[test]
    fn test_scenario_empty_plan() {
        let db = Database::open_in_memory().unwrap();
        let mut tracker = WorkoutProgressTracker::initialize(empty_plan(), Some(2), true, &db);
        let mut sink = Completions(vec![]);

        assert_eq!(tracker.session().progression, Progression::Empty);
        assert_eq!(tracker.current_exercise(), Err(TrackerError::EmptyPlan));
        assert!(tracker.upcoming(UPCOMING_PREVIEW).is_empty());
        assert_eq!(tracker.advance(&mut sink), Progress::Idle);
        assert!(sink.0.is_empty());
    }

    #[test]
    fn test_scenario_toggle_checklist() {
        let db = Database::open_in_memory().unwrap();
        let mut tracker = WorkoutProgressTracker::initialize(demo_workout(), None, false, &db);

        assert_eq!(tracker.completed_count(), 0);
        assert_eq!(tracker.toggle_exercise_done("ex-2"), Ok(true));
        assert_eq!(tracker.completed_count(), 1);
        assert_eq!(tracker.toggle_exercise_done("ex-2"), Ok(false));
        assert_eq!(tracker.completed_count(), 0);

        // toggling does not move the linear flow
        assert_eq!(tracker.session().active_index(), Some(0));
    }

    #[test]
    fn test_toggle_unknown_exercise() {
        let db = Database::open_in_memory().unwrap();
        let mut tracker = WorkoutProgressTracker::initialize(demo_workout(), None, false, &db);
        assert_eq!(
            tracker.toggle_exercise_done("ex-9"),
            Err(TrackerError::UnknownExercise("ex-9".to_string()))
        );
        assert_eq!(tracker.completed_count(), 0);
    }

    #[test]
    fn test_scenario_timer_rejects_ticks_when_stopped() {
        let db = Database::open_in_memory().unwrap();
        let mut tracker = WorkoutProgressTracker::initialize(demo_workout(), None, false, &db);

        tracker.start_timer();
        for _ in 0..5 {
            tracker.tick();
        }
        tracker.stop_timer();
        assert!(!tracker.tick());
        assert!(!tracker.tick());
        assert_eq!(tracker.session().elapsed_secs, 5);
        assert_eq!(tracker.summary().elapsed_secs, 5);
    }

    #[test]
    fn test_snapshot_follows_every_mutation() {
        let db = Database::open_in_memory().unwrap();
        let mut tracker = WorkoutProgressTracker::initialize(demo_workout(), None, false, &db);
        let mut sink = Completions(vec![]);

        assert_eq!(db.load_snapshot().unwrap().as_ref(), Some(tracker.plan()));

        tracker.toggle_exercise_done("ex-3").unwrap();
        let snapshot = db.load_snapshot().unwrap().unwrap();
        assert!(snapshot.find_exercise("ex-3").unwrap().done);

        tracker.advance(&mut sink);
        let snapshot = db.load_snapshot().unwrap().unwrap();
        assert!(snapshot.find_exercise("ex-1").unwrap().done);
        assert_eq!(snapshot.completed_count(), 2);
    }

    #[test]
    fn test_snapshot_write_failure_is_swallowed() {
        let mut tracker = WorkoutProgressTracker::initialize(demo_workout(), None, true, BrokenStore);
        let mut sink = Completions(vec![]);

        assert_eq!(tracker.toggle_exercise_done("ex-1"), Ok(true));
        assert_eq!(tracker.advance(&mut sink), Progress::Moved { from: 0, to: 1 });
        assert!(tracker.tick());
        assert_eq!(tracker.session().elapsed_secs, 1);
    }

    #[test]
    fn test_start_at_and_upcoming() {
        let mut plan = demo_workout();
        plan.exercises.push(Exercise::new("ex-4", "Desenvolvimento", 3, "10", MuscleGroup::Shoulders));
        plan.exercises.push(Exercise::new("ex-5", "Prancha", 3, "30s", MuscleGroup::Core));
        let db = Database::open_in_memory().unwrap();

        let tracker = WorkoutProgressTracker::initialize(plan.clone(), None, false, &db);
        let next: Vec<_> = tracker.upcoming(UPCOMING_PREVIEW).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(next, vec!["ex-2", "ex-3", "ex-4"]);

        let tracker = WorkoutProgressTracker::initialize(plan.clone(), Some(3), false, &db);
        assert_eq!(tracker.current_exercise().unwrap().id, "ex-4");
        assert_eq!(tracker.upcoming(UPCOMING_PREVIEW).len(), 1);

        let tracker = WorkoutProgressTracker::initialize(plan, Some(42), false, &db);
        assert_eq!(tracker.current_exercise().unwrap().id, "ex-5");
        assert!(tracker.upcoming(UPCOMING_PREVIEW).is_empty());
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(3600), "60:00");
    }
}
