//! Application context - the signed-in user and everything hanging off it
//!
//! All reads and writes of the user slot go through `SpartaContext`.
//! Screens get the context passed in instead of reading storage directly.

use std::fmt;

use anyhow::{Result, bail};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::{CompletedWorkout, Database};
use crate::history::WorkoutHistory;
use crate::tracker::{CompletionSink, SNAPSHOT_KEY, SnapshotStore, WorkoutSummary};
use crate::workout::{WorkoutPlan, WorkoutStatus, demo_workout};

pub const TOKEN_KEY: &str = "@sparta:token";
pub const USER_KEY: &str = "@sparta:user";

const DEV_TOKEN: &str = "dev-access-token";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Professional,
    Student,
}

impl UserRole {
    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Admin => "Administrador",
            UserRole::Professional => "Personal Trainer",
            UserRole::Student => "Aluno",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Goal {
    WeightLoss,
    #[default]
    Hypertrophy,
    Conditioning,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ExperienceLevel {
    #[default]
    #[serde(rename = "Iniciante")]
    Beginner,
    #[serde(rename = "Intermediário")]
    Intermediate,
    #[serde(rename = "Avançado")]
    Advanced,
}

fn default_frequency() -> u8 {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserState {
    pub name: String,
    pub role: UserRole,
    #[serde(default)]
    pub goal: Goal,
    /// Workouts per week
    #[serde(default = "default_frequency")]
    pub frequency: u8,
    #[serde(default)]
    pub level: ExperienceLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_workout: Option<WorkoutPlan>,
    #[serde(default)]
    pub streak: u32,
}

impl UserState {
    pub fn new(name: &str, role: UserRole) -> Self {
        Self {
            name: name.to_string(),
            role,
            goal: Goal::default(),
            frequency: default_frequency(),
            level: ExperienceLevel::default(),
            current_workout: None,
            streak: 0,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("not logged in, run `sparta login` first")]
    NotLoggedIn,
    #[error("this area is for {required}, you are logged in as {actual}")]
    WrongRole { required: UserRole, actual: UserRole },
}

/// Where the session's plan came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanSource {
    /// Assigned to the user by a trainer
    Assigned,
    /// Restored from the last session snapshot
    Snapshot,
    /// Nothing else available
    Demo,
}

pub struct SpartaContext<'a> {
    db: &'a Database,
    user: Option<UserState>,
}

impl<'a> SpartaContext<'a> {
    /// Read the user slot. A corrupt slot counts as logged out.
    pub fn load(db: &'a Database) -> Result<Self> {
        let user = match db.get_item(USER_KEY)? {
            Some(json) => match serde_json::from_str::<UserState>(&json) {
                Ok(user) => Some(user),
                Err(e) => {
                    warn!("Ignoring unreadable user slot: {}", e);
                    None
                }
            },
            None => None,
        };
        Ok(Self { db, user })
    }

    pub fn db(&self) -> &'a Database {
        self.db
    }

    pub fn user(&self) -> Option<&UserState> {
        self.user.as_ref()
    }

    /// Dev login: no password, the role picks the dashboard
    pub fn login(&mut self, name: &str, role: UserRole) -> Result<&UserState> {
        self.db.set_item(TOKEN_KEY, DEV_TOKEN)?;
        let user = UserState::new(name, role);
        self.db.set_item(USER_KEY, &serde_json::to_string(&user)?)?;
        info!("Logged in: {} ({})", name, role);
        Ok(&*self.user.insert(user))
    }

    pub fn logout(&mut self) -> Result<()> {
        self.db.remove_item(USER_KEY)?;
        if let Some(user) = self.user.take() {
            info!("Logged out: {}", user.name);
        }
        Ok(())
    }

    /// Route guard: only `role` may pass
    pub fn require_role(&self, role: UserRole) -> Result<&UserState, AccessError> {
        let user = self.user.as_ref().ok_or(AccessError::NotLoggedIn)?;
        if user.role != role {
            return Err(AccessError::WrongRole { required: role, actual: user.role });
        }
        Ok(user)
    }

    /// Trainer hands the user a new plan. Any half-done session is dropped.
    pub fn assign_workout(&mut self, mut plan: WorkoutPlan) -> Result<()> {
        let Some(user) = self.user.as_mut() else {
            bail!(AccessError::NotLoggedIn);
        };
        for ex in plan.exercises.iter_mut() {
            ex.done = false;
        }
        plan.status = Some(WorkoutStatus::Active);
        info!("Assigned workout {} to {}", plan.name, user.name);
        user.current_workout = Some(plan);
        self.save_user()?;
        self.db.remove_item(SNAPSHOT_KEY)
    }

    /// Plan for the next session: assigned > snapshot > demo.
    ///
    /// A snapshot resumes the assigned plan only while it is the same
    /// plan (apart from done flags) and that plan is not completed.
    pub fn resolve_workout(&self) -> (WorkoutPlan, PlanSource) {
        let snapshot = match self.db.load_snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Ignoring unreadable workout snapshot: {}", e);
                None
            }
        };

        let assigned = self.user.as_ref().and_then(|u| u.current_workout.as_ref());
        match (assigned, snapshot) {
            (Some(plan), Some(snapshot))
                if plan.status != Some(WorkoutStatus::Completed) && plan.same_definition(&snapshot) =>
            {
                (snapshot, PlanSource::Snapshot)
            }
            (Some(plan), _) => (plan.clone(), PlanSource::Assigned),
            (None, Some(snapshot)) => (snapshot, PlanSource::Snapshot),
            (None, None) => (demo_workout(), PlanSource::Demo),
        }
    }

    pub fn history(&self) -> Result<WorkoutHistory> {
        Ok(WorkoutHistory::new(self.db.get_completed_workouts()?))
    }

    /// Record a finished workout and refresh the streak
    pub fn complete_workout(&mut self, summary: &WorkoutSummary) -> Result<()> {
        let record = CompletedWorkout {
            id: None,
            date: summary.finished_at,
            workout_id: summary.workout_id.clone(),
            workout_name: summary.workout_name.clone(),
            exercises: summary.exercises as i32,
            elapsed_secs: (summary.elapsed_secs > 0).then_some(summary.elapsed_secs as i64),
        };
        self.db.add_completed_workout(&record)?;

        let streak = self.history()?.streak(Local::now().date_naive());
        let Some(user) = self.user.as_mut() else {
            return Ok(());
        };

        user.streak = streak;
        if let Some(plan) = user.current_workout.as_mut()
            && plan.id == summary.workout_id
        {
            plan.status = Some(WorkoutStatus::Completed);
        }
        info!("{} completed {} (streak {})", user.name, summary.workout_name, streak);
        self.save_user()
    }

    fn save_user(&self) -> Result<()> {
        match &self.user {
            Some(user) => self.db.set_item(USER_KEY, &serde_json::to_string(user)?),
            None => Ok(()),
        }
    }
}

impl CompletionSink for SpartaContext<'_> {
    fn workout_completed(&mut self, summary: &WorkoutSummary) {
        if let Err(e) = self.complete_workout(summary) {
            warn!("Failed to record completed workout: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{Progress, WorkoutProgressTracker};
    use crate::workout::{Exercise, MuscleGroup};

    fn trainer_plan() -> WorkoutPlan {
        WorkoutPlan {
            id: "w-push".to_string(),
            name: "Hypertrophy Push A".to_string(),
            focal_muscles: "Upper Body".to_string(),
            duration_min: 60,
            exercises: vec![
                Exercise::new("p1", "Supino reto", 4, "8-10", MuscleGroup::Chest),
                Exercise::new("p2", "Tríceps corda", 3, "12", MuscleGroup::Arms),
            ],
            ai_generated: false,
            status: None,
        }
    }

    #[test]
    fn test_login_persists_user_and_token() {
        let db = Database::open_in_memory().unwrap();
        let mut ctx = SpartaContext::load(&db).unwrap();
        assert!(ctx.user().is_none());

        ctx.login("Pedro Iago", UserRole::Student).unwrap();
        assert_eq!(db.get_item(TOKEN_KEY).unwrap().as_deref(), Some(DEV_TOKEN));

        let reloaded = SpartaContext::load(&db).unwrap();
        let user = reloaded.user().unwrap();
        assert_eq!(user.name, "Pedro Iago");
        assert_eq!(user.role, UserRole::Student);
        assert_eq!(user.frequency, 3);
    }

    #[test]
    fn test_minimal_user_slot_gets_defaults() {
        let db = Database::open_in_memory().unwrap();
        db.set_item(USER_KEY, r#"{"name":"Ana","role":"PROFESSIONAL"}"#).unwrap();
        let ctx = SpartaContext::load(&db).unwrap();
        let user = ctx.user().unwrap();
        assert_eq!(user.role, UserRole::Professional);
        assert_eq!(user.goal, Goal::Hypertrophy);
        assert_eq!(user.level, ExperienceLevel::Beginner);
        assert_eq!(user.streak, 0);
    }

    #[test]
    fn test_corrupt_user_slot_is_logged_out() {
        let db = Database::open_in_memory().unwrap();
        db.set_item(USER_KEY, "{not json").unwrap();
        let ctx = SpartaContext::load(&db).unwrap();
        assert_eq!(ctx.require_role(UserRole::Student).unwrap_err(), AccessError::NotLoggedIn);
    }

    #[test]
    fn test_require_role() {
        let db = Database::open_in_memory().unwrap();
        let mut ctx = SpartaContext::load(&db).unwrap();
        assert_eq!(ctx.require_role(UserRole::Admin).unwrap_err(), AccessError::NotLoggedIn);

        ctx.login("Carlos", UserRole::Professional).unwrap();
        assert!(ctx.require_role(UserRole::Professional).is_ok());
        assert_eq!(
            ctx.require_role(UserRole::Student).unwrap_err(),
            AccessError::WrongRole {
                required: UserRole::Student,
                actual: UserRole::Professional
            }
        );

        ctx.logout().unwrap();
        assert!(ctx.user().is_none());
        assert_eq!(db.get_item(USER_KEY).unwrap(), None);
    }

    #[test]
    fn test_resolve_precedence() {
        let db = Database::open_in_memory().unwrap();
        let mut ctx = SpartaContext::load(&db).unwrap();

        let (plan, source) = ctx.resolve_workout();
        assert_eq!(source, PlanSource::Demo);
        assert_eq!(plan.id, "demo-1");

        let mut old = demo_workout();
        old.id = "old".to_string();
        db.save_snapshot(&old).unwrap();
        let (plan, source) = ctx.resolve_workout();
        assert_eq!((plan.id.as_str(), source), ("old", PlanSource::Snapshot));

        ctx.login("Pedro", UserRole::Student).unwrap();
        ctx.assign_workout(trainer_plan()).unwrap();
        let (plan, source) = ctx.resolve_workout();
        assert_eq!((plan.id.as_str(), source), ("w-push", PlanSource::Assigned));
        assert_eq!(plan.status, Some(WorkoutStatus::Active));

        // snapshot of the same plan keeps its done flags
        let mut progressed = plan.clone();
        progressed.exercises[0].done = true;
        db.save_snapshot(&progressed).unwrap();
        let (plan, source) = ctx.resolve_workout();
        assert_eq!(source, PlanSource::Snapshot);
        assert_eq!(plan.completed_count(), 1);
    }

    #[test]
    fn test_assign_requires_login() {
        let db = Database::open_in_memory().unwrap();
        let mut ctx = SpartaContext::load(&db).unwrap();
        assert!(ctx.assign_workout(trainer_plan()).is_err());
    }

    #[test]
    fn test_finishing_session_updates_streak_and_history() {
        let db = Database::open_in_memory().unwrap();
        let mut ctx = SpartaContext::load(&db).unwrap();
        ctx.login("Pedro", UserRole::Student).unwrap();
        ctx.assign_workout(trainer_plan()).unwrap();

        let (plan, _) = ctx.resolve_workout();
        let mut tracker = WorkoutProgressTracker::initialize(plan, None, true, &db);
        for _ in 0..90 {
            tracker.tick();
        }
        assert!(matches!(tracker.advance(&mut ctx), Progress::Moved { .. }));
        assert!(matches!(tracker.advance(&mut ctx), Progress::Finished { .. }));

        let history = ctx.history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.recent(1)[0].workout_id, "w-push");
        assert_eq!(history.recent(1)[0].elapsed_secs, Some(90));

        let reloaded = SpartaContext::load(&db).unwrap();
        let user = reloaded.user().unwrap();
        assert_eq!(user.streak, 1);
        assert_eq!(
            user.current_workout.as_ref().unwrap().status,
            Some(WorkoutStatus::Completed)
        );
    }

    fn finish_session(ctx: &mut SpartaContext, db: &Database) {
        let (plan, _) = ctx.resolve_workout();
        let mut tracker = WorkoutProgressTracker::initialize(plan, None, false, db);
        while !matches!(tracker.advance(&mut *ctx), Progress::Finished { .. }) {}
    }

    #[test]
    fn test_reassigning_same_plan_starts_clean() {
        let db = Database::open_in_memory().unwrap();
        let mut ctx = SpartaContext::load(&db).unwrap();
        ctx.login("Pedro", UserRole::Student).unwrap();
        ctx.assign_workout(trainer_plan()).unwrap();
        finish_session(&mut ctx, &db);

        let mut longer = trainer_plan();
        longer.exercises.push(Exercise::new("p3", "Desenvolvimento", 3, "10", MuscleGroup::Shoulders));
        ctx.assign_workout(longer).unwrap();
        assert_eq!(db.get_item(SNAPSHOT_KEY).unwrap(), None);

        let (plan, source) = ctx.resolve_workout();
        assert_eq!(source, PlanSource::Assigned);
        assert_eq!(plan.exercises.len(), 3);
        assert_eq!(plan.completed_count(), 0);
    }

    #[test]
    fn test_completed_plan_is_not_resumed() {
        let db = Database::open_in_memory().unwrap();
        let mut ctx = SpartaContext::load(&db).unwrap();
        ctx.login("Pedro", UserRole::Student).unwrap();
        ctx.assign_workout(trainer_plan()).unwrap();
        finish_session(&mut ctx, &db);

        // snapshot still holds the finished session
        assert_eq!(db.load_snapshot().unwrap().unwrap().completed_count(), 2);

        let (plan, source) = ctx.resolve_workout();
        assert_eq!(source, PlanSource::Assigned);
        assert_eq!(plan.completed_count(), 0);
        assert_eq!(plan.status, Some(WorkoutStatus::Completed));
    }

    #[test]
    fn test_snapshot_with_other_exercises_is_not_resumed() {
        let db = Database::open_in_memory().unwrap();
        let mut ctx = SpartaContext::load(&db).unwrap();
        ctx.login("Pedro", UserRole::Student).unwrap();
        ctx.assign_workout(trainer_plan()).unwrap();

        let mut stale = trainer_plan();
        stale.exercises.truncate(1);
        stale.exercises[0].done = true;
        db.save_snapshot(&stale).unwrap();

        let (plan, source) = ctx.resolve_workout();
        assert_eq!(source, PlanSource::Assigned);
        assert_eq!(plan.exercises.len(), 2);
        assert_eq!(plan.completed_count(), 0);
    }
}
