//! Session state machines: linear progression and stopwatch
//!
//! The two machines are independent. Progression only moves forward;
//! the stopwatch only counts while running.

/// Where the learner is in the linear flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progression {
    /// Plan has no exercises, nothing to show
    Empty,
    AtExercise(usize),
    /// Last exercise done, terminal
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timer {
    #[default]
    Stopped,
    Running,
}

/// Result of one `advance` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Moved { from: usize, to: usize },
    /// Left the last exercise, session is over
    Finished { last: usize },
    /// Nothing to advance (empty plan or already finished)
    Idle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub progression: Progression,
    pub timer: Timer,
    pub elapsed_secs: u64,
}

impl SessionState {
    /// Create session for a plan with `exercise_count` exercises.
    ///
    /// An out-of-range `start_at` is clamped to the nearest valid index.
    pub fn new(exercise_count: usize, start_at: Option<i64>, start_timer: bool) -> Self {
        let progression = if exercise_count == 0 {
            Progression::Empty
        } else {
            Progression::AtExercise(clamp_index(start_at.unwrap_or(0), exercise_count))
        };

        Self {
            progression,
            timer: if start_timer { Timer::Running } else { Timer::Stopped },
            elapsed_secs: 0,
        }
    }

    pub fn active_index(&self) -> Option<usize> {
        match self.progression {
            Progression::AtExercise(i) => Some(i),
            Progression::Empty | Progression::Finished => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.progression == Progression::Finished
    }

    pub fn is_running(&self) -> bool {
        self.timer == Timer::Running
    }

    pub fn advance(&mut self, exercise_count: usize) -> Progress {
        match self.progression {
            Progression::AtExercise(i) if i + 1 < exercise_count => {
                self.progression = Progression::AtExercise(i + 1);
                Progress::Moved { from: i, to: i + 1 }
            }
            Progression::AtExercise(i) => {
                self.progression = Progression::Finished;
                Progress::Finished { last: i }
            }
            Progression::Empty | Progression::Finished => Progress::Idle,
        }
    }

    /// Count one second. Returns false (and changes nothing) while stopped.
    pub fn tick(&mut self) -> bool {
        match self.timer {
            Timer::Running => {
                self.elapsed_secs += 1;
                true
            }
            Timer::Stopped => false,
        }
    }

    pub fn start_timer(&mut self) {
        self.timer = Timer::Running;
    }

    pub fn stop_timer(&mut self) {
        self.timer = Timer::Stopped;
    }
}

fn clamp_index(requested: i64, len: usize) -> usize {
    let last = len.saturating_sub(1);
    if requested <= 0 {
        0
    } else {
        usize::try_from(requested).map_or(last, |i| i.min(last))
    }
}
