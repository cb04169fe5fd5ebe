//! Trainer review queue - AI generated workouts waiting for approval

use clap::ValueEnum;

use crate::roster::STUDENTS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReviewStatus {
    Draft,
    Pending,
    Active,
}

impl ReviewStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ReviewStatus::Draft => "Draft",
            ReviewStatus::Pending => "Pendente",
            ReviewStatus::Active => "Ativo",
        }
    }

    /// Still needs the trainer's attention
    pub fn awaits_review(&self) -> bool {
        matches!(self, ReviewStatus::Draft | ReviewStatus::Pending)
    }
}

#[derive(Debug, Clone)]
pub struct WorkoutReview {
    pub id: &'static str,
    pub student_name: &'static str,
    pub workout_name: &'static str,
    pub generated_by: &'static str, // "AI"
    pub status: ReviewStatus,
    pub created_at: &'static str,
    pub description: &'static str,
}

impl WorkoutReview {
    /// "CS" for "Carlos Silva"
    pub fn initials(&self) -> String {
        self.student_name
            .split_whitespace()
            .filter_map(|w| w.chars().next())
            .take(2)
            .collect::<String>()
            .to_uppercase()
    }
}

pub const REVIEWS: &[WorkoutReview] = &[
    WorkoutReview {
        id: "1",
        student_name: "Carlos Silva",
        workout_name: "Hipertrofia Push A",
        generated_by: "AI",
        status: ReviewStatus::Draft,
        created_at: "Há 2 horas",
        description: "Treino de peito, ombros e tríceps focado em hipertrofia",
    },
    WorkoutReview {
        id: "2",
        student_name: "Ana Santos",
        workout_name: "Leg Day - Força",
        generated_by: "AI",
        status: ReviewStatus::Pending,
        created_at: "Há 5 horas",
        description: "Treino de pernas com foco em força e potência",
    },
    WorkoutReview {
        id: "3",
        student_name: "João Pedro",
        workout_name: "Pull Workout",
        generated_by: "AI",
        status: ReviewStatus::Draft,
        created_at: "Há 1 dia",
        description: "Treino de costas e bíceps para hipertrofia",
    },
    WorkoutReview {
        id: "4",
        student_name: "Marina Costa",
        workout_name: "HIIT Cardio",
        generated_by: "AI",
        status: ReviewStatus::Active,
        created_at: "Há 2 dias",
        description: "Treino cardiovascular de alta intensidade",
    },
    WorkoutReview {
        id: "5",
        student_name: "Rafael Oliveira",
        workout_name: "Upper Body - Strength",
        generated_by: "AI",
        status: ReviewStatus::Pending,
        created_at: "Há 3 horas",
        description: "Treino de membros superiores focado em força",
    },
];

/// `None` keeps every review
pub fn filter_reviews(reviews: &[WorkoutReview], status: Option<ReviewStatus>) -> Vec<&WorkoutReview> {
    reviews
        .iter()
        .filter(|r| status.is_none_or(|s| s == r.status))
        .collect()
}

/// Trainer dashboard counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewStats {
    pub total_students: usize,
    pub pending_reviews: usize,
    pub active_workouts: usize,
}

impl ReviewStats {
    pub fn from_reviews(reviews: &[WorkoutReview]) -> Self {
        Self {
            total_students: STUDENTS.len(),
            pending_reviews: reviews.iter().filter(|r| r.status.awaits_review()).count(),
            active_workouts: reviews
                .iter()
                .filter(|r| r.status == ReviewStatus::Active)
                .count(),
        }
    }
}
