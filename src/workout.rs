//! Workout definitions - treinos, exercícios e grupos musculares

use serde::{Deserialize, Serialize};

/// Muscle groups as shown on workout cards
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum MuscleGroup {
    Chest,     // Peito
    Back,      // Costas
    Legs,      // Pernas
    Shoulders, // Ombros
    Arms,      // Braços
    Core,      // Abdômen
    Cardio,    // Cardio
    Unknown,   // Geral
}

impl MuscleGroup {
    pub fn label(&self) -> &'static str {
        match self {
            MuscleGroup::Chest => "Peito",
            MuscleGroup::Back => "Costas",
            MuscleGroup::Legs => "Pernas",
            MuscleGroup::Shoulders => "Ombros",
            MuscleGroup::Arms => "Braços",
            MuscleGroup::Core => "Abdômen",
            MuscleGroup::Cardio => "Cardio",
            MuscleGroup::Unknown => "Geral",
        }
    }

    /// All muscle groups for iteration
    pub fn all() -> &'static [MuscleGroup] {
        &[
            MuscleGroup::Chest,
            MuscleGroup::Back,
            MuscleGroup::Legs,
            MuscleGroup::Shoulders,
            MuscleGroup::Arms,
            MuscleGroup::Core,
            MuscleGroup::Cardio,
            MuscleGroup::Unknown,
        ]
    }
}

impl From<String> for MuscleGroup {
    fn from(label: String) -> Self {
        MuscleGroup::all()
            .iter()
            .copied()
            .find(|g| g.label() == label)
            .unwrap_or(MuscleGroup::Unknown)
    }
}

impl From<MuscleGroup> for String {
    fn from(group: MuscleGroup) -> Self {
        group.label().to_string()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkoutStatus {
    Draft,
    Active,
    Completed,
}

/// Single movement inside a plan. `done` is the only field a session changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub sets: u32,
    pub reps: String, // "10-12", "15", "até a falha"
    pub muscle_group: MuscleGroup,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technique: Option<String>, // Drop Set, Rest-Pause...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub done: bool,
}

impl Exercise {
    pub fn new(id: &str, name: &str, sets: u32, reps: &str, muscle_group: MuscleGroup) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            sets,
            reps: reps.to_string(),
            muscle_group,
            technique: None,
            equipment: None,
            image: None,
            done: false,
        }
    }
}

/// Ordered list of exercises assigned to a student
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub focal_muscles: String,
    /// Estimated duration in minutes
    #[serde(rename = "duration")]
    pub duration_min: u32,
    pub exercises: Vec<Exercise>,
    #[serde(default, rename = "isAiGenerated")]
    pub ai_generated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkoutStatus>,
}

impl WorkoutPlan {
    pub fn completed_count(&self) -> usize {
        self.exercises.iter().filter(|e| e.done).count()
    }

    /// Same plan as `other` apart from done flags and status
    pub fn same_definition(&self, other: &WorkoutPlan) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.exercises.len() == other.exercises.len()
            && self
                .exercises
                .iter()
                .zip(&other.exercises)
                .all(|(a, b)| Exercise { done: b.done, ..a.clone() } == *b)
    }

    pub fn find_exercise(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    /// Header title for the session screen
    pub fn title(&self) -> &str {
        if !self.focal_muscles.is_empty() {
            &self.focal_muscles
        } else if !self.name.is_empty() {
            &self.name
        } else {
            "Strength Training"
        }
    }

    /// Distinct muscle groups in plan order
    pub fn muscle_groups(&self) -> Vec<MuscleGroup> {
        let mut groups = Vec::new();
        for ex in &self.exercises {
            if !groups.contains(&ex.muscle_group) {
                groups.push(ex.muscle_group);
            }
        }
        groups
    }

    pub fn total_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.sets).sum()
    }
}

/// Fallback plan when nobody has assigned a workout yet
pub fn demo_workout() -> WorkoutPlan {
    WorkoutPlan {
        id: "demo-1".to_string(),
        name: "Full body workout".to_string(),
        focal_muscles: "Corpo completo".to_string(),
        duration_min: 45,
        exercises: vec![
            Exercise::new("ex-1", "Agachamento livre", 3, "12", MuscleGroup::Legs),
            Exercise::new("ex-2", "Supino reto", 3, "10", MuscleGroup::Chest),
            Exercise::new("ex-3", "Remada curvada", 3, "12", MuscleGroup::Back),
        ],
        ai_generated: true,
        status: None,
    }
}
