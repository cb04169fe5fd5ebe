//! Daily diet - meal checklist and macro totals

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::db::Database;

pub const MEALS_KEY: &str = "@sparta:meals";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Meal {
    pub id: String,
    pub name: String,
    pub calories: u32,
    pub protein: u32, // grams
    pub carbs: u32,
    pub fat: u32,
    pub time: String, // "07:30"
    #[serde(default)]
    pub completed: bool,
}

impl Meal {
    fn new(id: &str, name: &str, time: &str, calories: u32, protein: u32, carbs: u32, fat: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            calories,
            protein,
            carbs,
            fat,
            time: time.to_string(),
            completed: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MacroTotals {
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

impl MacroTotals {
    /// Sum of meals already eaten
    pub fn from_meals(meals: &[Meal]) -> Self {
        meals
            .iter()
            .filter(|m| m.completed)
            .fold(Self::default(), |acc, m| Self {
                calories: acc.calories + m.calories,
                protein: acc.protein + m.protein,
                carbs: acc.carbs + m.carbs,
                fat: acc.fat + m.fat,
            })
    }
}

/// Daily goals
pub type MacroTargets = MacroTotals;

pub const DEFAULT_TARGETS: MacroTargets = MacroTotals {
    calories: 2400,
    protein: 180,
    carbs: 200,
    fat: 60,
};

/// Rounded percentage of target, capped at 100
pub fn percent_of(value: u32, target: u32) -> u32 {
    if target == 0 {
        return 100;
    }
    let pct = (value as f64 / target as f64 * 100.0).round() as u32;
    pct.min(100)
}

pub fn demo_meals() -> Vec<Meal> {
    vec![
        Meal::new("m1", "Café da manhã", "07:30", 520, 35, 60, 14),
        Meal::new("m2", "Lanche da manhã", "10:00", 280, 25, 20, 9),
        Meal::new("m3", "Almoço", "12:30", 720, 55, 70, 18),
        Meal::new("m4", "Pré-treino", "16:00", 310, 20, 45, 5),
        Meal::new("m5", "Jantar", "20:00", 570, 45, 5, 14),
    ]
}

/// Meals for today, demo list when nothing is stored yet
pub fn load_meals(db: &Database) -> Result<Vec<Meal>> {
    match db.get_item(MEALS_KEY)? {
        Some(json) => match serde_json::from_str(&json) {
            Ok(meals) => Ok(meals),
            Err(e) => {
                warn!("Ignoring unreadable meals slot: {}", e);
                Ok(demo_meals())
            }
        },
        None => Ok(demo_meals()),
    }
}

pub fn save_meals(db: &Database, meals: &[Meal]) -> Result<()> {
    db.set_item(MEALS_KEY, &serde_json::to_string(meals)?)
}

/// Flip a meal's completed flag. Returns the new value, None if no such meal.
pub fn toggle_meal(meals: &mut [Meal], id: &str) -> Option<bool> {
    let meal = meals.iter_mut().find(|m| m.id == id)?;
    meal.completed = !meal.completed;
    Some(meal.completed)
}
