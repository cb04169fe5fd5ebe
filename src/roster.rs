//! Student roster for trainers - search and filters

use std::cmp::Ordering;

use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StudentStatus {
    Active,
    Inactive,
    Pending,
}

impl StudentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            StudentStatus::Active => "Ativo",
            StudentStatus::Inactive => "Inativo",
            StudentStatus::Pending => "Pendente",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Student {
    pub id: &'static str,
    pub name: &'static str,
    pub email: &'static str,
    pub plan: &'static str, // Básico / Premium
    pub status: StudentStatus,
    pub frequency: u8, // workouts per week
    pub last_workout: &'static str,
    pub goal: &'static str,
}

pub const PLANS: &[&str] = &["Básico", "Premium"];

pub const STUDENTS: &[Student] = &[
    Student {
        id: "1",
        name: "Carlos Silva",
        email: "carlos.silva@email.com",
        plan: "Premium",
        status: StudentStatus::Active,
        frequency: 4,
        last_workout: "Hoje",
        goal: "Hipertrofia",
    },
    Student {
        id: "2",
        name: "Ana Santos",
        email: "ana.santos@email.com",
        plan: "Básico",
        status: StudentStatus::Active,
        frequency: 3,
        last_workout: "Ontem",
        goal: "Emagrecimento",
    },
    Student {
        id: "3",
        name: "João Pedro",
        email: "joao.pedro@email.com",
        plan: "Premium",
        status: StudentStatus::Active,
        frequency: 5,
        last_workout: "Há 2 dias",
        goal: "Força",
    },
    Student {
        id: "4",
        name: "Marina Costa",
        email: "marina.costa@email.com",
        plan: "Premium",
        status: StudentStatus::Active,
        frequency: 4,
        last_workout: "Há 3 dias",
        goal: "Condicionamento",
    },
    Student {
        id: "5",
        name: "Rafael Oliveira",
        email: "rafael.oliveira@email.com",
        plan: "Básico",
        status: StudentStatus::Pending,
        frequency: 2,
        last_workout: "—",
        goal: "Hipertrofia",
    },
    Student {
        id: "6",
        name: "Fernanda Lima",
        email: "fernanda.lima@email.com",
        plan: "Básico",
        status: StudentStatus::Inactive,
        frequency: 3,
        last_workout: "Há 1 semana",
        goal: "Emagrecimento",
    },
];

/// All criteria are optional; empty filter returns everyone
#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    pub search: Option<String>,
    pub status: Option<StudentStatus>,
    pub plan: Option<String>,
    pub frequency: Option<u8>,
    pub sort_alphabetical: bool,
}

impl StudentFilter {
    pub fn matches(&self, student: &Student) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !student.name.to_lowercase().contains(&needle)
                && !student.email.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if self.status.is_some_and(|s| s != student.status) {
            return false;
        }
        if self.plan.as_deref().is_some_and(|p| p != student.plan) {
            return false;
        }
        if self.frequency.is_some_and(|f| f != student.frequency) {
            return false;
        }
        true
    }

    pub fn apply<'a>(&self, students: &'a [Student]) -> Vec<&'a Student> {
        let mut list: Vec<_> = students.iter().filter(|s| self.matches(s)).collect();
        if self.sort_alphabetical {
            list.sort_by(|a, b| compare_names(a.name, b.name));
        }
        list
    }
}

/// pt-BR style: case and accents only break ties
fn compare_names(a: &str, b: &str) -> Ordering {
    sort_key(a)
        .cmp(&sort_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
}

fn sort_key(name: &str) -> String {
    name.to_lowercase().chars().map(strip_accent).collect()
}

fn strip_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        _ => c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&Student]) -> Vec<&'static str> {
        list.iter().map(|s| s.name).collect()
    }

    #[test]
    fn test_empty_filter_keeps_order() {
        let list = StudentFilter::default().apply(STUDENTS);
        assert_eq!(list.len(), STUDENTS.len());
        assert_eq!(list[0].name, "Carlos Silva");
    }

    #[test]
    fn test_search_name_or_email() {
        let filter = StudentFilter {
            search: Some("SANTOS".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&filter.apply(STUDENTS)), vec!["Ana Santos"]);

        let filter = StudentFilter {
            search: Some("lima@".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&filter.apply(STUDENTS)), vec!["Fernanda Lima"]);
    }

    #[test]
    fn test_combined_filters() {
        let filter = StudentFilter {
            status: Some(StudentStatus::Active),
            plan: Some("Premium".to_string()),
            frequency: Some(4),
            ..Default::default()
        };
        assert_eq!(names(&filter.apply(STUDENTS)), vec!["Carlos Silva", "Marina Costa"]);

        let filter = StudentFilter {
            status: Some(StudentStatus::Pending),
            plan: Some("Premium".to_string()),
            ..Default::default()
        };
        assert!(filter.apply(STUDENTS).is_empty());
    }

    #[test]
    fn test_alphabetical_sort() {
        let filter = StudentFilter {
            plan: Some("Básico".to_string()),
            sort_alphabetical: true,
            ..Default::default()
        };
        assert_eq!(
            names(&filter.apply(STUDENTS)),
            vec!["Ana Santos", "Fernanda Lima", "Rafael Oliveira"]
        );
    }

    #[test]
    fn test_sort_ignores_accents() {
        let base = &STUDENTS[0];
        let roster = [
            Student { id: "a", name: "Zé Carlos", ..base.clone() },
            Student { id: "b", name: "Ângela Souza", ..base.clone() },
            Student { id: "c", name: "Érica Lopes", ..base.clone() },
            Student { id: "d", name: "bruno Dias", ..base.clone() },
        ];
        let filter = StudentFilter {
            sort_alphabetical: true,
            ..Default::default()
        };
        assert_eq!(
            names(&filter.apply(&roster)),
            vec!["Ângela Souza", "bruno Dias", "Érica Lopes", "Zé Carlos"]
        );
    }
}
