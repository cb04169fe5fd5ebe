//! sparta - Sparta Fitness student and trainer companion
//!
//! Treinos, dieta e alunos direto do terminal.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use clap::{Parser, Subcommand, ValueEnum};

use sparta::context::{SpartaContext, UserRole};
use sparta::db::Database;
use sparta::diet::{self, DEFAULT_TARGETS, MacroTotals, percent_of};
use sparta::history::calendar_grid;
use sparta::reviews::{REVIEWS, ReviewStats, ReviewStatus, filter_reviews};
use sparta::roster::{PLANS, STUDENTS, StudentFilter, StudentStatus};
use sparta::tracker::{WorkoutProgressTracker, format_clock};
use sparta::tui::{App, Screen};
use sparta::workout::WorkoutPlan;

#[derive(Parser)]
#[command(name = "sparta")]
#[command(author, version, about = "Sparta Fitness - workout tracker")]
struct Cli {
    /// SQLite file holding session slots and history
    #[arg(long, global = true, env = "SPARTA_DB", default_value = "sparta.db")]
    db: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "SPARTA_LOG", default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Student,
    Professional,
    Admin,
}

impl From<RoleArg> for UserRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Student => UserRole::Student,
            RoleArg::Professional => UserRole::Professional,
            RoleArg::Admin => UserRole::Admin,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Pick a profile (dev login, no password)
    Login {
        role: RoleArg,

        #[arg(short, long, default_value = "Pedro Iago")]
        name: String,
    },

    /// Forget the signed-in user
    Logout,

    /// Show the dashboard of the signed-in user
    Whoami,

    /// Workout overview with the exercise checklist (TUI)
    Overview,

    /// Run the workout one exercise at a time (TUI)
    Start {
        /// Exercise position to start from (clamped to the plan)
        #[arg(long, allow_negative_numbers = true)]
        at: Option<i64>,

        /// Start the stopwatch right away
        #[arg(long)]
        timer: bool,
    },

    /// Mark or unmark one exercise as done
    Toggle {
        /// Exercise id (e.g. "ex-2")
        exercise_id: String,
    },

    /// Load a workout plan (JSON) as the current workout
    Assign { file: PathBuf },

    /// Training history and streak
    History {
        /// Number of recent workouts to show
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Today's meals and macros
    Diet {
        /// Meal id to mark or unmark as eaten
        #[arg(short, long)]
        toggle: Option<String>,
    },

    /// Trainer's student list
    Students {
        /// Match name or email
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long)]
        status: Option<StudentStatus>,

        /// Plan name (Básico, Premium)
        #[arg(long)]
        plan: Option<String>,

        /// Workouts per week
        #[arg(short, long)]
        frequency: Option<u8>,

        /// Sort by name
        #[arg(long)]
        sort: bool,
    },

    /// Workouts waiting for the trainer's review
    Reviews {
        #[arg(long)]
        status: Option<ReviewStatus>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    let db = Database::open(&cli.db)
        .with_context(|| format!("opening {}", cli.db.display()))?;
    let mut ctx = SpartaContext::load(&db)?;

    match cli.command {
        Some(Commands::Login { role, name }) => {
            let user = ctx.login(&name, role.into())?;
            println!("Bem-vindo, {} ({})", user.name, user.role);
        }

        Some(Commands::Logout) => {
            ctx.logout()?;
            println!("Sessão encerrada.");
        }

        Some(Commands::Whoami) => print_dashboard(&ctx)?,

        Some(Commands::Overview) | None => {
            ctx.require_role(UserRole::Student)?;
            if let Some(summary) = App::new(ctx, Screen::Overview, None, false).run()? {
                println!("Treino concluído: {} em {}", summary.workout_name, format_clock(summary.elapsed_secs));
                print_dashboard(&SpartaContext::load(&db)?)?;
            }
        }

        Some(Commands::Start { at, timer }) => {
            ctx.require_role(UserRole::Student)?;
            if let Some(summary) = App::new(ctx, Screen::Active, at, timer).run()? {
                println!("Treino concluído: {} em {}", summary.workout_name, format_clock(summary.elapsed_secs));
                print_dashboard(&SpartaContext::load(&db)?)?;
            }
        }

        Some(Commands::Toggle { exercise_id }) => {
            ctx.require_role(UserRole::Student)?;
            let (plan, _) = ctx.resolve_workout();
            let mut tracker = WorkoutProgressTracker::initialize(plan, None, false, &db);
            let done = tracker.toggle_exercise_done(&exercise_id)?;

            println!("{} -> {}", exercise_id, if done { "concluído" } else { "pendente" });
            print_checklist(tracker.plan());
        }

        Some(Commands::Assign { file }) => {
            ctx.require_role(UserRole::Student)?;
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let plan: WorkoutPlan = serde_json::from_str(&json)
                .with_context(|| format!("parsing {}", file.display()))?;
            if plan.exercises.is_empty() {
                println!("Aviso: o treino {} não tem exercícios.", plan.name);
            }
            let name = plan.name.clone();
            ctx.assign_workout(plan)?;
            println!("Treino atual: {}", name);
        }

        Some(Commands::History { limit }) => {
            ctx.require_role(UserRole::Student)?;
            print_history(&ctx, limit)?;
        }

        Some(Commands::Diet { toggle }) => {
            ctx.require_role(UserRole::Student)?;
            let mut meals = diet::load_meals(&db)?;
            if let Some(id) = toggle {
                match diet::toggle_meal(&mut meals, &id) {
                    Some(_) => diet::save_meals(&db, &meals)?,
                    None => println!("Refeição {} não encontrada", id),
                }
            }

            let totals = MacroTotals::from_meals(&meals);
            let targets = DEFAULT_TARGETS;
            println!("Resumo de Macros");
            println!("{:-<40}", "");
            println!("KCAL {:>5}/{} ({}%)", totals.calories, targets.calories, percent_of(totals.calories, targets.calories));
            println!("PROT {:>5}/{} g ({}%)", totals.protein, targets.protein, percent_of(totals.protein, targets.protein));
            println!("CARB {:>5}/{} g ({}%)", totals.carbs, targets.carbs, percent_of(totals.carbs, targets.carbs));
            println!("GORD {:>5}/{} g ({}%)", totals.fat, targets.fat, percent_of(totals.fat, targets.fat));
            println!();
            for meal in &meals {
                println!(
                    "[{}] {:4} {} | {:20} | {} kcal · {}",
                    if meal.completed { "x" } else { " " },
                    meal.id,
                    meal.time,
                    meal.name,
                    meal.calories,
                    if meal.completed { "Meta atingida" } else { "Pendente" }
                );
            }
        }

        Some(Commands::Students { search, status, plan, frequency, sort }) => {
            ctx.require_role(UserRole::Professional)?;
            if let Some(p) = &plan
                && !PLANS.contains(&p.as_str())
            {
                println!("Plano desconhecido: {} (planos: {})", p, PLANS.join(", "));
            }

            let filter = StudentFilter {
                search,
                status,
                plan,
                frequency,
                sort_alphabetical: sort,
            };
            let students = filter.apply(STUDENTS);

            println!("Meus Alunos ({})", students.len());
            println!("{:-<72}", "");
            for s in students {
                println!(
                    "{:18} | {:28} | {:8} | {:8} | {}x/sem | {}",
                    s.name,
                    s.email,
                    s.plan,
                    s.status.label(),
                    s.frequency,
                    s.last_workout
                );
            }
        }

        Some(Commands::Reviews { status }) => {
            ctx.require_role(UserRole::Professional)?;
            let reviews = filter_reviews(REVIEWS, status);

            println!("Revisões ({})", reviews.len());
            println!("{:-<72}", "");
            for r in reviews {
                println!(
                    "{} {:16} | {:22} | {:8} | {} · {}",
                    r.initials(),
                    r.student_name,
                    r.workout_name,
                    r.status.label(),
                    r.generated_by,
                    r.created_at
                );
                println!("   {}", r.description);
            }
        }
    }

    Ok(())
}

fn print_dashboard(ctx: &SpartaContext) -> Result<()> {
    let Some(user) = ctx.user() else {
        println!("Ninguém conectado. Use `sparta login student`.");
        return Ok(());
    };

    println!("Olá, {} ({})", user.name, user.role);
    match user.role {
        UserRole::Student => {}
        UserRole::Professional => {
            let stats = ReviewStats::from_reviews(REVIEWS);
            println!("Alunos: {}", stats.total_students);
            println!("Revisões pendentes: {}", stats.pending_reviews);
            println!("Treinos ativos: {}", stats.active_workouts);
            return Ok(());
        }
        UserRole::Admin => return Ok(()),
    }

    let history = ctx.history()?;
    let today = Local::now().date_naive();
    println!("Sequência: {} dias", history.streak(today));
    println!("Treinos no mês: {}", history.workouts_in_month(today.year(), today.month()));

    let (plan, _) = ctx.resolve_workout();
    println!(
        "Treino atual: {} ({}/{} exercícios, {} min)",
        plan.name,
        plan.completed_count(),
        plan.exercises.len(),
        plan.duration_min
    );
    Ok(())
}

fn print_checklist(plan: &WorkoutPlan) {
    println!("{} - {}/{}", plan.name, plan.completed_count(), plan.exercises.len());
    println!("{:-<60}", "");
    for ex in &plan.exercises {
        println!(
            "[{}] {:6} {:24} {}x{} {}",
            if ex.done { "x" } else { " " },
            ex.id,
            ex.name,
            ex.sets,
            ex.reps,
            ex.muscle_group.label()
        );
    }
}

fn print_history(ctx: &SpartaContext, limit: usize) -> Result<()> {
    let history = ctx.history()?;
    let today = Local::now().date_naive();
    let (year, month) = (today.year(), today.month());
    let marked = history.workout_days(year, month);

    println!("Histórico {}", today.format("%m/%Y"));
    println!("{:-<28}", "");
    println!("  D   S   T   Q   Q   S   S");
    for week in calendar_grid(year, month).chunks(7) {
        let line: String = week
            .iter()
            .map(|day| match day {
                Some(d) if marked.contains(d) => format!("[{:2}]", d),
                Some(d) => format!(" {:2} ", d),
                None => "    ".to_string(),
            })
            .collect();
        println!("{}", line);
    }

    println!();
    println!("Sequência: {} dias", history.streak(today));
    println!("Treinos no mês: {}", history.workouts_in_month(year, month));
    println!("Frequência: {:.1} treinos/semana", history.weekly_frequency());
    println!("Tempo total: {}", format_clock(history.total_elapsed_secs().max(0) as u64));

    if history.is_empty() {
        println!("\nNenhum treino concluído ainda.");
        return Ok(());
    }

    println!("\nAtividade recente:");
    for w in history.recent(limit) {
        println!(
            "{} | {:24} | {} exercícios | {}",
            w.date.with_timezone(&Local).format("%d/%m %H:%M"),
            w.workout_name,
            w.exercises,
            w.elapsed_secs.map(|s| format_clock(s as u64)).unwrap_or_else(|| "-".to_string())
        );
    }
    Ok(())
}
