//! TUI module - workout overview and active workout screens

use std::io::{Stdout, stdout};

use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Wrap},
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::context::{PlanSource, SpartaContext};
use crate::db::Database;
use crate::tracker::{
    ClockTick, Progress, SessionClock, TrackerError, UPCOMING_PREVIEW, WorkoutProgressTracker,
    WorkoutSummary, format_clock,
};

type Tui = Terminal<CrosstermBackend<Stdout>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Checklist of the whole plan
    Overview,
    /// One exercise at a time
    Active,
}

/// App state for TUI
pub struct App<'a> {
    ctx: SpartaContext<'a>,
    tracker: WorkoutProgressTracker<&'a Database>,
    source: PlanSource,
    screen: Screen,
    list_state: ListState,
    clock: Option<SessionClock>,
    tick_tx: UnboundedSender<ClockTick>,
    tick_rx: UnboundedReceiver<ClockTick>,
    finished: Option<WorkoutSummary>,
    should_quit: bool,
}

impl<'a> App<'a> {
    pub fn new(ctx: SpartaContext<'a>, screen: Screen, start_at: Option<i64>, start_timer: bool) -> Self {
        let (plan, source) = ctx.resolve_workout();
        let tracker = WorkoutProgressTracker::initialize(plan, start_at, start_timer, ctx.db());
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();

        let mut list_state = ListState::default();
        list_state.select(tracker.session().active_index());

        let mut app = Self {
            ctx,
            tracker,
            source,
            screen,
            list_state,
            clock: None,
            tick_tx,
            tick_rx,
            finished: None,
            should_quit: false,
        };
        app.sync_clock();
        app
    }

    /// Run the TUI application. Returns the summary if the workout was finished.
    pub fn run(mut self) -> Result<Option<WorkoutSummary>> {
        let mut terminal = TerminalGuard::init()?;

        while !self.should_quit {
            terminal.tui.draw(|frame| self.render(frame))?;
            self.handle_events()?;
            self.drain_ticks();
        }

        // navigating away releases the timer
        self.clock = None;
        Ok(self.finished)
    }

    /// Keep a clock alive exactly while the session timer runs
    fn sync_clock(&mut self) {
        match (self.tracker.session().is_running(), self.clock.is_some()) {
            (true, false) => self.clock = Some(SessionClock::start(self.tick_tx.clone())),
            (false, true) => self.clock = None,
            _ => {}
        }
    }

    fn drain_ticks(&mut self) {
        while self.tick_rx.try_recv().is_ok() {
            self.tracker.tick();
        }
    }

    fn toggle_timer(&mut self) {
        if self.tracker.session().is_running() {
            self.tracker.stop_timer();
        } else {
            self.tracker.start_timer();
        }
        self.sync_clock();
    }

    /// Open the linear flow at `index`, timer on
    fn start_active(&mut self, index: usize) {
        let plan = self.tracker.plan().clone();
        self.clock = None;
        self.tracker = WorkoutProgressTracker::initialize(plan, Some(index as i64), true, self.ctx.db());
        debug!("active workout from exercise {}", index);
        self.screen = Screen::Active;
        self.sync_clock();
    }

    fn back_to_overview(&mut self) {
        self.tracker.stop_timer();
        self.sync_clock();
        self.list_state.select(self.tracker.session().active_index().or(Some(0)));
        self.screen = Screen::Overview;
    }

    fn complete_current(&mut self) {
        if let Progress::Finished { .. } = self.tracker.advance(&mut self.ctx) {
            self.tracker.stop_timer();
            self.sync_clock();
            self.finished = Some(self.tracker.summary());
            self.should_quit = true;
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        match self.screen {
            Screen::Overview => self.render_overview(frame),
            Screen::Active => self.render_active(frame),
        }
    }

    fn header(&self) -> Paragraph<'static> {
        let session = self.tracker.session();
        let clock = if session.is_running() {
            format!("⏱ {}", format_clock(session.elapsed_secs))
        } else {
            String::new()
        };
        let title = format!("SPARTA  {}", self.tracker.plan().title().to_uppercase());

        Paragraph::new(Line::from(vec![
            Span::styled(title, Style::default().fg(Color::Yellow).bold()),
            Span::raw("   "),
            Span::styled(clock, Style::default().fg(Color::Cyan)),
        ]))
        .block(Block::default().borders(Borders::ALL))
    }

    fn render_overview(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Min(6),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(frame.area());

        frame.render_widget(self.header(), chunks[0]);

        let plan = self.tracker.plan();
        let source = match self.source {
            PlanSource::Assigned => "atribuído pelo treinador",
            PlanSource::Snapshot => "retomado",
            PlanSource::Demo => "demonstração",
        };
        let info = Paragraph::new(vec![
            Line::from(Span::styled(plan.name.clone(), Style::default().bold())),
            Line::from(format!(
                "{} min · {} exercícios · {} séries · {}",
                plan.duration_min,
                plan.exercises.len(),
                plan.total_sets(),
                source
            )),
        ])
        .block(Block::default().borders(Borders::LEFT | Borders::RIGHT));
        frame.render_widget(info, chunks[1]);

        let items: Vec<ListItem> = plan
            .exercises
            .iter()
            .map(|ex| {
                let mark = if ex.done { "[x]" } else { "[ ]" };
                let mut text = format!(
                    "{} {:28} {}x{:8} {}",
                    mark,
                    ex.name,
                    ex.sets,
                    ex.reps,
                    ex.muscle_group.label()
                );
                if let Some(tech) = &ex.technique {
                    text.push_str(&format!("  [{}]", tech));
                }
                let style = if ex.done {
                    Style::default().fg(Color::DarkGray).crossed_out()
                } else {
                    Style::default()
                };
                ListItem::new(text).style(style)
            })
            .collect();

        if items.is_empty() {
            let empty = Paragraph::new("Sem exercícios neste treino.")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL).title("Sequência"));
            frame.render_widget(empty, chunks[2]);
        } else {
            let list = List::new(items)
                .block(Block::default().borders(Borders::ALL).title("Sequência"))
                .highlight_style(Style::default().fg(Color::Yellow).bold())
                .highlight_symbol("> ");
            frame.render_stateful_widget(list, chunks[2], &mut self.list_state);
        }

        let total = self.tracker.plan().exercises.len();
        let done = self.tracker.completed_count();
        let ratio = if total == 0 { 0.0 } else { done as f64 / total as f64 };
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL))
            .gauge_style(Style::default().fg(Color::Green))
            .ratio(ratio)
            .label(format!("{}/{} concluídos", done, total));
        frame.render_widget(gauge, chunks[3]);

        let footer = Paragraph::new("↑↓: mover | espaço: marcar | enter: iniciar aqui | s: iniciar | q: sair")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[4]);
    }

    fn render_active(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(7),
                Constraint::Length(UPCOMING_PREVIEW as u16 + 2),
                Constraint::Length(3),
            ])
            .split(frame.area());

        frame.render_widget(self.header(), chunks[0]);

        let current = match self.tracker.current_exercise() {
            Ok(ex) => {
                let mut lines = vec![
                    Line::from(""),
                    Line::from(vec![
                        Span::styled(format!("{} ", ex.reps), Style::default().bold()),
                        Span::styled(ex.name.to_uppercase(), Style::default().fg(Color::Yellow).bold()),
                    ]),
                    Line::from(format!("{} séries · {}", ex.sets, ex.muscle_group.label())),
                ];
                if let Some(tech) = &ex.technique {
                    lines.push(Line::from(Span::styled(
                        tech.clone(),
                        Style::default().fg(Color::Magenta),
                    )));
                }
                if let Some(equipment) = &ex.equipment {
                    lines.push(Line::from(format!("Equipamento: {}", equipment)));
                }
                Paragraph::new(lines)
            }
            Err(TrackerError::SessionFinished) => Paragraph::new("Treino concluído!"),
            Err(_) => Paragraph::new(vec![
                Line::from("Nenhum exercício nesta posição."),
                Line::from(Span::styled("esc: voltar ao treino", Style::default().fg(Color::Yellow))),
            ]),
        };
        frame.render_widget(
            current
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL)),
            chunks[1],
        );

        let next: Vec<ListItem> = self
            .tracker
            .upcoming(UPCOMING_PREVIEW)
            .iter()
            .map(|ex| ListItem::new(format!("{:32} {} reps", ex.name, ex.reps)))
            .collect();
        let next = List::new(next).block(Block::default().borders(Borders::ALL).title("Próximos exercícios"));
        frame.render_widget(next, chunks[2]);

        let footer = Paragraph::new("enter: concluído | t: cronômetro | esc: visão do treino | q: sair")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[3]);
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(std::time::Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match (self.screen, key.code) {
                (_, KeyCode::Char('q')) => self.should_quit = true,

                (Screen::Overview, KeyCode::Esc) => self.should_quit = true,
                (Screen::Overview, KeyCode::Up | KeyCode::Char('k')) => self.move_selection(-1),
                (Screen::Overview, KeyCode::Down | KeyCode::Char('j')) => self.move_selection(1),
                (Screen::Overview, KeyCode::Char(' ')) => {
                    if let Some(id) = self.selected_id() {
                        self.tracker.toggle_exercise_done(&id)?;
                    }
                }
                (Screen::Overview, KeyCode::Enter) => {
                    let index = self.list_state.selected().unwrap_or(0);
                    self.start_active(index);
                }
                (Screen::Overview, KeyCode::Char('s')) => self.start_active(0),

                (Screen::Active, KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('d')) => {
                    self.complete_current()
                }
                (Screen::Active, KeyCode::Char('t')) => self.toggle_timer(),
                (Screen::Active, KeyCode::Esc | KeyCode::Char('b')) => self.back_to_overview(),
                _ => {}
            }
        }
        Ok(())
    }

    fn move_selection(&mut self, delta: i64) {
        let len = self.tracker.plan().exercises.len();
        if len == 0 {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as i64;
        let next = (current + delta).clamp(0, len as i64 - 1);
        self.list_state.select(Some(next as usize));
    }

    fn selected_id(&self) -> Option<String> {
        let index = self.list_state.selected()?;
        self.tracker.plan().exercises.get(index).map(|e| e.id.clone())
    }
}

/// Raw mode + alternate screen, undone on drop
struct TerminalGuard {
    tui: Tui,
}

impl TerminalGuard {
    fn init() -> Result<Self> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        let tui = Terminal::new(CrosstermBackend::new(stdout()))?;
        Ok(Self { tui })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}
