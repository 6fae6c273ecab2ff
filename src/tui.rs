//! Terminal user interface: the three-panel staging surface.
//!
//! Left panel: editable source input. Middle panel: the intermediate (TAC)
//! artifact. Right panel: the optimized artifact. One trigger key starts a
//! run; the pipeline executes on a tokio worker task and its outcome comes
//! back over a channel, so this draw loop stays the single display-update
//! point. At most one run is in flight; a trigger while busy is rejected
//! with a status notice.

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::io;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crate::config::Config;
use crate::error::PipelineError;
use crate::pipeline::{Pipeline, TransformOutcome};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// What one finished run delivers back to the draw loop.
type RunDelivery = Result<TransformOutcome, PipelineError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Panel {
    Source,
    Intermediate,
    Optimized,
}

impl Panel {
    fn next(self) -> Self {
        match self {
            Self::Source => Self::Intermediate,
            Self::Intermediate => Self::Optimized,
            Self::Optimized => Self::Source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RunState {
    Idle,
    Running,
    Succeeded {
        exit_code: i32,
        duration_ms: u64,
        finished_at: String,
    },
    Failed {
        message: String,
    },
}

/// TUI application state
pub struct TuiApp {
    editor: Editor,
    tac_text: String,
    optimized_text: String,
    focus: Panel,
    run_state: RunState,
    /// Transient one-line notice (e.g. a rejected trigger)
    notice: Option<String>,
    tac_scroll: u16,
    optimized_scroll: u16,
}

impl TuiApp {
    fn new(preload: Option<String>) -> Self {
        Self {
            editor: Editor::new(preload),
            tac_text: String::new(),
            optimized_text: String::new(),
            focus: Panel::Source,
            run_state: RunState::Idle,
            notice: None,
            tac_scroll: 0,
            optimized_scroll: 0,
        }
    }

    fn busy(&self) -> bool {
        matches!(self.run_state, RunState::Running)
    }

    /// Snapshot the source for a new run, or reject while one is in flight.
    fn begin_run(&mut self) -> Option<String> {
        if self.busy() {
            self.notice = Some("a run is already in progress".to_string());
            return None;
        }
        self.notice = None;
        self.run_state = RunState::Running;
        Some(self.editor.text())
    }

    /// Apply a finished run. Failures leave the output panels untouched.
    fn apply_delivery(&mut self, delivery: RunDelivery) {
        match delivery {
            Ok(outcome) => {
                self.tac_text = outcome.intermediate.display_text();
                self.optimized_text = outcome.optimized.display_text();
                self.tac_scroll = 0;
                self.optimized_scroll = 0;
                self.run_state = RunState::Succeeded {
                    exit_code: outcome.exit_code,
                    duration_ms: outcome.duration.as_millis() as u64,
                    finished_at: chrono::Local::now().format("%H:%M:%S").to_string(),
                };
            }
            Err(e) => {
                self.run_state = RunState::Failed {
                    message: condense(&e.display_for_user()),
                };
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match self.focus {
            Panel::Source => self.editor.handle_key(key),
            Panel::Intermediate => Self::scroll_key(&mut self.tac_scroll, key),
            Panel::Optimized => Self::scroll_key(&mut self.optimized_scroll, key),
        }
    }

    fn scroll_key(scroll: &mut u16, key: KeyEvent) {
        match key.code {
            KeyCode::Up => *scroll = scroll.saturating_sub(1),
            KeyCode::Down => *scroll = scroll.saturating_add(1),
            KeyCode::PageUp => *scroll = scroll.saturating_sub(10),
            KeyCode::PageDown => *scroll = scroll.saturating_add(10),
            KeyCode::Home => *scroll = 0,
            _ => {}
        }
    }
}

/// Collapse a possibly multi-line error into one status line.
fn condense(message: &str) -> String {
    let mut lines = message.lines().filter(|l| !l.trim().is_empty());
    let first = lines.next().unwrap_or_default().to_string();
    if lines.next().is_some() {
        format!("{first} …")
    } else {
        first
    }
}

/// Minimal multi-line editor for the source panel.
struct Editor {
    lines: Vec<String>,
    row: usize,
    /// Cursor column, counted in characters.
    col: usize,
}

impl Editor {
    fn new(preload: Option<String>) -> Self {
        let lines = match preload {
            Some(text) => {
                let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
                if lines.is_empty() {
                    lines.push(String::new());
                }
                lines
            }
            None => vec![String::new()],
        };
        Self {
            lines,
            row: 0,
            col: 0,
        }
    }

    fn text(&self) -> String {
        self.lines.join("\n")
    }

    fn current_line_chars(&self) -> usize {
        self.lines[self.row].chars().count()
    }

    fn byte_index(&self, col: usize) -> usize {
        self.lines[self.row]
            .char_indices()
            .nth(col)
            .map_or(self.lines[self.row].len(), |(i, _)| i)
    }

    fn insert_char(&mut self, c: char) {
        let idx = self.byte_index(self.col);
        self.lines[self.row].insert(idx, c);
        self.col += 1;
    }

    fn newline(&mut self) {
        let idx = self.byte_index(self.col);
        let rest = self.lines[self.row].split_off(idx);
        self.lines.insert(self.row + 1, rest);
        self.row += 1;
        self.col = 0;
    }

    fn backspace(&mut self) {
        if self.col > 0 {
            self.col -= 1;
            let idx = self.byte_index(self.col);
            self.lines[self.row].remove(idx);
        } else if self.row > 0 {
            let removed = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.current_line_chars();
            self.lines[self.row].push_str(&removed);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                self.insert_char(c);
            }
            KeyCode::Enter => self.newline(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Left => {
                if self.col > 0 {
                    self.col -= 1;
                } else if self.row > 0 {
                    self.row -= 1;
                    self.col = self.current_line_chars();
                }
            }
            KeyCode::Right => {
                if self.col < self.current_line_chars() {
                    self.col += 1;
                } else if self.row + 1 < self.lines.len() {
                    self.row += 1;
                    self.col = 0;
                }
            }
            KeyCode::Up => {
                if self.row > 0 {
                    self.row -= 1;
                    self.col = self.col.min(self.current_line_chars());
                }
            }
            KeyCode::Down => {
                if self.row + 1 < self.lines.len() {
                    self.row += 1;
                    self.col = self.col.min(self.current_line_chars());
                }
            }
            KeyCode::Home => self.col = 0,
            KeyCode::End => self.col = self.current_line_chars(),
            _ => {}
        }
    }
}

/// Run the TUI application.
pub fn run_tui(config: Config, preload: Option<String>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let pipeline = Arc::new(Pipeline::from_config(&config));
    let (tx, rx) = mpsc::channel::<RunDelivery>();

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = TuiApp::new(preload);
    let engine_label = config.engine_program.to_string();

    let result = run_app(
        &mut terminal,
        &mut app,
        &runtime,
        &pipeline,
        &tx,
        &rx,
        &engine_label,
    );

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main application loop
#[allow(clippy::too_many_arguments)]
fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut TuiApp,
    runtime: &tokio::runtime::Runtime,
    pipeline: &Arc<Pipeline>,
    tx: &mpsc::Sender<RunDelivery>,
    rx: &mpsc::Receiver<RunDelivery>,
    engine_label: &str,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        while let Ok(delivery) = rx.try_recv() {
            app.apply_delivery(delivery);
        }

        terminal.draw(|f| ui(f, app, engine_label))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
            match key.code {
                KeyCode::Esc => return Ok(()),
                KeyCode::Char('c' | 'q') if ctrl => return Ok(()),
                KeyCode::Char('r') if ctrl => trigger_run(app, runtime, pipeline, tx),
                KeyCode::F(5) => trigger_run(app, runtime, pipeline, tx),
                KeyCode::Tab => app.focus = app.focus.next(),
                _ => app.handle_key(key),
            }
        }
    }
}

/// Start a pipeline run on the worker runtime, unless one is in flight.
fn trigger_run(
    app: &mut TuiApp,
    runtime: &tokio::runtime::Runtime,
    pipeline: &Arc<Pipeline>,
    tx: &mpsc::Sender<RunDelivery>,
) {
    if let Some(source) = app.begin_run() {
        let pipeline = Arc::clone(pipeline);
        let tx = tx.clone();
        runtime.spawn(async move {
            let _ = tx.send(pipeline.run(&source).await);
        });
    }
}

/// Render the UI
fn ui(f: &mut Frame, app: &TuiApp, engine_label: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Panels
            Constraint::Length(3), // Status
            Constraint::Length(3), // Footer/help
        ])
        .split(f.area());

    render_header(f, engine_label, chunks[0]);
    render_panels(f, app, chunks[1]);
    render_status(f, app, chunks[2]);
    render_footer(f, chunks[3]);
}

fn render_header(f: &mut Frame, engine_label: &str, area: Rect) {
    let header = Paragraph::new(vec![Line::from(vec![
        Span::styled(
            "optiview ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("engine: "),
        Span::styled(engine_label, Style::default().fg(Color::Yellow)),
    ])])
    .block(Block::default().borders(Borders::ALL).title(" Optimizer "));
    f.render_widget(header, area);
}

fn render_panels(f: &mut Frame, app: &TuiApp, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    render_source(f, app, columns[0]);
    render_output(
        f,
        " TAC Code ",
        &app.tac_text,
        app.focus == Panel::Intermediate,
        app.tac_scroll,
        columns[1],
    );
    render_output(
        f,
        " Optimized Code ",
        &app.optimized_text,
        app.focus == Panel::Optimized,
        app.optimized_scroll,
        columns[2],
    );
}

fn panel_block(title: &str, focused: bool) -> Block<'_> {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title)
}

fn render_source(f: &mut Frame, app: &TuiApp, area: Rect) {
    let focused = app.focus == Panel::Source;
    let editor = &app.editor;

    let visible = area.height.saturating_sub(2) as usize;
    let scroll = editor.row.saturating_sub(visible.saturating_sub(1).max(1));

    let lines: Vec<Line> = editor
        .lines
        .iter()
        .enumerate()
        .map(|(row, line)| {
            if focused && row == editor.row {
                cursor_line(line, editor.col)
            } else {
                Line::from(line.as_str())
            }
        })
        .collect();

    let paragraph = Paragraph::new(lines)
        .block(panel_block(" Input Code ", focused))
        .scroll((scroll as u16, 0));
    f.render_widget(paragraph, area);
}

/// Build a line with the cursor cell rendered in reverse video.
fn cursor_line(line: &str, col: usize) -> Line<'static> {
    let chars: Vec<char> = line.chars().collect();
    let before: String = chars.iter().take(col).collect();
    let cursor: String = chars.get(col).map_or(" ".to_string(), |c| c.to_string());
    let after: String = chars.iter().skip(col + 1).collect();

    Line::from(vec![
        Span::raw(before),
        Span::styled(cursor, Style::default().add_modifier(Modifier::REVERSED)),
        Span::raw(after),
    ])
}

fn render_output(
    f: &mut Frame,
    title: &str,
    text: &str,
    focused: bool,
    scroll: u16,
    area: Rect,
) {
    let paragraph = Paragraph::new(text)
        .block(panel_block(title, focused))
        .scroll((scroll, 0));
    f.render_widget(paragraph, area);
}

fn render_status(f: &mut Frame, app: &TuiApp, area: Rect) {
    let line = if let Some(notice) = &app.notice {
        Line::from(Span::styled(
            notice.as_str(),
            Style::default().fg(Color::Yellow),
        ))
    } else {
        match &app.run_state {
            RunState::Idle => Line::from(Span::styled(
                "ready",
                Style::default().fg(Color::DarkGray),
            )),
            RunState::Running => Line::from(Span::styled(
                "optimizing…",
                Style::default().fg(Color::Yellow),
            )),
            RunState::Succeeded {
                exit_code,
                duration_ms,
                finished_at,
            } => Line::from(vec![
                Span::styled("✓ ", Style::default().fg(Color::Green)),
                Span::raw(format!(
                    "done in {duration_ms} ms (exit {exit_code}) at {finished_at}"
                )),
            ]),
            RunState::Failed { message } => Line::from(vec![
                Span::styled("✗ ", Style::default().fg(Color::Red)),
                Span::styled(message.as_str(), Style::default().fg(Color::Red)),
            ]),
        }
    };

    let status = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(" Status "));
    f.render_widget(status, area);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let footer = Paragraph::new("Ctrl-R/F5: Optimize  Tab: Switch panel  ↑↓: Move/Scroll  Esc: Quit")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(" Help "));
    f.render_widget(footer, area);
}
