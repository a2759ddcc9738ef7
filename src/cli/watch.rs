//! Watch command implementation - Interactive TUI viewer.

// The TUI uses intentional casts for display coordinates and timing
#![allow(
    clippy::similar_names,
    clippy::needless_pass_by_value,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

use std::io::stdout;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use petri::game::{CellKind, Dir, Entity, Player, Point, Protein, ProteinCounts, TURN_LIMIT};
use petri::replay::{Recording, ReplayEngine, SeatSpec};
use petri::runner::{MatchConfig, run_match};

use super::CliError;

/// Execute the watch command.
///
/// # Errors
///
/// Returns an error if the match fails to run or the TUI fails.
pub(crate) fn execute(
    one: &str,
    two: &str,
    board: &str,
    seed: Option<u64>,
    speed: u64,
) -> Result<(), CliError> {
    let map_text = super::load_board_text(board)?;
    let seed = super::pick_seed(seed);
    let strategies = super::build_seats(one, two, seed)?;

    // Resolve the whole match up front; the viewer replays the recording
    // and can step in both directions.
    let config = MatchConfig::default();
    let result = run_match(&map_text, strategies, &config)?;
    let seats = [
        SeatSpec::new(one, seed),
        SeatSpec::new(two, seed.wrapping_add(1)),
    ];
    let recording = Recording::from_match(map_text, seats, &config, &result);
    let engine = ReplayEngine::new(recording)?;

    run_tui(engine, [one.to_owned(), two.to_owned()], speed)
}

/// App state for the TUI.
struct App {
    engine: ReplayEngine,
    names: [String; 2],
    paused: bool,
    speed_ms: u64,
    last_step: Instant,
}

impl App {
    fn new(engine: ReplayEngine, names: [String; 2], speed_ms: u64) -> Self {
        Self {
            engine,
            names,
            paused: true, // Start paused
            speed_ms,
            last_step: Instant::now(),
        }
    }

    fn step_forward(&mut self) {
        if !self.engine.is_over() {
            let _ = self.engine.step_forward();
            self.last_step = Instant::now();
        }
    }

    fn step_backward(&mut self) {
        let _ = self.engine.step_backward();
        self.last_step = Instant::now();
    }

    fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    fn increase_speed(&mut self) {
        self.speed_ms = self.speed_ms.saturating_sub(100).max(50);
    }

    fn decrease_speed(&mut self) {
        self.speed_ms = (self.speed_ms + 100).min(2000);
    }

    fn should_auto_step(&self) -> bool {
        !self.paused
            && !self.engine.is_over()
            && self.last_step.elapsed() >= Duration::from_millis(self.speed_ms)
    }
}

/// Drive the interactive viewer over a prepared replay.
///
/// # Errors
///
/// Returns an error if the terminal cannot be set up or drawn to.
pub(super) fn run_tui(
    engine: ReplayEngine,
    names: [String; 2],
    speed: u64,
) -> Result<(), CliError> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| CliError::new(e.to_string()))?;

    let app = App::new(engine, names, speed);
    let result = event_loop(&mut terminal, app);

    // Restore terminal even when the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    mut app: App,
) -> Result<(), CliError> {
    loop {
        // Draw
        terminal
            .draw(|f| ui(f, &app))
            .map_err(|e| CliError::new(e.to_string()))?;

        // Auto-step if needed
        if app.should_auto_step() {
            app.step_forward();
        }

        // Handle input with timeout
        if event::poll(Duration::from_millis(50)).map_err(|e| CliError::new(e.to_string()))?
            && let Event::Key(key) = event::read().map_err(|e| CliError::new(e.to_string()))?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char(' ') => app.toggle_pause(),
                KeyCode::Right | KeyCode::Char('l') => {
                    app.paused = true;
                    app.step_forward();
                }
                KeyCode::Left | KeyCode::Char('h') => {
                    app.paused = true;
                    app.step_backward();
                }
                KeyCode::Char('+' | '=') => app.increase_speed(),
                KeyCode::Char('-') => app.decrease_speed(),
                KeyCode::Char('r') => {
                    let _ = app.engine.goto_turn(0);
                    app.paused = true;
                }
                _ => {}
            }
        }
    }

    Ok(())
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Main content
            Constraint::Length(3), // Footer
        ])
        .split(f.area());

    // Header
    render_header(f, chunks[0], app);

    // Main content - board and stats
    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(chunks[1]);

    render_board(f, main_chunks[0], app);
    render_stats(f, main_chunks[1], app);

    // Footer
    render_footer(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let turn = app.engine.state().turn();

    let status = if app.engine.is_over() {
        "MATCH OVER"
    } else if app.paused {
        "PAUSED"
    } else {
        "RUNNING"
    };

    let title = format!(
        " Petri Match Viewer | Turn {}/{} | {} | Speed: {}ms ",
        turn, TURN_LIMIT, status, app.speed_ms
    );

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(header, area);
}

fn render_board(f: &mut Frame, area: Rect, app: &App) {
    let state = app.engine.state();

    let mut lines: Vec<Line> = Vec::new();

    // Each cell renders as two characters; show the part that fits
    let visible_width = ((area.width as usize).saturating_sub(4) / 2).min(state.width() as usize);
    let visible_height = (area.height as usize).saturating_sub(2).min(state.height() as usize);

    for y in 0..visible_height {
        let mut spans = Vec::new();
        for x in 0..visible_width {
            let point = Point::new(x as i32, y as i32);
            if let Some(cell) = state.get(point) {
                spans.push(cell_span(cell));
            } else {
                spans.push(Span::raw("  "));
            }
        }
        lines.push(Line::from(spans));
    }

    let board_widget =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Board "));

    f.render_widget(board_widget, area);
}

fn cell_span(cell: &Entity) -> Span<'static> {
    match cell.kind {
        CellKind::Empty => Span::styled(". ", Style::default().fg(Color::DarkGray)),
        CellKind::Wall => Span::styled("# ", Style::default().fg(Color::White)),
        CellKind::Protein(protein) => {
            let glyph = match protein {
                Protein::A => "a ",
                Protein::B => "b ",
                Protein::C => "c ",
                Protein::D => "d ",
            };
            Span::styled(glyph, Style::default().fg(Color::Green))
        }
        CellKind::Root
        | CellKind::Basic
        | CellKind::Harvester
        | CellKind::Tentacle
        | CellKind::Sporer => organ_span(cell),
    }
}

fn organ_span(cell: &Entity) -> Span<'static> {
    let glyph = match cell.kind {
        CellKind::Root => 'R',
        CellKind::Basic => 'B',
        CellKind::Harvester => 'H',
        CellKind::Tentacle => 'T',
        CellKind::Sporer => 'S',
        _ => '?',
    };
    let arrow = cell.facing.map_or(' ', facing_arrow);
    let color = cell.owner.map_or(Color::White, player_color);
    let mut style = Style::default().fg(color);
    if cell.kind == CellKind::Root {
        style = style.add_modifier(Modifier::BOLD);
    }
    Span::styled(format!("{glyph}{arrow}"), style)
}

const fn facing_arrow(dir: Dir) -> char {
    match dir {
        Dir::North => '^',
        Dir::East => '>',
        Dir::South => 'v',
        Dir::West => '<',
    }
}

fn render_stats(f: &mut Frame, area: Rect, app: &App) {
    let state = app.engine.state();
    let mut lines = Vec::new();

    lines.push(Line::from(""));

    for player in Player::ALL {
        let idx = player.index();
        let name = app.names[idx].as_str();
        let color = player_color(player);
        let cells = state.cell_count(player);

        let status = if cells == 0 { " [ELIMINATED]" } else { "" };

        lines.push(Line::from(vec![
            Span::styled(
                format!("Player {} ", idx + 1),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("({name}){status}")),
        ]));

        if cells > 0 {
            lines.push(Line::from(format!("  Cells: {cells}")));
            lines.push(Line::from(format!(
                "  Stock: {}",
                stock_text(&state.proteins(player))
            )));
            lines.push(Line::from(format!(
                "  Income: +{}/turn",
                state.gains(player).total()
            )));
        }
        lines.push(Line::from(""));
    }

    if let Some(verdict) = app.engine.verdict() {
        match verdict.winner {
            Some(winner) => lines.push(Line::from(Span::styled(
                format!("Winner: Player {}", winner.index() + 1),
                Style::default()
                    .fg(player_color(winner))
                    .add_modifier(Modifier::BOLD),
            ))),
            None => lines.push(Line::from(Span::styled(
                "Draw",
                Style::default().add_modifier(Modifier::BOLD),
            ))),
        }
        lines.push(Line::from(verdict.reason.to_string()));
    }

    let stats_widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Players "))
        .wrap(Wrap { trim: false });

    f.render_widget(stats_widget, area);
}

fn stock_text(counts: &ProteinCounts) -> String {
    counts
        .entries()
        .map(|(protein, amount)| format!("{}:{amount}", protein.token()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn player_color(player: Player) -> Color {
    match player {
        Player::One => Color::Red,
        Player::Two => Color::Blue,
    }
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let controls = if app.engine.is_over() {
        " [q] Quit  [r] Restart  [←/→] Step "
    } else {
        " [q] Quit  [Space] Pause  [←/→] Step  [+/-] Speed  [r] Restart "
    };

    let footer = Paragraph::new(controls)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, area);
}
