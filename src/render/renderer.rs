use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{Board, Position};
use crate::metrics::TrainingStats;

/// What occupies a grid cell, as drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Head(usize),
    Body(usize),
    Food,
    Empty,
}

/// Classify a cell; heads win over bodies, snakes win over food
pub fn cell_at(board: &Board, pos: Position) -> Cell {
    for (idx, snake) in board.snakes.iter().enumerate() {
        if snake.head() == pos {
            return Cell::Head(idx);
        }
    }
    for (idx, snake) in board.snakes.iter().enumerate() {
        if snake.collides_with_body(pos) {
            return Cell::Body(idx);
        }
    }
    if pos == board.food {
        Cell::Food
    } else {
        Cell::Empty
    }
}

/// Per-snake information shown beside the board
pub struct AgentPanel<'a> {
    pub name: &'a str,
    pub epsilon: f64,
    pub stats: &'a TrainingStats,
}

/// Read-only snapshot of everything a frame shows
pub struct DuelView<'a> {
    pub board: &'a Board,
    pub agents: [AgentPanel<'a>; 2],
    pub tick: u64,
    pub paused: bool,
    /// Speed level 1-4
    pub speed: u8,
}

const SNAKE_COLORS: [(Color, Color); 2] = [(Color::Cyan, Color::Green), (Color::Magenta, Color::Yellow)];

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, view: &DuelView) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(chunks[0], view);
        frame.render_widget(stats, chunks[0]);

        // Center the game grid horizontally
        let game_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        let grid = self.render_grid(game_area, view);
        frame.render_widget(grid, game_area);

        let controls = self.render_controls(chunks[2], view);
        frame.render_widget(controls, chunks[2]);
    }

    fn render_grid(&self, _area: Rect, view: &DuelView) -> Paragraph<'_> {
        let board = view.board;
        let mut lines = Vec::with_capacity(board.grid_height);

        for y in 0..board.grid_height {
            let spans: Vec<Span> = (0..board.grid_width)
                .map(|x| match cell_at(board, Position::new(x as i32, y as i32)) {
                    Cell::Head(idx) => Span::styled(
                        "■ ",
                        Style::default()
                            .fg(SNAKE_COLORS[idx].0)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Cell::Body(idx) => Span::styled("□ ", Style::default().fg(SNAKE_COLORS[idx].1)),
                    Cell::Food => Span::styled(
                        "O ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                    Cell::Empty => Span::styled(". ", Style::default().fg(Color::DarkGray)),
                })
                .collect();

            lines.push(Line::from(spans));
        }

        let title = if view.paused {
            " Snake Duel (paused) "
        } else {
            " Snake Duel "
        };

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(title),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, _area: Rect, view: &DuelView) -> Paragraph<'_> {
        let mut lines: Vec<Line> = view
            .agents
            .iter()
            .zip(&view.board.snakes)
            .enumerate()
            .map(|(idx, (panel, snake))| {
                Line::from(vec![
                    Span::styled(
                        format!("{:<7}", panel.name),
                        Style::default()
                            .fg(SNAKE_COLORS[idx].0)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled("Score: ", Style::default().fg(Color::Yellow)),
                    Span::styled(
                        format!("{:<5}", snake.score),
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled("Eps: ", Style::default().fg(Color::Yellow)),
                    Span::styled(format!("{:.3}  ", panel.epsilon), Style::default().fg(Color::White)),
                    Span::styled("Deaths: ", Style::default().fg(Color::Yellow)),
                    Span::styled(
                        format!("{:<6}", panel.stats.total_episodes()),
                        Style::default().fg(Color::White),
                    ),
                    Span::styled("Loss: ", Style::default().fg(Color::Yellow)),
                    Span::styled(
                        format!("{:.4}", panel.stats.mean_loss()),
                        Style::default().fg(Color::White),
                    ),
                ])
            })
            .collect();

        lines.push(Line::from(vec![
            Span::styled("Tick: ", Style::default().fg(Color::Yellow)),
            Span::styled(view.tick.to_string(), Style::default().fg(Color::White)),
        ]));

        Paragraph::new(lines).alignment(Alignment::Center)
    }

    fn render_controls(&self, _area: Rect, view: &DuelView) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("Space", Style::default().fg(Color::Cyan)),
            Span::raw(if view.paused { " resume | " } else { " pause | " }),
            Span::styled("1-4", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" speed (now {}) | ", view.speed)),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" save and quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
