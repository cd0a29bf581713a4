//! Terminal UI mode for watching the duel
//!
//! Runs the same training loop as headless mode, paced by the configured tick
//! rate, and draws the board and both agents' stats.
//!
//! # Controls
//!
//! - Space/P: Pause/unpause
//! - 1-4: Speed (1 = configured tick rate, each level doubles it)
//! - Q/Esc: Save and quit

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io::{Stderr, stderr},
    time::Duration,
};
use tokio::time::{Interval, interval};

use super::record_tick;
use crate::config::ArenaConfig;
use crate::input::{InputHandler, KeyAction, MAX_SPEED};
use crate::metrics::TrainingStats;
use crate::render::{AgentPanel, DuelView, Renderer};
use crate::rl::Arena;

/// Time between ticks at a given speed level
///
/// Level 1 runs at `tick_rate` Hz; every level above doubles the rate.
pub fn tick_interval(tick_rate: u32, speed: u8) -> Duration {
    let base = Duration::from_nanos(1_000_000_000 / u64::from(tick_rate.max(1)));
    let speed = speed.clamp(1, MAX_SPEED);
    base / (1u32 << (speed - 1))
}

/// Live duel in the terminal
pub struct WatchMode {
    arena: Arena,
    stats: [TrainingStats; 2],
    config: ArenaConfig,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    paused: bool,
    /// Speed level, 1 to `MAX_SPEED`
    speed: u8,
}

impl WatchMode {
    /// Build the arena and load any saved weights
    pub fn new(config: ArenaConfig) -> Result<Self> {
        let mut arena = Arena::from_config(&config).context("Failed to set up the arena")?;
        arena
            .load_agents(config.weight_paths())
            .context("Failed to load saved weights")?;

        let window = config.training.stats_window;

        Ok(Self {
            arena,
            stats: [TrainingStats::new(window), TrainingStats::new(window)],
            config,
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            paused: false,
            speed: 1,
        })
    }

    /// Run until the user quits, then save both agents
    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        let result = self.run_loop(&mut terminal).await;

        self.cleanup_terminal(&mut terminal)?;

        // Weights are kept even when the loop failed part way
        self.arena
            .save_agents(self.config.weight_paths())
            .context("Failed to save weights")?;

        for idx in 0..2 {
            log::info!(
                "{} after {} ticks: {}",
                self.arena.agent(idx).name(),
                self.arena.ticks(),
                self.stats[idx].format_summary()
            );
        }

        result
    }

    async fn run_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
        let mut event_stream = EventStream::new();

        let mut tick_timer = interval(self.current_interval());

        // Render at 30 FPS
        let mut render_timer = interval(Duration::from_millis(33));

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event, &mut tick_timer);
                    }
                }

                _ = tick_timer.tick() => {
                    if !self.paused {
                        let checkpointed = self.step()?;
                        if checkpointed {
                            // Saving logs to stderr underneath the UI
                            terminal.clear().context("Failed to clear terminal")?;
                        }
                    }
                }

                _ = render_timer.tick() => {
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.view());
                    }).context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Advance one tick; returns whether a checkpoint was written
    fn step(&mut self) -> Result<bool> {
        let outcome = self.arena.tick().context("Tick failed")?;
        record_tick(&mut self.stats, &self.arena, &outcome);

        let checkpoint_frequency = self.config.training.checkpoint_frequency;
        if checkpoint_frequency > 0 && outcome.tick % checkpoint_frequency == 0 {
            self.arena
                .save_agents(self.config.weight_paths())
                .context("Failed to save checkpoint")?;
            return Ok(true);
        }
        Ok(false)
    }

    fn handle_event(&mut self, event: Event, tick_timer: &mut Interval) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }

        match self.input_handler.handle_key_event(key) {
            KeyAction::TogglePause => self.paused = !self.paused,
            KeyAction::SetSpeed(level) => {
                self.speed = level.clamp(1, MAX_SPEED);
                tick_timer.reset_after(self.current_interval());
            }
            KeyAction::Quit => self.should_quit = true,
            KeyAction::None => {}
        }
    }

    fn current_interval(&self) -> Duration {
        tick_interval(self.arena.game_config().tick_rate, self.speed)
    }

    fn view(&self) -> DuelView<'_> {
        let panel = |idx: usize| {
            let agent = self.arena.agent(idx);
            AgentPanel {
                name: agent.name(),
                epsilon: agent.epsilon(),
                stats: &self.stats[idx],
            }
        };

        DuelView {
            board: self.arena.board(),
            agents: [panel(0), panel(1)],
            tick: self.arena.ticks(),
            paused: self.paused,
            speed: self.speed,
        }
    }

    fn cleanup_terminal(&mut self, terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameConfig;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use tempfile::TempDir;

    fn test_mode(dir: &TempDir) -> WatchMode {
        let mut config = ArenaConfig {
            game: GameConfig::small(),
            seed: Some(5),
            ..ArenaConfig::default()
        };
        config.training.checkpoint_frequency = 3;
        config.training.agent1_weights = dir.path().join("better");
        config.training.agent2_weights = dir.path().join("worse");
        WatchMode::new(config).unwrap()
    }

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_tick_interval() {
        assert_eq!(tick_interval(10, 1), Duration::from_millis(100));
        assert_eq!(tick_interval(10, 2), Duration::from_millis(50));
        assert_eq!(tick_interval(10, 4), Duration::from_micros(12_500));
        // Out of range levels clamp
        assert_eq!(tick_interval(10, 0), Duration::from_millis(100));
        assert_eq!(tick_interval(10, 9), tick_interval(10, MAX_SPEED));
    }

    #[tokio::test]
    async fn test_keys_change_state() {
        let dir = TempDir::new().unwrap();
        let mut mode = test_mode(&dir);
        let mut tick_timer = interval(mode.current_interval());

        mode.handle_event(press(KeyCode::Char(' ')), &mut tick_timer);
        assert!(mode.paused);
        mode.handle_event(press(KeyCode::Char(' ')), &mut tick_timer);
        assert!(!mode.paused);

        mode.handle_event(press(KeyCode::Char('3')), &mut tick_timer);
        assert_eq!(mode.speed, 3);
        assert_eq!(mode.current_interval(), Duration::from_millis(25));

        mode.handle_event(press(KeyCode::Char('q')), &mut tick_timer);
        assert!(mode.should_quit);
    }

    #[test]
    fn test_step_writes_checkpoints() {
        let dir = TempDir::new().unwrap();
        let mut mode = test_mode(&dir);

        assert!(!mode.step().unwrap());
        assert!(!mode.step().unwrap());
        assert!(mode.step().unwrap());
        assert!(dir.path().join("better.mpk").exists());
        assert!(dir.path().join("worse.mpk").exists());

        let view = mode.view();
        assert_eq!(view.tick, 3);
        assert_eq!(view.agents[0].name, "better");
        assert_eq!(view.agents[1].stats.total_steps(), 3);
    }
}
