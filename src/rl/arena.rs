//! The two-agent training loop
//!
//! One [`Arena::tick`] is a full synchronous step of the shared game:
//!
//! 1. Encode the state each snake sees
//! 2. Each agent picks a relative turn
//! 3. Both snakes move, then collisions are resolved on the moved bodies
//! 4. Snake 1 is settled (reward, reset on death, store, train), then snake 2.
//!    A snake that was already dead sits the tick out and is only reset
//! 5. Food is respawned if either snake ate it
//!
//! Rendering and pacing live outside; nothing here blocks or sleeps.

use std::path::Path;

use rand::{SeedableRng, rngs::StdRng};

use super::agent::{Agent, build_agent};
use super::buffer::Transition;
use super::observation::{State, encode};
use super::persistence;
use crate::config::ArenaConfig;
use crate::error::{ArenaError, Result};
use crate::game::{Board, CollisionType, Direction, GameConfig, GameEngine, Position, Turn};

/// What happened to one agent during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentStep {
    pub turn: Turn,
    pub reward: f32,
    /// The snake died and was put back at its start
    pub done: bool,
    pub ate_food: bool,
    pub collision: Option<CollisionType>,
    /// Minibatch loss, if a training step ran
    pub loss: Option<f32>,
    /// Length just before a death reset, current length otherwise
    pub length: usize,
}

/// Report for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// 1-based tick number
    pub tick: u64,
    /// `None` for a snake that was not alive when the tick started
    pub agents: [Option<AgentStep>; 2],
}

/// Two snakes, two learners, one board
pub struct Arena {
    engine: GameEngine,
    board: Board,
    agents: [Box<dyn Agent>; 2],
    starts: [(Position, Direction); 2],
    ticks: u64,
}

impl Arena {
    /// Start a fresh board with both snakes at their start cells
    pub fn new(mut engine: GameEngine, agents: [Box<dyn Agent>; 2]) -> Result<Self> {
        let board = engine.new_board()?;
        Ok(Self::with_board(engine, board, agents))
    }

    /// Continue from an existing board; deaths still reset to the engine's start cells
    pub fn with_board(engine: GameEngine, board: Board, agents: [Box<dyn Agent>; 2]) -> Self {
        let starts = engine.start_positions();
        Self {
            engine,
            board,
            agents,
            starts,
            ticks: 0,
        }
    }

    /// Build the engine and both agents from a run configuration
    ///
    /// With a seed, food placement and each agent's exploration get their own
    /// deterministic streams.
    pub fn from_config(config: &ArenaConfig) -> Result<Self> {
        config.validate()?;

        let (engine, rngs) = match config.seed {
            Some(seed) => (
                GameEngine::seeded(config.game.clone(), seed),
                [
                    StdRng::seed_from_u64(seed.wrapping_add(1)),
                    StdRng::seed_from_u64(seed.wrapping_add(2)),
                ],
            ),
            None => (
                GameEngine::new(config.game.clone()),
                [StdRng::from_entropy(), StdRng::from_entropy()],
            ),
        };

        let [rng1, rng2] = rngs;
        let agents = [
            build_agent("better", &config.agent1, rng1)?,
            build_agent("worse", &config.agent2, rng2)?,
        ];

        Self::new(engine, agents)
    }

    /// Advance the game by one tick and let both agents learn from it
    pub fn tick(&mut self) -> Result<TickOutcome> {
        let states: [State; 2] = [
            encode(&self.board.snakes[0], &self.board),
            encode(&self.board.snakes[1], &self.board),
        ];

        let mut turns: [Option<Turn>; 2] = [None; 2];
        for (idx, turn) in turns.iter_mut().enumerate() {
            if self.board.snakes[idx].alive {
                let action = self.agents[idx].select_action(&states[idx]);
                *turn = Some(Turn::from_index(action).ok_or(ArenaError::InvalidAction(action))?);
            }
        }

        let headings = [0, 1].map(|idx| {
            let current = self.board.snakes[idx].direction;
            turns[idx].map_or(current, |turn| current.turn(turn))
        });

        let ate = self.board.advance(headings);
        let collisions = self.board.detect_collisions();

        let mut steps = [None; 2];
        for idx in 0..2 {
            match turns[idx] {
                Some(turn) => {
                    steps[idx] = Some(self.settle(idx, turn, states[idx], ate[idx], collisions[idx]));
                }
                None => {
                    // Dead before the tick: revive without a transition to learn from
                    let (start, heading) = self.starts[idx];
                    self.board.snakes[idx].reset(start, heading);
                }
            }
        }

        if ate.iter().any(|&eaten| eaten) {
            self.board.food = self.engine.spawn_food(&self.board)?;
        }

        self.ticks += 1;

        Ok(TickOutcome {
            tick: self.ticks,
            agents: steps,
        })
    }

    /// Reward, reset, store and train for one agent
    fn settle(
        &mut self,
        idx: usize,
        turn: Turn,
        state: State,
        ate_food: bool,
        collision: Option<CollisionType>,
    ) -> AgentStep {
        let rewards = self.engine.config();
        let done = collision.is_some();
        let reward = if done {
            rewards.death_penalty
        } else if ate_food {
            rewards.food_reward
        } else {
            rewards.step_penalty
        };

        let snake = &mut self.board.snakes[idx];
        let length = snake.len();
        if let Some(cause) = collision {
            log::debug!(
                "{} died after {} ticks ({:?}), length {}, score {}",
                self.agents[idx].name(),
                self.ticks + 1,
                cause,
                length,
                snake.score
            );
            let (start, heading) = self.starts[idx];
            snake.reset(start, heading);
        }

        let next_state = encode(&self.board.snakes[idx], &self.board);
        let agent = &mut self.agents[idx];
        agent.store(Transition {
            state,
            action: turn.index(),
            reward,
            next_state,
            done,
        });
        let loss = agent.train_step();

        AgentStep {
            turn,
            reward,
            done,
            ate_food,
            collision,
            loss,
            length,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn agent(&self, idx: usize) -> &dyn Agent {
        self.agents[idx].as_ref()
    }

    pub fn game_config(&self) -> &GameConfig {
        self.engine.config()
    }

    /// Ticks run so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Save both agents' weights
    pub fn save_agents(&self, paths: [&Path; 2]) -> Result<()> {
        for (agent, path) in self.agents.iter().zip(paths) {
            agent.save(path)?;
            log::info!(
                "saved {} to {:?} ({} training steps)",
                agent.name(),
                persistence::weights_path(path),
                agent.training_steps()
            );
        }
        Ok(())
    }

    /// Load each agent's weights if a saved model exists
    ///
    /// Absent models are skipped. A model that exists but cannot be read is an error.
    /// Returns which agents were loaded.
    pub fn load_agents(&mut self, paths: [&Path; 2]) -> Result<[bool; 2]> {
        let mut loaded = [false; 2];

        for ((agent, path), flag) in self.agents.iter_mut().zip(paths).zip(loaded.iter_mut()) {
            if !persistence::model_exists(path) {
                log::info!(
                    "no saved weights for {} at {:?}, starting fresh",
                    agent.name(),
                    persistence::weights_path(path)
                );
                continue;
            }

            agent.load(path)?;
            log::info!(
                "loaded {} from {:?} ({} training steps)",
                agent.name(),
                persistence::weights_path(path),
                agent.training_steps()
            );
            *flag = true;
        }

        Ok(loaded)
    }
}
