use super::{
    action::Direction,
    config::GameConfig,
    state::{Board, Position, Snake},
};
use crate::error::{ArenaError, Result};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Places snakes and food on the board.
///
/// Owns the random source used for food placement so runs can be replayed by
/// seeding it.
pub struct GameEngine<R: Rng = StdRng> {
    config: GameConfig,
    rng: R,
}

impl GameEngine<StdRng> {
    /// Create a new game engine seeded from OS entropy
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a deterministic engine
    pub fn seeded(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GameEngine<R> {
    pub fn with_rng(config: GameConfig, rng: R) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Start cell and heading for each snake: left quarter heading right,
    /// right quarter heading left, both on the middle row
    pub fn start_positions(&self) -> [(Position, Direction); 2] {
        let width = self.config.grid_width as i32;
        let mid_y = (self.config.grid_height / 2) as i32;

        [
            (Position::new(width / 4, mid_y), Direction::Right),
            (Position::new(3 * width / 4, mid_y), Direction::Left),
        ]
    }

    /// Build a fresh board with both snakes at their start cells
    pub fn new_board(&mut self) -> Result<Board> {
        let [(start1, dir1), (start2, dir2)] = self.start_positions();
        let snakes = [Snake::new(start1, dir1), Snake::new(start2, dir2)];

        // Food goes in once the snakes are placed
        let mut board = Board::new(
            snakes,
            start1,
            self.config.grid_width,
            self.config.grid_height,
        );
        board.food = self.spawn_food(&board)?;

        Ok(board)
    }

    /// Pick a uniformly random free cell for the food.
    ///
    /// Gives up on random sampling after `max_food_attempts` draws and scans the
    /// grid row by row instead, so a crowded board still terminates.
    pub fn spawn_food(&mut self, board: &Board) -> Result<Position> {
        for _ in 0..self.config.max_food_attempts {
            let x = self.rng.gen_range(0..board.grid_width) as i32;
            let y = self.rng.gen_range(0..board.grid_height) as i32;
            let pos = Position::new(x, y);

            if !board.is_occupied(pos) {
                return Ok(pos);
            }
        }

        log::debug!(
            "food placement fell back to a board scan after {} attempts",
            self.config.max_food_attempts
        );

        (0..board.grid_height as i32)
            .flat_map(|y| (0..board.grid_width as i32).map(move |x| Position::new(x, y)))
            .find(|&pos| !board.is_occupied(pos))
            .ok_or(ArenaError::BoardFull {
                width: board.grid_width,
                height: board.grid_height,
            })
    }
}
