use super::action::Direction;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// One of the two snakes on the board.
///
/// Snakes live for the whole run: a death is followed by [`Snake::reset`], which
/// puts the same snake back at its start cell instead of building a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Current direction of movement
    pub direction: Direction,
    pub alive: bool,
    /// Food eaten so far; carried across resets
    pub score: u32,
}

impl Snake {
    /// Create a single-cell snake at the given position
    pub fn new(head: Position, direction: Direction) -> Self {
        Self {
            body: vec![head],
            direction,
            alive: true,
            score: 0,
        }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get body segments (excluding head)
    pub fn body_segments(&self) -> &[Position] {
        &self.body[1..]
    }

    /// Check if position collides with snake body (excluding head)
    pub fn collides_with_body(&self, pos: Position) -> bool {
        self.body_segments().contains(&pos)
    }

    /// Check if position is any cell of the snake, head included
    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Take one step in `direction`, keeping the tail when `grow` is set
    pub fn step(&mut self, direction: Direction, grow: bool) {
        self.direction = direction;
        let new_head = self.head().moved_in_direction(direction);
        self.body.insert(0, new_head);

        if !grow {
            self.body.pop();
        }
    }

    /// Collapse to a single cell at `start` heading `direction` and revive
    pub fn reset(&mut self, start: Position, direction: Direction) {
        self.body.clear();
        self.body.push(start);
        self.direction = direction;
        self.alive = true;
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Type of collision that killed a snake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake left the grid
    Wall,
    /// Snake hit itself
    SelfCollision,
    /// Snake hit the other snake, head-on included
    OtherSnake,
}

/// The shared grid with both snakes and the single food cell
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub snakes: [Snake; 2],
    pub food: Position,
    pub grid_width: usize,
    pub grid_height: usize,
}

impl Board {
    pub fn new(snakes: [Snake; 2], food: Position, grid_width: usize, grid_height: usize) -> Self {
        Self {
            snakes,
            food,
            grid_width,
            grid_height,
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0
            && pos.x < self.grid_width as i32
            && pos.y >= 0
            && pos.y < self.grid_height as i32
    }

    /// Check if a position is occupied by either snake
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.snakes.iter().any(|snake| snake.occupies(pos))
    }

    /// A cell is dangerous if it is off the grid or on any snake
    pub fn is_danger(&self, pos: Position) -> bool {
        !self.is_in_bounds(pos) || self.is_occupied(pos)
    }

    /// Move both snakes one tick along the chosen headings.
    ///
    /// Returns which snakes ate the food. Dead snakes stay where they are and
    /// cannot eat. Food is not respawned here. A living snake never reverses.
    pub fn advance(&mut self, headings: [Direction; 2]) -> [bool; 2] {
        let food = self.food;
        let mut eaten = [false; 2];

        for (idx, snake) in self.snakes.iter_mut().enumerate() {
            if !snake.alive {
                continue;
            }

            debug_assert!(
                !snake.direction.is_opposite(headings[idx]),
                "snake {} reversed from {:?} to {:?}",
                idx,
                snake.direction,
                headings[idx]
            );

            let next_head = snake.head().moved_in_direction(headings[idx]);
            eaten[idx] = next_head == food;
            if eaten[idx] {
                snake.score += 1;
            }
            snake.step(headings[idx], eaten[idx]);
        }

        eaten
    }

    /// Mark snakes whose head sits on a wall, themselves, or the other snake.
    ///
    /// Both verdicts are computed against the post-move bodies before either
    /// flag changes, so a head-on meeting kills both snakes.
    pub fn detect_collisions(&mut self) -> [Option<CollisionType>; 2] {
        let verdicts = [self.collision_for(0), self.collision_for(1)];

        for (snake, verdict) in self.snakes.iter_mut().zip(verdicts) {
            if verdict.is_some() {
                snake.alive = false;
            }
        }

        verdicts
    }

    fn collision_for(&self, idx: usize) -> Option<CollisionType> {
        let snake = &self.snakes[idx];
        if !snake.alive {
            return None;
        }

        let head = snake.head();
        let other = &self.snakes[1 - idx];

        if !self.is_in_bounds(head) {
            Some(CollisionType::Wall)
        } else if snake.collides_with_body(head) {
            Some(CollisionType::SelfCollision)
        } else if other.occupies(head) {
            Some(CollisionType::OtherSnake)
        } else {
            None
        }
    }
}
