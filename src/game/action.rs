/// Absolute heading of a snake on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Headings in clockwise order, the cycle relative turns walk over
    pub const CLOCKWISE: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Returns true if turning from self to other would be a 180-degree turn
    pub fn is_opposite(&self, other: Direction) -> bool {
        matches!(
            (self, other),
            (Direction::Up, Direction::Down)
                | (Direction::Down, Direction::Up)
                | (Direction::Left, Direction::Right)
                | (Direction::Right, Direction::Left)
        )
    }

    /// Returns the delta (dx, dy) for moving in this direction
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    fn clockwise_index(&self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    /// Heading after applying a relative turn
    pub fn turn(&self, turn: Turn) -> Direction {
        let idx = self.clockwise_index();
        let new_idx = match turn {
            Turn::Left => (idx + 3) % 4,
            Turn::Straight => idx,
            Turn::Right => (idx + 1) % 4,
        };
        Self::CLOCKWISE[new_idx]
    }
}

/// Relative move chosen by an agent.
///
/// The discriminant is the action id the Q-network outputs are indexed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Turn {
    Left = 0,
    Straight = 1,
    Right = 2,
}

impl Turn {
    pub const ALL: [Turn; 3] = [Turn::Left, Turn::Straight, Turn::Right];

    /// Map a discrete action id back to a turn
    pub fn from_index(idx: usize) -> Option<Turn> {
        Self::ALL.get(idx).copied()
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}
