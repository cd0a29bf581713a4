use burn::tensor::{Tensor, backend::Backend};

use crate::game::{Board, Direction, Position, Snake, Turn};

/// Number of features in an encoded state
pub const STATE_SIZE: usize = 6;

/// Egocentric feature vector seen by one agent
pub type State = [f32; STATE_SIZE];

/// Encode what one snake sees of the board
///
/// Features, in order:
/// - 0: Danger straight ahead
/// - 1: Danger after turning right
/// - 2: Danger after turning left
/// - 3: Food ahead
/// - 4: Food to the right
/// - 5: Food to the left
///
/// Directions are relative to the snake's current heading. Every value is 0.0 or 1.0.
pub fn encode(snake: &Snake, board: &Board) -> State {
    let head = snake.head();
    let heading = snake.direction;

    let danger = |turn: Turn| {
        let next = head.moved_in_direction(heading.turn(turn));
        flag(board.is_danger(next))
    };

    let (food_ahead, food_right, food_left) = food_flags(heading, head, board.food);

    [
        danger(Turn::Straight),
        danger(Turn::Right),
        danger(Turn::Left),
        flag(food_ahead),
        flag(food_right),
        flag(food_left),
    ]
}

/// Where the food lies relative to the head, as (ahead, right, left)
fn food_flags(heading: Direction, head: Position, food: Position) -> (bool, bool, bool) {
    match heading {
        Direction::Up => (food.y < head.y, food.x > head.x, food.x < head.x),
        Direction::Down => (food.y > head.y, food.x < head.x, food.x > head.x),
        Direction::Left => (food.x < head.x, food.y < head.y, food.y > head.y),
        Direction::Right => (food.x > head.x, food.y > head.y, food.y < head.y),
    }
}

fn flag(value: bool) -> f32 {
    if value { 1.0 } else { 0.0 }
}

/// Stack encoded states into a `[batch, STATE_SIZE]` tensor
pub fn states_to_tensor<'a, B: Backend>(
    states: impl IntoIterator<Item = &'a State>,
    device: &B::Device,
) -> Tensor<B, 2> {
    let flat: Vec<f32> = states.into_iter().flat_map(|state| state.iter().copied()).collect();
    let batch_size = flat.len() / STATE_SIZE;

    Tensor::<B, 1>::from_floats(flat.as_slice(), device).reshape([batch_size, STATE_SIZE])
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::backend::ndarray::NdArrayDevice;

    type TestBackend = NdArray<f32>;

    fn board_with_first(snake: Snake, food: Position) -> Board {
        let other = Snake::new(Position::new(9, 9), Direction::Left);
        Board::new([snake, other], food, 10, 10)
    }

    #[test]
    fn test_open_field_heading_right() {
        let snake = Snake::new(Position::new(5, 5), Direction::Right);
        let board = board_with_first(snake, Position::new(8, 7));

        let state = encode(&board.snakes[0], &board);

        // Food is ahead (x larger) and to the right (y larger when heading right)
        assert_eq!(state, [0.0, 0.0, 0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_food_flags_for_every_heading() {
        let head = Position::new(5, 5);

        assert_eq!(
            food_flags(Direction::Up, head, Position::new(7, 2)),
            (true, true, false)
        );
        assert_eq!(
            food_flags(Direction::Down, head, Position::new(7, 8)),
            (true, false, true)
        );
        assert_eq!(
            food_flags(Direction::Left, head, Position::new(2, 3)),
            (true, true, false)
        );
        assert_eq!(
            food_flags(Direction::Right, head, Position::new(2, 3)),
            (false, false, true)
        );
    }

    #[test]
    fn test_food_behind_on_same_line() {
        let snake = Snake::new(Position::new(5, 5), Direction::Up);
        let board = board_with_first(snake, Position::new(5, 8));

        let state = encode(&board.snakes[0], &board);

        assert_eq!(&state[3..], &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_wall_danger_in_corner() {
        // Top-left corner heading up: straight and left leave the grid
        let snake = Snake::new(Position::new(0, 0), Direction::Up);
        let board = board_with_first(snake, Position::new(5, 5));

        let state = encode(&board.snakes[0], &board);

        assert_eq!(state[0], 1.0);
        assert_eq!(state[1], 0.0);
        assert_eq!(state[2], 1.0);
    }

    #[test]
    fn test_other_snake_is_danger() {
        let snake = Snake::new(Position::new(5, 5), Direction::Right);
        let mut board = board_with_first(snake, Position::new(0, 0));
        board.snakes[1].body = vec![Position::new(6, 5), Position::new(6, 6)];

        let state = encode(&board.snakes[0], &board);

        // Straight hits the head at (6,5); right (down) is (5,6), still free
        assert_eq!(state[0], 1.0);
        assert_eq!(state[1], 0.0);
        assert_eq!(state[2], 0.0);
    }

    #[test]
    fn test_own_body_is_danger() {
        let mut snake = Snake::new(Position::new(5, 5), Direction::Up);
        snake.body = vec![
            Position::new(5, 5),
            Position::new(5, 6),
            Position::new(6, 6),
            Position::new(6, 5),
        ];
        let board = board_with_first(snake, Position::new(0, 0));

        let state = encode(&board.snakes[0], &board);

        // Right of an upward heading is +x, which is the tail at (6,5)
        assert_eq!(state[1], 1.0);
        assert_eq!(state[0], 0.0);
        assert_eq!(state[2], 0.0);
    }

    #[test]
    fn test_values_are_binary() {
        let snake = Snake::new(Position::new(9, 0), Direction::Right);
        let board = board_with_first(snake, Position::new(3, 7));

        for value in encode(&board.snakes[0], &board) {
            assert!(value == 0.0 || value == 1.0);
        }
    }

    #[test]
    fn test_states_to_tensor_shape() {
        let device = NdArrayDevice::default();
        let states = [[1.0, 0.0, 0.0, 0.0, 1.0, 0.0], [0.0; STATE_SIZE], [1.0; STATE_SIZE]];

        let tensor = states_to_tensor::<TestBackend>(states.iter(), &device);

        assert_eq!(tensor.dims(), [3, STATE_SIZE]);
        let values: Vec<f32> = tensor.into_data().iter::<f32>().collect();
        assert_eq!(&values[..STATE_SIZE], &states[0]);
        assert_eq!(&values[2 * STATE_SIZE..], &states[2]);
    }
}
