//! Experience replay buffer for off-policy Q-learning
//!
//! Transitions are kept in arrival order; once the buffer is at capacity each new
//! transition evicts the oldest one. Training draws uniform minibatches without
//! replacement from whatever is currently stored.

use std::collections::VecDeque;

use rand::Rng;
use rand::seq::index;

use super::observation::State;

/// One step of experience for a single agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// Encoded state the action was chosen in
    pub state: State,
    /// Discrete action id (relative turn)
    pub action: usize,
    pub reward: f32,
    /// Encoded state after the tick resolved
    pub next_state: State,
    /// Whether the snake died on this step
    pub done: bool,
}

/// Bounded FIFO store of transitions
///
/// # Example
///
/// ```rust
/// use snake_duel::rl::{ReplayBuffer, Transition};
///
/// let mut buffer = ReplayBuffer::new(2);
/// let transition = Transition {
///     state: [0.0; 6],
///     action: 1,
///     reward: -0.1,
///     next_state: [0.0; 6],
///     done: false,
/// };
///
/// buffer.push(transition);
/// buffer.push(transition);
/// buffer.push(transition);
///
/// assert_eq!(buffer.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ReplayBuffer {
    transitions: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            transitions: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Store a transition, evicting the oldest one when full
    pub fn push(&mut self, transition: Transition) {
        if self.transitions.len() >= self.capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Draw `batch_size` distinct transitions uniformly at random
    ///
    /// # Panics
    ///
    /// Panics if fewer than `batch_size` transitions are stored. Callers check
    /// [`ReplayBuffer::len`] first.
    pub fn sample<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Vec<Transition> {
        assert!(
            batch_size <= self.transitions.len(),
            "cannot sample {} transitions from a buffer holding {}",
            batch_size,
            self.transitions.len()
        );

        index::sample(rng, self.transitions.len(), batch_size)
            .into_iter()
            .map(|i| self.transitions[i])
            .collect()
    }

    /// Get the number of stored transitions
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.transitions.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stored transitions, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter()
    }
}
