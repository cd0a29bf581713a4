//! Per-agent training statistics
//!
//! Each snake gets its own tracker. Ticks are fed in as they happen; an episode
//! ends whenever the snake dies and is reset.

use std::collections::VecDeque;

use crate::rl::AgentStep;

/// Training statistics tracker with rolling averages
///
/// # Example
///
/// ```rust
/// use snake_duel::metrics::TrainingStats;
///
/// let mut stats = TrainingStats::new(100);
///
/// stats.record_episode(15.5, 150, 5);
/// stats.record_loss(0.02);
///
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Episode rewards (rolling window)
    episode_rewards: VecDeque<f32>,

    /// Episode lengths in ticks (rolling window)
    episode_lengths: VecDeque<usize>,

    /// Food eaten per episode (rolling window)
    episode_scores: VecDeque<u32>,

    /// Training losses (rolling window)
    losses: VecDeque<f32>,

    /// Reward, ticks and food of the episode in progress
    current_reward: f32,
    current_length: usize,
    current_score: u32,

    /// Exploration rate last reported by the agent
    epsilon: f64,

    /// Total number of episodes completed
    total_episodes: usize,

    /// Total number of ticks the agent acted in
    total_steps: usize,

    /// Total number of training steps that ran
    total_updates: usize,

    /// Window size for rolling averages
    window_size: usize,
}

impl TrainingStats {
    /// Create a tracker keeping the last `window_size` episodes and losses
    pub fn new(window_size: usize) -> Self {
        Self {
            episode_rewards: VecDeque::with_capacity(window_size),
            episode_lengths: VecDeque::with_capacity(window_size),
            episode_scores: VecDeque::with_capacity(window_size),
            losses: VecDeque::with_capacity(window_size),
            current_reward: 0.0,
            current_length: 0,
            current_score: 0,
            epsilon: 0.0,
            total_episodes: 0,
            total_steps: 0,
            total_updates: 0,
            window_size,
        }
    }

    /// Fold one tick's outcome for this agent into the running episode
    ///
    /// A terminal step closes the episode.
    pub fn record_step(&mut self, step: &AgentStep, epsilon: f64) {
        self.current_reward += step.reward;
        self.current_length += 1;
        if step.ate_food {
            self.current_score += 1;
        }
        self.total_steps += 1;
        self.epsilon = epsilon;

        if let Some(loss) = step.loss {
            self.record_loss(loss);
        }

        if step.done {
            self.record_episode(self.current_reward, self.current_length, self.current_score);
            self.current_reward = 0.0;
            self.current_length = 0;
            self.current_score = 0;
        }
    }

    /// Record a finished episode
    pub fn record_episode(&mut self, reward: f32, length: usize, score: u32) {
        Self::push_deque(&mut self.episode_rewards, reward, self.window_size);
        Self::push_deque(&mut self.episode_lengths, length, self.window_size);
        Self::push_deque(&mut self.episode_scores, score, self.window_size);
        self.total_episodes += 1;
    }

    /// Record the loss of one training step
    pub fn record_loss(&mut self, loss: f32) {
        Self::push_deque(&mut self.losses, loss, self.window_size);
        self.total_updates += 1;
    }

    /// Mean episode reward over the rolling window, 0.0 before the first episode
    pub fn mean_episode_reward(&self) -> f32 {
        Self::mean(&self.episode_rewards)
    }

    pub fn mean_episode_length(&self) -> f32 {
        let sum: usize = self.episode_lengths.iter().sum();
        if self.episode_lengths.is_empty() {
            0.0
        } else {
            sum as f32 / self.episode_lengths.len() as f32
        }
    }

    /// Mean food eaten per episode over the rolling window
    pub fn mean_episode_score(&self) -> f32 {
        let sum: u32 = self.episode_scores.iter().sum();
        if self.episode_scores.is_empty() {
            0.0
        } else {
            sum as f32 / self.episode_scores.len() as f32
        }
    }

    /// Best single-episode food count in the window
    pub fn best_episode_score(&self) -> u32 {
        self.episode_scores.iter().copied().max().unwrap_or(0)
    }

    pub fn mean_loss(&self) -> f32 {
        Self::mean(&self.losses)
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn total_updates(&self) -> usize {
        self.total_updates
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// One-line summary of the current statistics
    pub fn format_summary(&self) -> String {
        format!(
            "Episodes: {} | Steps: {} | Reward: {:.2} | Score: {:.2} (best {}) | Len: {:.1} | Loss: {:.4} | Updates: {} | Eps: {:.3}",
            self.total_episodes,
            self.total_steps,
            self.mean_episode_reward(),
            self.mean_episode_score(),
            self.best_episode_score(),
            self.mean_episode_length(),
            self.mean_loss(),
            self.total_updates,
            self.epsilon,
        )
    }

    fn mean(deque: &VecDeque<f32>) -> f32 {
        if deque.is_empty() {
            0.0
        } else {
            deque.iter().sum::<f32>() / deque.len() as f32
        }
    }

    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}
