//! Deep Q-learning agent
//!
//! Online Q-learning with a function approximator and experience replay. The
//! bootstrapped target is computed with the same network being trained, evaluated
//! without gradient tracking. There is no separate target network, so the target
//! moves with every update.

use std::path::Path;

use burn::{
    module::AutodiffModule,
    optim::{Adam, AdamConfig, GradientsParams, Optimizer, adaptor::OptimizerAdaptor},
    tensor::{ElementConversion, Int, Tensor, backend::AutodiffBackend},
};
use rand::{Rng, SeedableRng, rngs::StdRng};

use super::agent::Agent;
use super::buffer::{ReplayBuffer, Transition};
use super::config::AgentConfig;
use super::network::{NUM_ACTIONS, QFunction, ReluQNetwork, TanhQNetwork};
use super::observation::{State, states_to_tensor};
use super::persistence::{self, ModelMetadata};
use crate::error::{ArenaError, Result};

/// DQN agent with a ReLU network
pub type ReluDqnAgent<B> = DqnAgent<B, ReluQNetwork<B>>;

/// DQN agent with a Tanh network
pub type TanhDqnAgent<B> = DqnAgent<B, TanhQNetwork<B>>;

/// Epsilon-greedy Q-learning agent
///
/// Owns its network, optimizer state, replay buffer and random source. Two agents
/// never share any of these.
///
/// # Example
///
/// ```rust
/// use snake_duel::rl::{AgentConfig, DqnAgent, QNetworkConfig, TrainingBackend, default_device};
///
/// let device = default_device();
/// let config = AgentConfig::better();
/// let network = QNetworkConfig::new(config.hidden_dims).init_relu::<TrainingBackend>(&device);
///
/// let mut agent = DqnAgent::new("better", network, config, device).unwrap();
/// let action = agent.select_action(&[0.0, 0.0, 1.0, 1.0, 0.0, 0.0]);
/// assert!(action < 3);
/// ```
pub struct DqnAgent<B: AutodiffBackend, M: AutodiffModule<B>> {
    name: String,

    network: M,

    optim: OptimizerAdaptor<Adam, M, B>,

    config: AgentConfig,

    memory: ReplayBuffer,

    /// Current exploration rate, never increases
    epsilon: f64,

    /// Number of optimizer steps taken, including those of loaded weights
    training_steps: usize,

    rng: StdRng,

    device: B::Device,
}

impl<B, M> DqnAgent<B, M>
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + QFunction<B>,
    M::InnerModule: QFunction<B::InnerBackend>,
{
    /// Create an agent around an initialized network
    ///
    /// Fails if the configuration is invalid.
    pub fn new(
        name: impl Into<String>,
        network: M,
        config: AgentConfig,
        device: B::Device,
    ) -> Result<Self> {
        config.validate().map_err(ArenaError::InvalidConfig)?;

        Ok(Self {
            name: name.into(),
            network,
            optim: AdamConfig::new().init(),
            memory: ReplayBuffer::new(config.memory_capacity),
            epsilon: config.epsilon_start,
            training_steps: 0,
            rng: StdRng::from_entropy(),
            device,
            config,
        })
    }

    /// Replace the random source used for exploration and minibatch sampling
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// Epsilon-greedy action: random with probability epsilon, otherwise the
    /// first action with the highest Q-value
    pub fn select_action(&mut self, state: &State) -> usize {
        if self.rng.gen_bool(self.epsilon) {
            return self.rng.gen_range(0..NUM_ACTIONS);
        }

        argmax(&self.q_values(state))
    }

    /// Q-values of every action for one state, without gradient tracking
    pub fn q_values(&self, state: &State) -> Vec<f32> {
        let input = states_to_tensor::<B::InnerBackend>(std::iter::once(state), &self.device);

        self.network
            .valid()
            .forward(input)
            .into_data()
            .iter::<f32>()
            .collect()
    }

    pub fn store(&mut self, transition: Transition) {
        self.memory.push(transition);
    }

    /// One gradient step on a replayed minibatch
    ///
    /// Does nothing until the buffer holds at least `batch_size` transitions.
    /// Returns the minibatch loss when a step ran.
    pub fn train_step(&mut self) -> Option<f32> {
        if self.memory.len() < self.config.batch_size {
            return None;
        }

        let batch = self.memory.sample(self.config.batch_size, &mut self.rng);

        // Bootstrapped targets from the current parameters, outside the graph
        let next_states =
            states_to_tensor::<B::InnerBackend>(batch.iter().map(|t| &t.next_state), &self.device);
        let next_q: Vec<f32> = self
            .network
            .valid()
            .forward(next_states)
            .into_data()
            .iter::<f32>()
            .collect();
        let targets = compute_td_targets(&batch, &next_q, self.config.gamma);
        let targets = Tensor::<B, 1>::from_floats(targets.as_slice(), &self.device);

        // Q(s, a) for the actions actually taken
        let states = states_to_tensor::<B>(batch.iter().map(|t| &t.state), &self.device);
        let actions: Vec<i32> = batch.iter().map(|t| t.action as i32).collect();
        let actions = Tensor::<B, 1, Int>::from_ints(actions.as_slice(), &self.device);
        let q_taken = self
            .network
            .forward(states)
            .gather(1, actions.unsqueeze_dim(1))
            .squeeze::<1>(1);

        let diff = q_taken - targets;
        let loss = (diff.clone() * diff).mean();

        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &self.network);
        self.network = self
            .optim
            .step(self.config.learning_rate, self.network.clone(), grads);

        self.training_steps += 1;
        self.decay_epsilon();

        Some(loss.into_scalar().elem::<f32>())
    }

    fn decay_epsilon(&mut self) {
        if self.epsilon > self.config.epsilon_min {
            self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn training_steps(&self) -> usize {
        self.training_steps
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn memory(&self) -> &ReplayBuffer {
        &self.memory
    }

    pub fn network(&self) -> &M {
        &self.network
    }

    /// Save network weights and metadata
    pub fn save(&self, path: &Path) -> Result<()> {
        let metadata = ModelMetadata::new(&self.name, self.config.clone(), self.training_steps);
        persistence::save_model::<B, M>(&self.network, &metadata, path)
    }

    /// Load network weights saved by [`DqnAgent::save`]
    ///
    /// The exploration rate and replay buffer are left as they are.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let (network, metadata) = persistence::load_model::<B, M>(
            self.network.clone(),
            &self.config,
            path,
            &self.device,
        )?;

        self.network = network;
        self.training_steps = metadata.training_steps;
        Ok(())
    }
}

impl<B, M> Agent for DqnAgent<B, M>
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + QFunction<B>,
    M::InnerModule: QFunction<B::InnerBackend>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn select_action(&mut self, state: &State) -> usize {
        DqnAgent::select_action(self, state)
    }

    fn store(&mut self, transition: Transition) {
        DqnAgent::store(self, transition)
    }

    fn train_step(&mut self) -> Option<f32> {
        DqnAgent::train_step(self)
    }

    fn epsilon(&self) -> f64 {
        self.epsilon
    }

    fn training_steps(&self) -> usize {
        self.training_steps
    }

    fn memory_len(&self) -> usize {
        self.memory.len()
    }

    fn save(&self, path: &Path) -> Result<()> {
        DqnAgent::save(self, path)
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        DqnAgent::load(self, path)
    }
}

/// Targets `r + gamma * max_a' Q(s', a')`, or just `r` for terminal transitions
///
/// `next_q` holds one row of `NUM_ACTIONS` values per transition, in batch order.
pub fn compute_td_targets(batch: &[Transition], next_q: &[f32], gamma: f32) -> Vec<f32> {
    batch
        .iter()
        .zip(next_q.chunks(NUM_ACTIONS))
        .map(|(transition, row)| {
            if transition.done {
                transition.reward
            } else {
                let best = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                transition.reward + gamma * best
            }
        })
        .collect()
}

/// Index of the largest value; ties go to the lowest index
pub fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &value) in values.iter().enumerate().skip(1) {
        if value > values[best] {
            best = i;
        }
    }
    best
}
