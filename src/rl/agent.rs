use std::path::Path;

use rand::rngs::StdRng;

use super::backend::{TrainingBackend, default_device};
use super::buffer::Transition;
use super::config::{Activation, AgentConfig};
use super::dqn::DqnAgent;
use super::network::QNetworkConfig;
use super::observation::State;
use crate::error::Result;

/// A learning player the arena can drive without knowing its network type
pub trait Agent {
    fn name(&self) -> &str;

    /// Pick a relative turn (0 left, 1 straight, 2 right) for the encoded state
    fn select_action(&mut self, state: &State) -> usize;

    /// Remember one step of experience
    fn store(&mut self, transition: Transition);

    /// Run one learning step if enough experience is stored, returning its loss
    fn train_step(&mut self) -> Option<f32>;

    fn epsilon(&self) -> f64;

    fn training_steps(&self) -> usize;

    fn memory_len(&self) -> usize;

    fn save(&self, path: &Path) -> Result<()>;

    fn load(&mut self, path: &Path) -> Result<()>;
}

/// Build a DQN agent on the training backend, choosing the network from the config
pub fn build_agent(name: &str, config: &AgentConfig, rng: StdRng) -> Result<Box<dyn Agent>> {
    let device = default_device();
    let network_config = QNetworkConfig::new(config.hidden_dims);

    let agent: Box<dyn Agent> = match config.activation {
        Activation::Relu => Box::new(
            DqnAgent::new(
                name,
                network_config.init_relu::<TrainingBackend>(&device),
                config.clone(),
                device,
            )?
            .with_rng(rng),
        ),
        Activation::Tanh => Box::new(
            DqnAgent::new(
                name,
                network_config.init_tanh::<TrainingBackend>(&device),
                config.clone(),
                device,
            )?
            .with_rng(rng),
        ),
    };

    Ok(agent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_build_both_presets() {
        let better = build_agent("better", &AgentConfig::better(), StdRng::seed_from_u64(0)).unwrap();
        let worse = build_agent("worse", &AgentConfig::worse(), StdRng::seed_from_u64(1)).unwrap();

        assert_eq!(better.name(), "better");
        assert_eq!(better.epsilon(), 0.1);
        assert_eq!(worse.name(), "worse");
        assert_eq!(worse.epsilon(), 0.3);
        assert_eq!(worse.memory_len(), 0);
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let config = AgentConfig {
            gamma: 2.0,
            ..AgentConfig::worse()
        };

        assert!(build_agent("broken", &config, StdRng::seed_from_u64(0)).is_err());
    }

    #[test]
    fn test_boxed_agent_learns_through_trait() {
        let config = AgentConfig {
            batch_size: 2,
            ..AgentConfig::worse()
        };
        let mut agent = build_agent("worse", &config, StdRng::seed_from_u64(2)).unwrap();

        let transition = Transition {
            state: [0.0; 6],
            action: agent.select_action(&[0.0; 6]),
            reward: -0.1,
            next_state: [0.0; 6],
            done: false,
        };
        agent.store(transition);
        assert!(agent.train_step().is_none());

        agent.store(transition);
        assert!(agent.train_step().is_some());
        assert_eq!(agent.training_steps(), 1);
        assert!(agent.epsilon() < 0.3);
    }
}
