//! Action-value networks for the snake agents
//!
//! Both networks are small multilayer perceptrons mapping the 6-feature egocentric
//! state to one Q-value per relative turn. They differ only in activation:
//!
//! ```text
//! Input: [batch, 6]
//!   ↓ Linear(6 → h1) + act
//!   ↓ Linear(h1 → h2) + act
//!   ↓ Linear(h2 → 3)
//! Output: [batch, 3]  Q(s, left), Q(s, straight), Q(s, right)
//! ```
//!
//! # Example
//!
//! ```rust
//! use snake_duel::rl::{QFunction, QNetworkConfig};
//! use burn::backend::ndarray::NdArrayDevice;
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//!
//! type Backend = NdArray<f32>;
//!
//! let device = NdArrayDevice::default();
//! let network = QNetworkConfig::new([64, 32]).init_relu::<Backend>(&device);
//!
//! let states = Tensor::zeros([4, 6], &device);
//! let q_values = network.forward(states);
//!
//! assert_eq!(q_values.dims(), [4, 3]);
//! ```

use burn::{
    module::Module,
    nn::{Linear, LinearConfig},
    tensor::{
        Tensor,
        activation::{relu, tanh},
        backend::Backend,
    },
};

use super::observation::STATE_SIZE;

/// Number of discrete actions (left, straight, right)
pub const NUM_ACTIONS: usize = 3;

/// A network that scores every action for a batch of states
pub trait QFunction<B: Backend>: Module<B> {
    /// Map `[batch, STATE_SIZE]` states to `[batch, NUM_ACTIONS]` Q-values
    fn forward(&self, states: Tensor<B, 2>) -> Tensor<B, 2>;
}

/// Layer sizes shared by both network flavours
#[derive(Debug, Clone, PartialEq)]
pub struct QNetworkConfig {
    pub input_size: usize,
    /// Widths of the two hidden layers
    pub hidden_dims: [usize; 2],
    pub num_actions: usize,
}

impl QNetworkConfig {
    pub fn new(hidden_dims: [usize; 2]) -> Self {
        Self {
            input_size: STATE_SIZE,
            hidden_dims,
            num_actions: NUM_ACTIONS,
        }
    }

    /// Initialize a ReLU network from this configuration
    pub fn init_relu<B: Backend>(&self, device: &B::Device) -> ReluQNetwork<B> {
        let [fc1, fc2, head] = self.layers(device);
        ReluQNetwork { fc1, fc2, head }
    }

    /// Initialize a Tanh network from this configuration
    pub fn init_tanh<B: Backend>(&self, device: &B::Device) -> TanhQNetwork<B> {
        let [fc1, fc2, head] = self.layers(device);
        TanhQNetwork { fc1, fc2, head }
    }

    fn layers<B: Backend>(&self, device: &B::Device) -> [Linear<B>; 3] {
        let [h1, h2] = self.hidden_dims;
        [
            LinearConfig::new(self.input_size, h1).init(device),
            LinearConfig::new(h1, h2).init(device),
            LinearConfig::new(h2, self.num_actions).init(device),
        ]
    }
}

/// Q-network with ReLU hidden activations
#[derive(Module, Debug)]
pub struct ReluQNetwork<B: Backend> {
    fc1: Linear<B>,
    fc2: Linear<B>,
    /// Linear output, one value per action
    head: Linear<B>,
}

impl<B: Backend> QFunction<B> for ReluQNetwork<B> {
    fn forward(&self, states: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.fc1.forward(states));
        let x = relu(self.fc2.forward(x));
        self.head.forward(x)
    }
}

/// Q-network with Tanh hidden activations
#[derive(Module, Debug)]
pub struct TanhQNetwork<B: Backend> {
    fc1: Linear<B>,
    fc2: Linear<B>,
    head: Linear<B>,
}

impl<B: Backend> QFunction<B> for TanhQNetwork<B> {
    fn forward(&self, states: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = tanh(self.fc1.forward(states));
        let x = tanh(self.fc2.forward(x));
        self.head.forward(x)
    }
}
