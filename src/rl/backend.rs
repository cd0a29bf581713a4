//! Backend type aliases and device management
//!
//! - **TrainingBackend**: Autodiff-enabled NdArray backend, used by the agents
//! - **InferenceBackend**: Plain NdArray backend for greedy evaluation and target values
//!
//! The networks are a few thousand parameters each, so the CPU backend is plenty.
//!
//! # Example
//!
//! ```rust
//! use snake_duel::rl::{QNetworkConfig, TrainingBackend, default_device};
//!
//! let device = default_device();
//! let network = QNetworkConfig::new([64, 32]).init_relu::<TrainingBackend>(&device);
//! ```

use burn::backend::{
    Autodiff,
    ndarray::{NdArray, NdArrayDevice},
};

/// Backend type for training (with autodiff)
pub type TrainingBackend = Autodiff<NdArray<f32>>;

/// Backend type for inference (without autodiff)
pub type InferenceBackend = NdArray<f32>;

/// Get the default device for computation (CPU)
pub fn default_device() -> NdArrayDevice {
    NdArrayDevice::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_device() {
        let device1 = default_device();
        let device2 = default_device();
        assert_eq!(device1, device2);
    }
}
