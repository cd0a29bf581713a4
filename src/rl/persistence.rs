//! Saving and loading agent weights
//!
//! A model lives in two files next to each other:
//! - `<path>.mpk` - network weights (Burn named MessagePack record)
//! - `<path>.meta.json` - [`ModelMetadata`] as JSON
//!
//! Only the network parameters are persisted. The exploration rate and the replay
//! buffer start fresh on every run.

use std::path::{Path, PathBuf};

use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::backend::Backend,
};
use serde::{Deserialize, Serialize};

use super::config::AgentConfig;
use crate::error::{ArenaError, Result};

/// Metadata saved with the weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub agent_name: String,

    /// Configuration the network was built from
    pub agent_config: AgentConfig,

    /// Total training steps completed
    pub training_steps: usize,

    /// Crate version that wrote the file
    pub version: String,
}

impl ModelMetadata {
    pub fn new(agent_name: &str, agent_config: AgentConfig, training_steps: usize) -> Self {
        Self {
            agent_name: agent_name.to_string(),
            agent_config,
            training_steps,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Short description of the network shape, used in mismatch errors
    fn network_shape(&self) -> String {
        network_shape(&self.agent_config)
    }
}

fn network_shape(config: &AgentConfig) -> String {
    format!("{:?} {:?}", config.activation, config.hidden_dims)
}

/// Path of the weights file for a model path
pub fn weights_path(path: &Path) -> PathBuf {
    path.with_extension("mpk")
}

/// Path of the JSON metadata sidecar for a model path
pub fn metadata_path(path: &Path) -> PathBuf {
    path.with_extension("meta.json")
}

/// Whether weights have been saved at `path`
pub fn model_exists(path: &Path) -> bool {
    weights_path(path).is_file()
}

/// Save network weights and metadata
///
/// Creates parent directories if they don't exist and overwrites any previous model
/// at the same path.
pub fn save_model<B: Backend, M: Module<B>>(
    network: &M,
    metadata: &ModelMetadata,
    path: &Path,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ArenaError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let weights = weights_path(path);
    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    Recorder::<B>::record(&recorder, network.clone().into_record(), weights.clone())
        .map_err(|source| ArenaError::ModelSave {
            path: weights,
            source,
        })?;

    let meta_path = metadata_path(path);
    let meta_json = serde_json::to_string_pretty(metadata).map_err(|source| {
        ArenaError::Metadata {
            path: meta_path.clone(),
            source,
        }
    })?;
    std::fs::write(&meta_path, meta_json).map_err(|source| ArenaError::Io {
        path: meta_path,
        source,
    })?;

    Ok(())
}

/// Load saved weights into `network`
///
/// `expected` is the configuration the caller built `network` from. A model saved
/// from a network with a different activation or layer widths is rejected before
/// any weights are read.
pub fn load_model<B: Backend, M: Module<B>>(
    network: M,
    expected: &AgentConfig,
    path: &Path,
    device: &B::Device,
) -> Result<(M, ModelMetadata)> {
    let weights = weights_path(path);
    if !weights.is_file() {
        return Err(ArenaError::ModelNotFound(weights));
    }

    let meta_path = metadata_path(path);
    let meta_json = std::fs::read_to_string(&meta_path).map_err(|source| ArenaError::Io {
        path: meta_path.clone(),
        source,
    })?;
    let metadata: ModelMetadata =
        serde_json::from_str(&meta_json).map_err(|source| ArenaError::Metadata {
            path: meta_path,
            source,
        })?;

    if metadata.agent_config.activation != expected.activation
        || metadata.agent_config.hidden_dims != expected.hidden_dims
    {
        return Err(ArenaError::IncompatibleModel {
            path: weights,
            expected: network_shape(expected),
            found: metadata.network_shape(),
        });
    }

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let record: M::Record = Recorder::<B>::load(&recorder, weights.clone(), device)
        .map_err(|source| ArenaError::ModelLoad {
            path: weights,
            source,
        })?;

    Ok((network.load_record(record), metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::{InferenceBackend, QFunction, QNetworkConfig, default_device};
    use burn::tensor::Tensor;
    use tempfile::TempDir;

    fn q_values<M: QFunction<InferenceBackend>>(network: &M) -> Vec<f32> {
        let device = default_device();
        let states = Tensor::<InferenceBackend, 2>::from_floats(
            [[1.0, 0.0, 0.0, 1.0, 0.0, 1.0], [0.0, 1.0, 1.0, 0.0, 1.0, 0.0]],
            &device,
        );
        network.forward(states).into_data().iter::<f32>().collect()
    }

    #[test]
    fn test_metadata_creation() {
        let metadata = ModelMetadata::new("better", AgentConfig::better(), 1000);

        assert_eq!(metadata.agent_name, "better");
        assert_eq!(metadata.training_steps, 1000);
        assert_eq!(metadata.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_sidecar_paths() {
        let path = Path::new("models/better");
        assert_eq!(weights_path(path), PathBuf::from("models/better.mpk"));
        assert_eq!(metadata_path(path), PathBuf::from("models/better.meta.json"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("better");
        let device = default_device();
        let config = AgentConfig::better();
        let network_config = QNetworkConfig::new(config.hidden_dims);

        let trained = network_config.init_relu::<InferenceBackend>(&device);
        let metadata = ModelMetadata::new("better", config.clone(), 42);
        save_model(&trained, &metadata, &path).unwrap();
        assert!(model_exists(&path));

        let fresh = network_config.init_relu::<InferenceBackend>(&device);
        assert_ne!(q_values(&fresh), q_values(&trained));

        let (loaded, loaded_meta) = load_model(fresh, &config, &path, &device).unwrap();

        assert_eq!(q_values(&loaded), q_values(&trained));
        assert_eq!(loaded_meta.training_steps, 42);
        assert_eq!(loaded_meta.agent_config, config);
    }

    #[test]
    fn test_load_missing_model() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent");
        let device = default_device();
        let config = AgentConfig::worse();
        let network = QNetworkConfig::new(config.hidden_dims).init_tanh::<InferenceBackend>(&device);

        assert!(!model_exists(&path));
        let result = load_model(network, &config, &path, &device);
        assert!(matches!(result, Err(ArenaError::ModelNotFound(_))));
    }

    #[test]
    fn test_load_corrupt_weights() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrupt");
        let device = default_device();
        let config = AgentConfig::worse();

        let metadata = ModelMetadata::new("worse", config.clone(), 0);
        std::fs::write(metadata_path(&path), serde_json::to_string(&metadata).unwrap()).unwrap();
        std::fs::write(weights_path(&path), b"not a model").unwrap();

        let network = QNetworkConfig::new(config.hidden_dims).init_tanh::<InferenceBackend>(&device);
        let result = load_model(network, &config, &path, &device);
        assert!(matches!(result, Err(ArenaError::ModelLoad { .. })));
    }

    #[test]
    fn test_load_rejects_other_network_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("better");
        let device = default_device();
        let better = AgentConfig::better();
        let worse = AgentConfig::worse();

        let network = QNetworkConfig::new(better.hidden_dims).init_relu::<InferenceBackend>(&device);
        save_model(&network, &ModelMetadata::new("better", better, 0), &path).unwrap();

        let other = QNetworkConfig::new(worse.hidden_dims).init_tanh::<InferenceBackend>(&device);
        let result = load_model(other, &worse, &path, &device);
        assert!(matches!(result, Err(ArenaError::IncompatibleModel { .. })));
    }
}
