use std::path::{Path, PathBuf};

use burn::nn::{Linear, LinearConfig, Relu};
use burn::prelude::*;
use burn::record::DefaultRecorder;

use crate::ai::approximator::ValueApproximator;
use crate::ai::state_encoding::{encode_states_batch, EncodedState};
use crate::error::ModelError;

/// Two-layer value network scoring every board cell.
///
/// ```text
/// Input:  [batch, W*H + 2]   (cells, turn, game-over flag)
/// FC1:    W*H + 2 -> hidden, ReLU
/// FC2:    hidden -> W*H      (one value per cell)
/// ```
#[derive(Module, Debug)]
pub struct ValueNetwork<B: Backend> {
    fc1: Linear<B>,
    fc2: Linear<B>,
    relu: Relu,
}

#[derive(Config, Debug)]
pub struct ValueNetworkConfig {
    pub input_size: usize,
    pub hidden_size: usize,
    pub output_size: usize,
}

impl ValueNetworkConfig {
    /// Sizes for a `width` x `height` board.
    pub fn for_board(width: usize, height: usize, hidden_size: usize) -> Self {
        let cells = width * height;
        ValueNetworkConfig::new(cells + 2, hidden_size, cells)
    }

    /// `[input, hidden, output]`
    pub fn shape(&self) -> [usize; 3] {
        [self.input_size, self.hidden_size, self.output_size]
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> ValueNetwork<B> {
        ValueNetwork {
            fc1: LinearConfig::new(self.input_size, self.hidden_size).init(device),
            fc2: LinearConfig::new(self.hidden_size, self.output_size).init(device),
            relu: Relu::new(),
        }
    }
}

/// Extension the default (named MessagePack) recorder gives its files.
const MODEL_EXTENSION: &str = "mpk";

/// Path the recorder actually writes for a requested model path.
pub fn model_file_path(path: &Path) -> PathBuf {
    path.with_extension(MODEL_EXTENSION)
}

impl<B: Backend> ValueNetwork<B> {
    /// Forward pass: input [batch, W*H+2] -> output [batch, W*H] cell values.
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.relu.forward(self.fc1.forward(input));
        self.fc2.forward(x)
    }

    /// Layer sizes read from the weights: `[input, hidden, output]`.
    pub fn shape(&self) -> [usize; 3] {
        let [input, hidden] = self.fc1.weight.val().dims();
        let [_, output] = self.fc2.weight.val().dims();
        [input, hidden, output]
    }

    /// Save all parameters. Returns the file written.
    pub fn save(&self, path: &Path) -> Result<PathBuf, ModelError> {
        let file = model_file_path(path);
        if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ModelError::Save {
                path: file.clone(),
                message: e.to_string(),
            })?;
        }
        self.clone()
            .save_file(path.to_path_buf(), &DefaultRecorder::default())
            .map_err(|e| ModelError::Save {
                path: file.clone(),
                message: e.to_string(),
            })?;
        Ok(file)
    }

    /// Restore parameters saved by [`ValueNetwork::save`].
    ///
    /// A missing file is reported as [`ModelError::NotFound`] so callers can
    /// fall back to fresh parameters; a file whose layer sizes differ from
    /// `config` fails with [`ModelError::ShapeMismatch`].
    pub fn load(
        config: &ValueNetworkConfig,
        path: &Path,
        device: &B::Device,
    ) -> Result<Self, ModelError> {
        let file = model_file_path(path);
        if !file.exists() {
            return Err(ModelError::NotFound(file));
        }

        let network = config
            .init::<B>(device)
            .load_file(path.to_path_buf(), &DefaultRecorder::default(), device)
            .map_err(|e| ModelError::Load {
                path: file.clone(),
                message: e.to_string(),
            })?;

        let actual = network.shape();
        if actual != config.shape() {
            return Err(ModelError::ShapeMismatch {
                path: file,
                expected: config.shape(),
                actual,
            });
        }
        Ok(network)
    }
}

impl<B: Backend> ValueApproximator for ValueNetwork<B> {
    fn score(&self, state: &EncodedState) -> Vec<f32> {
        let device = self.fc1.weight.val().device();
        let input = encode_states_batch::<B>([state], &device);
        self.forward(input)
            .into_data()
            .convert::<f32>()
            .to_vec()
            .expect("f32 tensor data extraction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::state_encoding::encode_state;
    use crate::game::HipGame;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_network_output_shape() {
        let device = Default::default();
        let config = ValueNetworkConfig::for_board(3, 3, 16);
        let network = config.init::<TestBackend>(&device);

        let input = Tensor::zeros([4, 11], &device);
        let output = network.forward(input);
        assert_eq!(output.dims(), [4, 9]);
        assert_eq!(network.shape(), [11, 16, 9]);
    }

    #[test]
    fn test_score_is_side_effect_free() {
        let device = Default::default();
        let network = ValueNetworkConfig::for_board(4, 3, 8).init::<TestBackend>(&device);
        let state = encode_state(&HipGame::new(4, 3).state());

        let first = network.score(&state);
        let second = network.score(&state);
        assert_eq!(first.len(), 12);
        assert_eq!(first, second);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("value");
        let device = Default::default();
        let config = ValueNetworkConfig::for_board(3, 3, 8);
        let network = config.init::<TestBackend>(&device);

        let written = network.save(&path).unwrap();
        assert!(written.exists());
        assert_eq!(written, dir.path().join("models").join("value.mpk"));

        let loaded = ValueNetwork::<TestBackend>::load(&config, &path, &device).unwrap();
        let state = encode_state(&HipGame::new(3, 3).state());
        let a = network.score(&state);
        let b = loaded.score(&state);
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let device = Default::default();
        let config = ValueNetworkConfig::for_board(3, 3, 8);
        let err = ValueNetwork::<TestBackend>::load(&config, &dir.path().join("absent"), &device)
            .unwrap_err();
        assert!(matches!(err, ModelError::NotFound(_)), "got {err}");
    }

    #[test]
    fn test_load_shape_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("value");
        let device = Default::default();
        ValueNetworkConfig::for_board(3, 3, 16)
            .init::<TestBackend>(&device)
            .save(&path)
            .unwrap();

        let config = ValueNetworkConfig::for_board(3, 3, 8);
        let err = ValueNetwork::<TestBackend>::load(&config, &path, &device).unwrap_err();
        match err {
            ModelError::ShapeMismatch {
                expected, actual, ..
            } => {
                assert_eq!(expected, [11, 8, 9]);
                assert_eq!(actual, [11, 16, 9]);
            }
            other => panic!("expected shape mismatch, got {other}"),
        }
    }
}
