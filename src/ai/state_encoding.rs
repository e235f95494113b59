use burn::prelude::*;
use burn::tensor::TensorData;

use crate::game::GameState;

/// Fixed-length vector consumed by the value approximator.
///
/// Layout: `width * height` cell values (0 empty, 1 or 2 for the occupant),
/// then the signed turn indicator, then the game-over flag.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedState {
    values: Vec<f32>,
}

impl EncodedState {
    /// Build from raw values. `values` must hold at least the two trailing scalars.
    pub fn from_values(values: Vec<f32>) -> Self {
        debug_assert!(values.len() >= 2);
        EncodedState { values }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of board cells encoded.
    pub fn cell_count(&self) -> usize {
        self.values.len() - 2
    }

    pub fn cells(&self) -> &[f32] {
        &self.values[..self.cell_count()]
    }

    pub fn turn(&self) -> f32 {
        self.values[self.values.len() - 2]
    }

    pub fn is_game_over(&self) -> bool {
        self.values[self.values.len() - 1] != 0.0
    }

    /// Flat indices of empty cells; empty when the game is over.
    pub fn legal_indices(&self) -> Vec<usize> {
        if self.is_game_over() {
            return Vec::new();
        }
        self.cells()
            .iter()
            .enumerate()
            .filter(|(_, v)| **v == 0.0)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Encode a game state as `[cells..., turn, game_over]`.
pub fn encode_state(state: &GameState) -> EncodedState {
    let cells = state.board().cells();
    let mut values = Vec::with_capacity(cells.len() + 2);
    values.extend(cells.iter().map(|c| c.value()));
    values.push(state.current_player().turn_encoding());
    values.push(if state.is_terminal() { 1.0 } else { 0.0 });
    EncodedState { values }
}

/// Encode multiple states as a batched tensor of shape [batch, len].
pub fn encode_states_batch<'a, B: Backend>(
    states: impl IntoIterator<Item = &'a EncodedState>,
    device: &B::Device,
) -> Tensor<B, 2> {
    let mut flat = Vec::new();
    let mut batch_size = 0;
    let mut width = 0;
    for state in states {
        width = state.len();
        flat.extend_from_slice(state.as_slice());
        batch_size += 1;
    }
    Tensor::<B, 2>::from_data(TensorData::new(flat, [batch_size, width]), device)
}
