use super::state_encoding::EncodedState;

/// Maps an encoded state to one score per board cell.
///
/// Evaluation has no side effects; parameters change only through the
/// trainer's explicit update step.
pub trait ValueApproximator {
    fn score(&self, state: &EncodedState) -> Vec<f32>;
}

impl<V: ValueApproximator + ?Sized> ValueApproximator for &V {
    fn score(&self, state: &EncodedState) -> Vec<f32> {
        (**self).score(state)
    }
}

impl<V: ValueApproximator + ?Sized> ValueApproximator for Box<V> {
    fn score(&self, state: &EncodedState) -> Vec<f32> {
        (**self).score(state)
    }
}

/// Returns the same score for every cell regardless of the state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformScores {
    pub value: f32,
}

impl UniformScores {
    pub fn new(value: f32) -> Self {
        UniformScores { value }
    }
}

impl ValueApproximator for UniformScores {
    fn score(&self, state: &EncodedState) -> Vec<f32> {
        vec![self.value; state.cell_count()]
    }
}
