//! Reference dense forward pass.

use biots_core::NetworkEvaluator;
use biots_data::Genome;

/// Fully connected tanh network over a genome's layers.
///
/// Layer `l` weights are stored row-major by target node: the weight from
/// node `i` of layer `l - 1` to node `j` of layer `l` sits at
/// `weights[l][j * prev + i]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseEvaluator;

impl DenseEvaluator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Runs the network, or `None` when `inputs` does not fit the input layer.
    #[must_use]
    pub fn forward(genome: &Genome, inputs: &[f32]) -> Option<Vec<f32>> {
        if inputs.len() != genome.input_count() {
            return None;
        }
        let mut values = inputs.to_vec();
        for (weights, biases) in genome.weights.iter().zip(&genome.biases).skip(1) {
            let prev = values.len();
            if weights.len() != prev * biases.len() {
                return None;
            }
            values = biases
                .iter()
                .zip(weights.chunks_exact(prev))
                .map(|(bias, row)| {
                    let sum: f32 = row.iter().zip(&values).map(|(w, v)| w * v).sum();
                    (sum + bias).tanh()
                })
                .collect();
        }
        Some(values)
    }
}

impl NetworkEvaluator for DenseEvaluator {
    fn evaluate(&self, genome: &Genome, inputs: &[f32]) -> Option<Vec<f32>> {
        Self::forward(genome, inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use biots_core::genome::WeightFill;
    use biots_core::GenomeLogic;
    use biots_data::{GenomeShape, Species};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_constant_network() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let shape = GenomeShape::new(3, vec![2], 2);
        let genome =
            Genome::new_with_fill(Species::Prey, &shape, WeightFill::Constant(0.5), 1.0, &mut rng);

        let outputs = DenseEvaluator::forward(&genome, &[1.0, 1.0, 1.0]).unwrap();
        assert_eq!(outputs.len(), 2);

        let hidden = (1.5f32 + genome.biases[1][0]).tanh();
        let expected = (0.5 * hidden * 2.0 + genome.biases[2][0]).tanh();
        assert!((outputs[0] - expected).abs() < 1e-6);
    }

    #[test]
    fn test_outputs_bounded() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let shape = GenomeShape::new(4, vec![6, 5], 8);
        let genome = Genome::new_random_with_rng(Species::Prey, &shape, 1.0, &mut rng);
        let outputs = DenseEvaluator.evaluate(&genome, &[1.0, -1.0, 0.5, 0.0]).unwrap();
        assert_eq!(outputs.len(), 8);
        assert!(outputs.iter().all(|v| (-1.0..=1.0).contains(v)));
    }

    #[test]
    fn test_wrong_input_length() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let shape = GenomeShape::new(4, vec![2], 2);
        let genome = Genome::new_random_with_rng(Species::Prey, &shape, 1.0, &mut rng);
        assert!(DenseEvaluator::forward(&genome, &[1.0]).is_none());
    }
}
