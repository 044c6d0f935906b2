use super::topology::weight_limit;
use biots_data::Genome;
use rand::Rng;

/// Single-value mutation chosen by a uniform draw in `0..6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationOperator {
    Halve,
    Double,
    Replace,
    /// Selected by three of the six outcomes.
    Nudge,
}

impl MutationOperator {
    #[must_use]
    pub fn from_selector(selector: u8) -> Self {
        match selector {
            0 => Self::Halve,
            1 => Self::Double,
            2 => Self::Replace,
            _ => Self::Nudge,
        }
    }

    pub fn sample<R: Rng>(rng: &mut R) -> Self {
        Self::from_selector(rng.gen_range(0..6))
    }

    /// Applies the operator. The result is always inside `[-max_weight, max_weight]`.
    pub fn apply<R: Rng>(self, value: f32, max_weight: f32, rng: &mut R) -> f32 {
        let limit = weight_limit(max_weight);
        if limit == 0.0 {
            return 0.0;
        }
        let value = if value.is_finite() { value } else { 0.0 };
        let mutated = match self {
            Self::Halve => value / 2.0,
            Self::Double => value * 2.0,
            Self::Replace => rng.gen_range(-limit..=limit),
            Self::Nudge => {
                let magnitude = rng.gen_range(0.25 * limit..0.5 * limit);
                if rng.gen_bool(0.5) {
                    value + magnitude
                } else {
                    value - magnitude
                }
            }
        };
        mutated.clamp(-limit, limit)
    }
}

pub fn mutate_single_value_with_rng<R: Rng>(value: f32, max_weight: f32, rng: &mut R) -> f32 {
    MutationOperator::sample(rng).apply(value, max_weight, rng)
}

/// Outcome of one `mutate` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutationSummary {
    pub weights_mutated: usize,
    pub biases_mutated: usize,
    pub skipped: usize,
}

impl MutationSummary {
    #[must_use]
    pub fn applied(&self) -> usize {
        self.weights_mutated + self.biases_mutated
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParameterKind {
    Weight,
    Bias,
}

impl ParameterKind {
    fn label(self) -> &'static str {
        match self {
            Self::Weight => "weights",
            Self::Bias => "biases",
        }
    }
}

fn mutate_entry<R: Rng>(
    genome: &mut Genome,
    kind: ParameterKind,
    layer: usize,
    index: usize,
    max_weight: f32,
    rng: &mut R,
) -> bool {
    let layers = match kind {
        ParameterKind::Weight => &mut genome.weights,
        ParameterKind::Bias => &mut genome.biases,
    };
    let Some(value) = layers
        .get_mut(layer)
        .filter(|_| layer > 0)
        .and_then(|values| values.get_mut(index))
    else {
        tracing::warn!(
            genome = %genome.id,
            kind = kind.label(),
            layer,
            index,
            "Mutation target out of range, skipped"
        );
        return false;
    };
    *value = mutate_single_value_with_rng(*value, max_weight, rng);
    true
}

/// Mutates `weights[layer][index]`. Out-of-range targets are a logged no-op.
pub fn mutate_weight<R: Rng>(
    genome: &mut Genome,
    layer: usize,
    index: usize,
    max_weight: f32,
    rng: &mut R,
) -> bool {
    mutate_entry(genome, ParameterKind::Weight, layer, index, max_weight, rng)
}

/// Mutates `biases[layer][index]`. Out-of-range targets are a logged no-op.
pub fn mutate_bias<R: Rng>(
    genome: &mut Genome,
    layer: usize,
    index: usize,
    max_weight: f32,
    rng: &mut R,
) -> bool {
    mutate_entry(genome, ParameterKind::Bias, layer, index, max_weight, rng)
}

fn mutate_random_entry<R: Rng>(
    genome: &mut Genome,
    kind: ParameterKind,
    max_weight: f32,
    rng: &mut R,
) -> bool {
    let layers = match kind {
        ParameterKind::Weight => &genome.weights,
        ParameterKind::Bias => &genome.biases,
    };
    if layers.len() < 2 {
        tracing::warn!(genome = %genome.id, kind = kind.label(), "No mutable layers, skipped");
        return false;
    }
    let layer = rng.gen_range(1..layers.len());
    let len = layers[layer].len();
    if len == 0 {
        tracing::warn!(genome = %genome.id, kind = kind.label(), layer, "Empty layer, skipped");
        return false;
    }
    let index = rng.gen_range(0..len);
    mutate_entry(genome, kind, layer, index, max_weight, rng)
}

pub fn mutate_with_rng<R: Rng>(
    genome: &mut Genome,
    mutation_rate: f32,
    max_weight: f32,
    rng: &mut R,
) -> MutationSummary {
    let rate = if mutation_rate.is_nan() {
        0.0
    } else {
        mutation_rate.clamp(0.0, 1.0)
    };
    // Exclusive bound: 0..=1 mutations at rate 0, 0..=3 at rate 1.
    let weight_bound = (2.0 + 2.0 * rate).floor() as usize;
    let weight_mutations = rng.gen_range(0..weight_bound);
    let bias_mutations = if rng.gen_bool(0.5) { 0 } else { 1 };

    let mut summary = MutationSummary::default();
    for _ in 0..weight_mutations {
        if mutate_random_entry(genome, ParameterKind::Weight, max_weight, rng) {
            summary.weights_mutated += 1;
        } else {
            summary.skipped += 1;
        }
    }
    for _ in 0..bias_mutations {
        if mutate_random_entry(genome, ParameterKind::Bias, max_weight, rng) {
            summary.biases_mutated += 1;
        } else {
            summary.skipped += 1;
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{create_genome_with_rng, WeightFill};
    use biots_data::{GenomeShape, Species};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn genome(rng: &mut ChaCha8Rng) -> Genome {
        let shape = GenomeShape::new(4, vec![3], 2);
        create_genome_with_rng(Species::Prey, &shape, WeightFill::Random, 1.0, rng)
    }

    #[test]
    fn test_selector_weighting() {
        let ops: Vec<_> = (0..6).map(MutationOperator::from_selector).collect();
        assert_eq!(ops[0], MutationOperator::Halve);
        assert_eq!(ops[1], MutationOperator::Double);
        assert_eq!(ops[2], MutationOperator::Replace);
        assert_eq!(
            ops.iter().filter(|&&op| op == MutationOperator::Nudge).count(),
            3
        );
    }

    #[test]
    fn test_double_clamps() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(MutationOperator::Double.apply(0.75, 1.0, &mut rng), 1.0);
        assert_eq!(MutationOperator::Double.apply(-0.75, 1.0, &mut rng), -1.0);
        assert_eq!(MutationOperator::Halve.apply(0.5, 1.0, &mut rng), 0.25);
    }

    #[test]
    fn test_halve_double_inverse_at_boundary() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let doubled = MutationOperator::Double.apply(0.5, 1.0, &mut rng);
        assert_eq!(MutationOperator::Halve.apply(doubled, 1.0, &mut rng), 0.5);

        let doubled = MutationOperator::Double.apply(0.6, 1.0, &mut rng);
        assert_ne!(MutationOperator::Halve.apply(doubled, 1.0, &mut rng), 0.6);
    }

    #[test]
    fn test_nudge_moves_by_quarter_to_half() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..200 {
            let v = MutationOperator::Nudge.apply(0.0, 1.0, &mut rng);
            assert!((0.25..0.5).contains(&v.abs()), "nudge produced {v}");
        }
    }

    #[test]
    fn test_degenerate_limit_yields_zero() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(mutate_single_value_with_rng(0.3, 0.0, &mut rng), 0.0);
        assert_eq!(mutate_single_value_with_rng(0.3, f32::NAN, &mut rng), 0.0);
    }

    #[test]
    fn test_out_of_range_target_is_noop() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut g = genome(&mut rng);
        let before = g.clone();
        assert!(!mutate_weight(&mut g, 0, 0, 1.0, &mut rng));
        assert!(!mutate_weight(&mut g, 9, 0, 1.0, &mut rng));
        assert!(!mutate_bias(&mut g, 1, 99, 1.0, &mut rng));
        assert_eq!(g, before);
    }

    #[test]
    fn test_mutation_counts_follow_rate() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut max_weights = 0;
        for _ in 0..500 {
            let mut g = genome(&mut rng);
            let summary = mutate_with_rng(&mut g, 0.0, 1.0, &mut rng);
            assert!(summary.weights_mutated <= 1);
            assert!(summary.biases_mutated <= 1);
            assert_eq!(summary.skipped, 0);

            let summary = mutate_with_rng(&mut g, 1.0, 1.0, &mut rng);
            assert!(summary.weights_mutated <= 3);
            max_weights = max_weights.max(summary.weights_mutated);
        }
        assert_eq!(max_weights, 3);
    }

    #[test]
    fn test_rate_is_clamped() {
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        for _ in 0..200 {
            let mut g = genome(&mut rng);
            let summary = mutate_with_rng(&mut g, 50.0, 1.0, &mut rng);
            assert!(summary.weights_mutated <= 3);
            let summary = mutate_with_rng(&mut g, -3.0, 1.0, &mut rng);
            assert!(summary.weights_mutated <= 1);
        }
    }

    #[test]
    fn test_input_placeholders_never_mutated() {
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let mut g = genome(&mut rng);
        for _ in 0..100 {
            mutate_with_rng(&mut g, 1.0, 1.0, &mut rng);
        }
        assert!(g.weights[0].is_empty());
        assert!(g.biases[0].is_empty());
        assert!(g.validate().is_ok());
    }
}
