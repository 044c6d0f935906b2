use biots_data::{Genome, GenomeShape, Species};
use rand::Rng;

/// How the parameters of a fresh genome are initialized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightFill {
    /// Uniform in `[-max_weight, max_weight]`.
    Random,
    /// Every weight and bias set to the value, clamped into range.
    Constant(f32),
}

pub fn new_genome_id<R: Rng>(rng: &mut R) -> String {
    uuid::Builder::from_random_bytes(rng.gen())
        .into_uuid()
        .to_string()
}

/// Largest usable magnitude; zero for degenerate limits.
pub(crate) fn weight_limit(max_weight: f32) -> f32 {
    if max_weight.is_finite() && max_weight > 0.0 {
        max_weight
    } else {
        0.0
    }
}

pub fn create_genome_with_rng<R: Rng>(
    species: Species,
    shape: &GenomeShape,
    fill: WeightFill,
    max_weight: f32,
    rng: &mut R,
) -> Genome {
    let limit = weight_limit(max_weight);
    let sample = |rng: &mut R| match fill {
        WeightFill::Random if limit > 0.0 => rng.gen_range(-limit..=limit),
        WeightFill::Random => 0.0,
        WeightFill::Constant(value) if value.is_finite() => value.clamp(-limit, limit),
        WeightFill::Constant(_) => 0.0,
    };

    let layers = |counts: Vec<usize>, rng: &mut R| -> Vec<Vec<f32>> {
        counts
            .into_iter()
            .map(|count| (0..count).map(|_| sample(rng)).collect())
            .collect()
    };
    let weights = layers(shape.weight_counts(), rng);
    let biases = layers(shape.bias_counts(), rng);

    Genome {
        id: new_genome_id(rng),
        generation: 0,
        species,
        markers: [false, false],
        shape: shape.clone(),
        weights,
        biases,
    }
}

/// Distinct id for a dispensed copy of a seed genome.
#[must_use]
pub fn dispensed_id(seed_id: &str, cursor: usize) -> String {
    format!("{seed_id}-{cursor}")
}
