pub mod mutation;
pub mod topology;

pub use biots_data::{Genome, GenomeShape, Species};
pub use mutation::{mutate_bias, mutate_single_value_with_rng, mutate_weight, MutationOperator, MutationSummary};
pub use topology::{create_genome_with_rng, dispensed_id, new_genome_id, WeightFill};

use rand::Rng;

/// Chance that a derived child flips an active lineage marker.
pub const MARKER_DRIFT_CHANCE: f64 = 1.0 / 3.0;

/// Trait defining the genetic operations on a [`Genome`].
pub trait GenomeLogic: Sized {
    fn new_random_with_rng<R: Rng>(
        species: Species,
        shape: &GenomeShape,
        max_weight: f32,
        rng: &mut R,
    ) -> Self;

    fn new_with_fill<R: Rng>(
        species: Species,
        shape: &GenomeShape,
        fill: WeightFill,
        max_weight: f32,
        rng: &mut R,
    ) -> Self;

    /// Clone with a new id and `generation + 1`, then mutated.
    #[must_use]
    fn derive_child_with_rng<R: Rng>(&self, mutation_rate: f32, max_weight: f32, rng: &mut R)
        -> Self;

    fn mutate_with_rng<R: Rng>(
        &mut self,
        mutation_rate: f32,
        max_weight: f32,
        rng: &mut R,
    ) -> MutationSummary;

    fn drift_markers_with_rng<R: Rng>(&mut self, markers_in_effect: u8, rng: &mut R);
}

impl GenomeLogic for Genome {
    fn new_random_with_rng<R: Rng>(
        species: Species,
        shape: &GenomeShape,
        max_weight: f32,
        rng: &mut R,
    ) -> Self {
        topology::create_genome_with_rng(species, shape, WeightFill::Random, max_weight, rng)
    }

    fn new_with_fill<R: Rng>(
        species: Species,
        shape: &GenomeShape,
        fill: WeightFill,
        max_weight: f32,
        rng: &mut R,
    ) -> Self {
        topology::create_genome_with_rng(species, shape, fill, max_weight, rng)
    }

    fn derive_child_with_rng<R: Rng>(
        &self,
        mutation_rate: f32,
        max_weight: f32,
        rng: &mut R,
    ) -> Self {
        let mut child = self.clone();
        child.id = topology::new_genome_id(rng);
        child.generation = self.generation.saturating_add(1);
        let summary = child.mutate_with_rng(mutation_rate, max_weight, rng);
        tracing::trace!(
            parent = self.id_formatted(),
            child = child.id_formatted(),
            generation = child.generation,
            mutated = summary.applied(),
            skipped = summary.skipped,
            "Derived child genome"
        );
        child
    }

    fn mutate_with_rng<R: Rng>(
        &mut self,
        mutation_rate: f32,
        max_weight: f32,
        rng: &mut R,
    ) -> MutationSummary {
        mutation::mutate_with_rng(self, mutation_rate, max_weight, rng)
    }

    fn drift_markers_with_rng<R: Rng>(&mut self, markers_in_effect: u8, rng: &mut R) {
        for marker in self.markers.iter_mut().take(usize::from(markers_in_effect)) {
            if rng.gen_bool(MARKER_DRIFT_CHANCE) {
                *marker = !*marker;
            }
        }
    }
}
