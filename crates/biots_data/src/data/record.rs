//! Wire format of a persisted genome.
//!
//! Current records carry `hiddenCounts`. Older pools were written with a
//! single `hiddenCount`, no species and string-typed markers; those records
//! are upgraded to the general layout when converted into a [`Genome`].

use super::genome::{Genome, GenomeError, GenomeShape, Species};
use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenomeRecord {
    pub id: String,
    #[serde(default)]
    pub generation: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<Species>,
    #[serde(default)]
    pub is_predator: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub marker1: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub marker2: bool,
    pub input_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_counts: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_count: Option<usize>,
    pub output_count: usize,
    #[serde(default)]
    pub weights: Vec<Vec<f32>>,
    #[serde(default)]
    pub biases: Vec<Vec<f32>>,
}

impl GenomeRecord {
    /// True for single-hidden-layer records written before `hiddenCounts`.
    #[must_use]
    pub fn is_legacy(&self) -> bool {
        self.hidden_counts.is_none() && self.hidden_count.is_some()
    }
}

impl TryFrom<GenomeRecord> for Genome {
    type Error = GenomeError;

    fn try_from(record: GenomeRecord) -> Result<Self, Self::Error> {
        let hidden_counts = match (record.hidden_counts, record.hidden_count) {
            (Some(counts), _) => counts,
            (None, Some(count)) => vec![count],
            (None, None) => return Err(GenomeError::MissingTopology { id: record.id }),
        };
        let species = record.species.unwrap_or(if record.is_predator {
            Species::Predator
        } else {
            Species::Neutral
        });

        let genome = Genome {
            id: record.id,
            generation: record.generation,
            species,
            markers: [record.marker1, record.marker2],
            shape: GenomeShape::new(record.input_count, hidden_counts, record.output_count),
            weights: record.weights,
            biases: record.biases,
        };
        genome.validate()?;
        Ok(genome)
    }
}

impl From<Genome> for GenomeRecord {
    fn from(genome: Genome) -> Self {
        Self {
            id: genome.id,
            generation: genome.generation,
            species: Some(genome.species),
            is_predator: genome.species.is_predator(),
            marker1: genome.markers[0],
            marker2: genome.markers[1],
            input_count: genome.shape.input_count,
            hidden_counts: Some(genome.shape.hidden_counts),
            hidden_count: None,
            output_count: genome.shape.output_count,
            weights: genome.weights,
            biases: genome.biases,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientBool {
    Bool(bool),
    Text(String),
}

/// Markers were once written as `"true"` / `"false"` strings.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match LenientBool::deserialize(deserializer)? {
        LenientBool::Bool(value) => Ok(value),
        LenientBool::Text(text) => match text.trim() {
            "true" | "1" => Ok(true),
            "false" | "0" | "" => Ok(false),
            other => Err(D::Error::custom(format!("invalid marker value {other:?}"))),
        },
    }
}
