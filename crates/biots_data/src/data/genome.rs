use super::record::GenomeRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Species tag of a genome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    /// Untagged genome. Counts as prey when species quotas are in effect.
    #[default]
    Neutral,
    /// Grazer.
    Prey,
    /// Hunter.
    Predator,
}

impl Species {
    #[must_use]
    pub fn is_predator(self) -> bool {
        matches!(self, Self::Predator)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Neutral => "neutral",
            Self::Prey => "prey",
            Self::Predator => "predator",
        };
        f.write_str(name)
    }
}

/// Layer sizes of a feed-forward network: `[input, hidden..., output]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenomeShape {
    pub input_count: usize,
    pub hidden_counts: Vec<usize>,
    pub output_count: usize,
}

impl GenomeShape {
    #[must_use]
    pub fn new(input_count: usize, hidden_counts: Vec<usize>, output_count: usize) -> Self {
        Self {
            input_count,
            hidden_counts,
            output_count,
        }
    }

    /// Node count of every layer, input first.
    #[must_use]
    pub fn node_counts(&self) -> Vec<usize> {
        let mut counts = Vec::with_capacity(self.hidden_counts.len() + 2);
        counts.push(self.input_count);
        counts.extend_from_slice(&self.hidden_counts);
        counts.push(self.output_count);
        counts
    }

    /// Expected weight count per layer. Layer 0 has no incoming edges.
    #[must_use]
    pub fn weight_counts(&self) -> Vec<usize> {
        let nodes = self.node_counts();
        std::iter::once(0)
            .chain(nodes.windows(2).map(|pair| pair[0] * pair[1]))
            .collect()
    }

    /// Expected bias count per layer. Layer 0 has no biases.
    #[must_use]
    pub fn bias_counts(&self) -> Vec<usize> {
        std::iter::once(0)
            .chain(self.node_counts().into_iter().skip(1))
            .collect()
    }

    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.hidden_counts.len() + 2
    }
}

/// Invariant violations detected while building or loading a genome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenomeError {
    #[error("genome {id}: record carries neither hiddenCounts nor hiddenCount")]
    MissingTopology { id: String },

    #[error("genome {id}: at least one hidden layer is required")]
    NoHiddenLayers { id: String },

    #[error("genome {id}: layer {layer} has no nodes")]
    EmptyLayer { id: String, layer: usize },

    #[error("genome {id}: expected {expected} {kind} layers, found {found}")]
    LayerCount {
        id: String,
        kind: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("genome {id}: {kind} layer {layer} holds {found} values, expected {expected}")]
    LayerSize {
        id: String,
        kind: &'static str,
        layer: usize,
        expected: usize,
        found: usize,
    },

    #[error("genome {id}: {kind} layer {layer} index {index} is not finite")]
    NonFinite {
        id: String,
        kind: &'static str,
        layer: usize,
        index: usize,
    },
}

/// Heritable encoding of a feed-forward network.
///
/// `weights[l]` holds the `node_counts[l] * node_counts[l - 1]` incoming edge
/// weights of layer `l` and `biases[l]` its `node_counts[l]` biases. Index 0
/// of both is an empty placeholder for the input layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GenomeRecord", into = "GenomeRecord")]
pub struct Genome {
    pub id: String,
    pub generation: u32,
    pub species: Species,
    pub markers: [bool; 2],
    pub shape: GenomeShape,
    pub weights: Vec<Vec<f32>>,
    pub biases: Vec<Vec<f32>>,
}

impl Genome {
    #[must_use]
    pub fn node_counts(&self) -> Vec<usize> {
        self.shape.node_counts()
    }

    #[must_use]
    pub fn input_count(&self) -> usize {
        self.shape.input_count
    }

    #[must_use]
    pub fn output_count(&self) -> usize {
        self.shape.output_count
    }

    #[must_use]
    pub fn is_predator(&self) -> bool {
        self.species.is_predator()
    }

    #[must_use]
    pub fn marker(&self, index: usize) -> bool {
        self.markers.get(index).copied().unwrap_or(false)
    }

    /// Total number of weights and biases.
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.weights.iter().map(Vec::len).sum::<usize>()
            + self.biases.iter().map(Vec::len).sum::<usize>()
    }

    /// First eight characters of the id, for log lines.
    #[must_use]
    pub fn id_formatted(&self) -> &str {
        match self.id.char_indices().nth(8) {
            Some((end, _)) => &self.id[..end],
            None => &self.id,
        }
    }

    /// Checks the layer layout and parameter values against the shape.
    pub fn validate(&self) -> Result<(), GenomeError> {
        if self.shape.hidden_counts.is_empty() {
            return Err(GenomeError::NoHiddenLayers {
                id: self.id.clone(),
            });
        }
        if let Some(layer) = self.node_counts().iter().position(|&count| count == 0) {
            return Err(GenomeError::EmptyLayer {
                id: self.id.clone(),
                layer,
            });
        }
        self.validate_layers("weights", &self.weights, &self.shape.weight_counts())?;
        self.validate_layers("biases", &self.biases, &self.shape.bias_counts())
    }

    fn validate_layers(
        &self,
        kind: &'static str,
        layers: &[Vec<f32>],
        expected: &[usize],
    ) -> Result<(), GenomeError> {
        if layers.len() != expected.len() {
            return Err(GenomeError::LayerCount {
                id: self.id.clone(),
                kind,
                expected: expected.len(),
                found: layers.len(),
            });
        }
        for (layer, (values, &count)) in layers.iter().zip(expected).enumerate() {
            if values.len() != count {
                return Err(GenomeError::LayerSize {
                    id: self.id.clone(),
                    kind,
                    layer,
                    expected: count,
                    found: values.len(),
                });
            }
            if let Some(index) = values.iter().position(|v| !v.is_finite()) {
                return Err(GenomeError::NonFinite {
                    id: self.id.clone(),
                    kind,
                    layer,
                    index,
                });
            }
        }
        Ok(())
    }

    /// Serialize genome to hex string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        hex::encode(bytes)
    }

    /// Deserialize genome from hex string.
    pub fn from_hex(hex_str: &str) -> anyhow::Result<Self> {
        let bytes = hex::decode(hex_str.trim())?;
        let genome = serde_json::from_slice(&bytes)?;
        Ok(genome)
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{id: {}, gen: {}, species: {}, markers: {}|{}, nodes: {:?}}}",
            self.id_formatted(),
            self.generation,
            self.species,
            u8::from(self.markers[0]),
            u8::from(self.markers[1]),
            self.node_counts()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genome(shape: GenomeShape) -> Genome {
        let weights = shape
            .weight_counts()
            .into_iter()
            .map(|n| vec![0.25; n])
            .collect();
        let biases = shape
            .bias_counts()
            .into_iter()
            .map(|n| vec![-0.5; n])
            .collect();
        Genome {
            id: "0123456789abcdef".to_string(),
            generation: 3,
            species: Species::Prey,
            markers: [true, false],
            shape,
            weights,
            biases,
        }
    }

    #[test]
    fn test_shape_counts() {
        let shape = GenomeShape::new(10, vec![8], 8);
        assert_eq!(shape.node_counts(), vec![10, 8, 8]);
        assert_eq!(shape.weight_counts(), vec![0, 80, 64]);
        assert_eq!(shape.bias_counts(), vec![0, 8, 8]);
    }

    #[test]
    fn test_deep_shape_counts() {
        let shape = GenomeShape::new(4, vec![3, 5], 2);
        assert_eq!(shape.weight_counts(), vec![0, 12, 15, 10]);
        assert_eq!(shape.bias_counts(), vec![0, 3, 5, 2]);
        assert_eq!(shape.layer_count(), 4);
    }

    #[test]
    fn test_valid_genome_passes() {
        let g = genome(GenomeShape::new(4, vec![3, 5], 2));
        assert!(g.validate().is_ok());
        assert_eq!(g.parameter_count(), 12 + 15 + 10 + 3 + 5 + 2);
    }

    #[test]
    fn test_wrong_layer_size_rejected() {
        let mut g = genome(GenomeShape::new(4, vec![3], 2));
        g.weights[1].pop();
        assert_eq!(
            g.validate(),
            Err(GenomeError::LayerSize {
                id: g.id.clone(),
                kind: "weights",
                layer: 1,
                expected: 12,
                found: 11,
            })
        );
    }

    #[test]
    fn test_nan_rejected() {
        let mut g = genome(GenomeShape::new(4, vec![3], 2));
        g.biases[2][1] = f32::NAN;
        assert!(matches!(
            g.validate(),
            Err(GenomeError::NonFinite { layer: 2, index: 1, .. })
        ));
    }

    #[test]
    fn test_missing_hidden_layer_rejected() {
        let g = genome(GenomeShape::new(4, vec![], 2));
        assert!(matches!(g.validate(), Err(GenomeError::NoHiddenLayers { .. })));
    }

    #[test]
    fn test_id_formatted() {
        let g = genome(GenomeShape::new(1, vec![1], 1));
        assert_eq!(g.id_formatted(), "01234567");
    }

    #[test]
    fn test_hex_roundtrip() {
        let g = genome(GenomeShape::new(3, vec![2], 2));
        let restored = Genome::from_hex(&g.to_hex()).unwrap();
        assert_eq!(g, restored);
    }
}
