//! Decoding of raw network outputs into actuator and feedback values.
//!
//! Thrust and colour are smoothed with fixed-length moving windows so a
//! single noisy evaluation cannot jerk a cell around. Speed boost and blink
//! are latched per evaluation.

use std::collections::VecDeque;
use thiserror::Error;

pub const OUTPUT_LABELS: [&str; 8] = [
    "ThrustL",
    "ThrustR",
    "Red",
    "Green",
    "Blue",
    "SpeedBoost",
    "Blink",
    "Future",
];

pub const OUTPUT_COUNT: usize = OUTPUT_LABELS.len();
pub const THRUST_MEMORY: usize = 2;
pub const COLOR_MEMORY: usize = 10;

/// Moving average over the last `capacity` samples of a `D`-vector.
#[derive(Debug, Clone, PartialEq)]
pub struct RunningWindow<const D: usize> {
    capacity: usize,
    samples: VecDeque<[f32; D]>,
}

pub type RunningVector = RunningWindow<2>;
pub type RunningColor = RunningWindow<3>;

impl<const D: usize> RunningWindow<D> {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, sample: [f32; D]) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Component-wise mean of the retained samples; zeros when empty.
    #[must_use]
    pub fn average(&self) -> [f32; D] {
        let mut sum = [0.0; D];
        if self.samples.is_empty() {
            return sum;
        }
        for sample in &self.samples {
            for (acc, value) in sum.iter_mut().zip(sample) {
                *acc += value;
            }
        }
        let n = self.samples.len() as f32;
        sum.map(|total| total / n)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    #[error("expected {expected} network outputs, found {found}")]
    WrongLength { expected: usize, found: usize },

    #[error("network output {index} ({label}) is not finite")]
    NonFinite { index: usize, label: &'static str },
}

/// Smoothed view of a cell's most recent network outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Inference {
    thrust: RunningVector,
    color: RunningColor,
    speed_boost: bool,
    blink: bool,
    future: f32,
}

impl Default for Inference {
    fn default() -> Self {
        Self::new()
    }
}

impl Inference {
    #[must_use]
    pub fn new() -> Self {
        Self {
            thrust: RunningVector::new(THRUST_MEMORY),
            color: RunningColor::new(COLOR_MEMORY),
            speed_boost: false,
            blink: false,
            future: 0.0,
        }
    }

    /// Folds one output vector into the decoder.
    ///
    /// A vector of the wrong length or with non-finite entries is rejected
    /// and the decoder keeps its previous state.
    pub fn infer(&mut self, outputs: &[f32]) -> Result<(), InferenceError> {
        if let Err(err) = Self::check(outputs) {
            tracing::warn!(error = %err, "Discarding network outputs");
            return Err(err);
        }

        self.thrust.push([outputs[0], outputs[1]]);
        self.color.push([
            (outputs[2] + 1.0) / 2.0,
            (outputs[3] + 1.0) / 2.0,
            (outputs[4] + 1.0) / 2.0,
        ]);
        self.speed_boost = outputs[5] > 0.0;
        self.blink = outputs[6] > 0.0;
        self.future = outputs[7];
        Ok(())
    }

    fn check(outputs: &[f32]) -> Result<(), InferenceError> {
        if outputs.len() != OUTPUT_COUNT {
            return Err(InferenceError::WrongLength {
                expected: OUTPUT_COUNT,
                found: outputs.len(),
            });
        }
        match outputs.iter().position(|v| !v.is_finite()) {
            Some(index) => Err(InferenceError::NonFinite {
                index,
                label: OUTPUT_LABELS[index],
            }),
            None => Ok(()),
        }
    }

    /// Smoothed `[left, right]` thrust.
    #[must_use]
    pub fn thrust(&self) -> [f32; 2] {
        self.thrust.average()
    }

    #[must_use]
    pub fn thrust_magnitude(&self) -> f32 {
        let [left, right] = self.thrust();
        left.hypot(right)
    }

    /// Smoothed colour, each channel in `[0, 1]` for outputs in `[-1, 1]`.
    #[must_use]
    pub fn color(&self) -> [f32; 3] {
        self.color.average()
    }

    #[must_use]
    pub fn speed_boost(&self) -> bool {
        self.speed_boost
    }

    #[must_use]
    pub fn blink(&self) -> bool {
        self.blink
    }

    #[must_use]
    pub fn future(&self) -> f32 {
        self.future
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
