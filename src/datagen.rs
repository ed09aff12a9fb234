//! Scaled test-data generation.
//!
//! A generator owns one [`Xorshift32`] stream. Each task execution gets its
//! own generator built from the run seed, so the same (seed, task, scale)
//! always produces the same parameter buffer.

use crate::codec;
use crate::error::{BenchError, Result};
use crate::params::{JsonParseParams, MandelbrotParams, MatrixMulParams, TaskKind, TaskParams};
use crate::random::Xorshift32;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named input size of a benchmark run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Micro,
    Small,
    Medium,
    Large,
}

impl Scale {
    pub const ALL: [Scale; 4] = [Self::Micro, Self::Small, Self::Medium, Self::Large];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Micro => "micro",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    /// (width = height, max_iter) of the rendered grid
    pub fn mandelbrot_grid(&self) -> (u32, u32) {
        match self {
            Self::Micro => (32, 64),
            Self::Small => (128, 256),
            Self::Medium => (512, 500),
            Self::Large => (1024, 1000),
        }
    }

    pub fn json_record_count(&self) -> u32 {
        match self {
            Self::Micro => 100,
            Self::Small => 1_000,
            Self::Medium => 10_000,
            Self::Large => 100_000,
        }
    }

    pub fn matrix_dimension(&self) -> u32 {
        match self {
            Self::Micro => 16,
            Self::Small => 64,
            Self::Medium => 256,
            Self::Large => 512,
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scale {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|scale| scale.name() == s)
            .ok_or_else(|| BenchError::config(format!("unknown scale `{s}`")))
    }
}

/// Mandelbrot view used at every scale: the whole visible set
pub const MANDELBROT_CENTER: (f64, f64) = (-0.5, 0.0);
pub const MANDELBROT_SCALE_FACTOR: f64 = 3.0;

/// Builds task parameters at a named scale from a seeded stream
pub struct TestDataGenerator {
    rng: Xorshift32,
}

impl TestDataGenerator {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: Xorshift32::new(seed),
        }
    }

    /// Parameters for `task` at `scale`; task seeds are drawn from the stream
    pub fn generate(&mut self, task: TaskKind, scale: Scale) -> TaskParams {
        match task {
            TaskKind::Mandelbrot => {
                let (side, max_iter) = scale.mandelbrot_grid();
                MandelbrotParams {
                    width: side,
                    height: side,
                    max_iter,
                    center_real: MANDELBROT_CENTER.0,
                    center_imag: MANDELBROT_CENTER.1,
                    scale_factor: MANDELBROT_SCALE_FACTOR,
                }
                .into()
            }
            TaskKind::JsonParse => JsonParseParams {
                record_count: scale.json_record_count(),
                seed: self.rng.next_u32(),
            }
            .into(),
            TaskKind::MatrixMul => MatrixMulParams {
                dimension: scale.matrix_dimension(),
                seed: self.rng.next_u32(),
            }
            .into(),
        }
    }

    /// Encoded parameter buffer ready to be written into a module
    pub fn payload(&mut self, task: TaskKind, scale: Scale) -> Vec<u8> {
        codec::encode(&self.generate(task, scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_params_are_valid_at_every_scale() {
        let mut generator = TestDataGenerator::new(12345);
        for task in TaskKind::ALL {
            for scale in Scale::ALL {
                let params = generator.generate(task, scale);
                assert_eq!(params.kind(), task);
                assert!(params.is_valid(), "{task}/{scale} produced {params:?}");
            }
        }
    }

    #[test]
    fn test_same_seed_same_payload() {
        let mut a = TestDataGenerator::new(42);
        let mut b = TestDataGenerator::new(42);
        for task in TaskKind::ALL {
            assert_eq!(a.payload(task, Scale::Small), b.payload(task, Scale::Small));
        }
    }

    #[test]
    fn test_seeds_come_from_the_stream() {
        let mut generator = TestDataGenerator::new(1);
        let mut rng = Xorshift32::new(1);
        match generator.generate(TaskKind::MatrixMul, Scale::Micro) {
            TaskParams::MatrixMul(p) => {
                assert_eq!(p.seed, rng.next_u32());
                assert_eq!(p.dimension, 16);
            }
            other => panic!("unexpected params {other:?}"),
        }
    }

    #[test]
    fn test_scales_grow() {
        for pair in Scale::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].matrix_dimension() < pair[1].matrix_dimension());
            assert!(pair[0].json_record_count() < pair[1].json_record_count());
        }
    }

    #[test]
    fn test_scale_parse() {
        assert_eq!("medium".parse::<Scale>().unwrap(), Scale::Medium);
        assert!("huge".parse::<Scale>().is_err());
        assert_eq!(serde_json::to_string(&Scale::Large).unwrap(), "\"large\"");
    }
}
