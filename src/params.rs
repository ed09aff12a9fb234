//! Task parameter types and validation.
//!
//! A parameter struct that fails validation never reaches a compute stage;
//! the task returns the sentinel hash `0` instead.

use crate::error::{BenchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MAX_IMAGE_DIMENSION: u32 = 10_000;
pub const MAX_TOTAL_PIXELS: u32 = 100_000_000;
pub const MAX_RECORD_COUNT: u32 = 1_000_000;
pub const MAX_MATRIX_DIMENSION: u32 = 2000;
/// Upper bound for the three f32 matrices of a multiplication
pub const MAX_MATRIX_BYTES: u32 = 256 * 1024 * 1024;

/// The benchmark tasks
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Mandelbrot,
    JsonParse,
    MatrixMul,
}

impl TaskKind {
    pub const ALL: [TaskKind; 3] = [Self::Mandelbrot, Self::JsonParse, Self::MatrixMul];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mandelbrot => "mandelbrot",
            Self::JsonParse => "json_parse",
            Self::MatrixMul => "matrix_mul",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TaskKind {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mandelbrot" => Ok(Self::Mandelbrot),
            "json_parse" | "json" => Ok(Self::JsonParse),
            "matrix_mul" | "matrix" => Ok(Self::MatrixMul),
            other => Err(BenchError::config(format!("unknown task `{other}`"))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MandelbrotParams {
    pub width: u32,
    pub height: u32,
    pub max_iter: u32,
    pub center_real: f64,
    pub center_imag: f64,
    pub scale_factor: f64,
}

impl MandelbrotParams {
    pub fn validate(&self) -> Result<()> {
        let reject = |reason: &str| {
            Err(BenchError::InvalidParams {
                task: "mandelbrot",
                reason: reason.to_string(),
            })
        };

        if self.width == 0 || self.height == 0 {
            return reject("width and height must be positive");
        }
        if self.width > MAX_IMAGE_DIMENSION || self.height > MAX_IMAGE_DIMENSION {
            return reject("image dimension exceeds 10000");
        }
        match self.width.checked_mul(self.height) {
            Some(total) if total <= MAX_TOTAL_PIXELS => {}
            _ => return reject("total pixel count exceeds limit"),
        }
        if !self.center_real.is_finite()
            || !self.center_imag.is_finite()
            || !self.scale_factor.is_finite()
        {
            return reject("center and scale must be finite");
        }
        if self.scale_factor <= 0.0 {
            return reject("scale factor must be positive");
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JsonParseParams {
    pub record_count: u32,
    pub seed: u32,
}

impl JsonParseParams {
    pub fn validate(&self) -> Result<()> {
        if self.record_count == 0 || self.record_count > MAX_RECORD_COUNT {
            return Err(BenchError::InvalidParams {
                task: "json_parse",
                reason: format!(
                    "record count {} outside [1, {}]",
                    self.record_count, MAX_RECORD_COUNT
                ),
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatrixMulParams {
    pub dimension: u32,
    pub seed: u32,
}

impl MatrixMulParams {
    pub fn validate(&self) -> Result<()> {
        let reject = |reason: String| {
            Err(BenchError::InvalidParams {
                task: "matrix_mul",
                reason,
            })
        };

        if self.dimension == 0 || self.dimension > MAX_MATRIX_DIMENSION {
            return reject(format!(
                "dimension {} outside [1, {}]",
                self.dimension, MAX_MATRIX_DIMENSION
            ));
        }
        // Three f32 matrices must fit the memory budget
        let total_bytes = self
            .dimension
            .checked_mul(self.dimension)
            .and_then(|elements| elements.checked_mul(4))
            .and_then(|bytes| bytes.checked_mul(3));
        match total_bytes {
            Some(bytes) if bytes <= MAX_MATRIX_BYTES => Ok(()),
            _ => reject("matrices exceed memory budget".to_string()),
        }
    }
}

/// Parameters for one task invocation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskParams {
    Mandelbrot(MandelbrotParams),
    JsonParse(JsonParseParams),
    MatrixMul(MatrixMulParams),
}

impl TaskParams {
    pub fn kind(&self) -> TaskKind {
        match self {
            Self::Mandelbrot(_) => TaskKind::Mandelbrot,
            Self::JsonParse(_) => TaskKind::JsonParse,
            Self::MatrixMul(_) => TaskKind::MatrixMul,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Mandelbrot(p) => p.validate(),
            Self::JsonParse(p) => p.validate(),
            Self::MatrixMul(p) => p.validate(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl From<MandelbrotParams> for TaskParams {
    fn from(params: MandelbrotParams) -> Self {
        Self::Mandelbrot(params)
    }
}

impl From<JsonParseParams> for TaskParams {
    fn from(params: JsonParseParams) -> Self {
        Self::JsonParse(params)
    }
}

impl From<MatrixMulParams> for TaskParams {
    fn from(params: MatrixMulParams) -> Self {
        Self::MatrixMul(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_mandelbrot() -> MandelbrotParams {
        MandelbrotParams {
            width: 100,
            height: 100,
            max_iter: 1000,
            center_real: 0.0,
            center_imag: 0.0,
            scale_factor: 4.0,
        }
    }

    #[test]
    fn test_mandelbrot_validation() {
        let valid = valid_mandelbrot();
        assert!(valid.validate().is_ok());
        assert!(MandelbrotParams { width: 0, ..valid }.validate().is_err());
        assert!(MandelbrotParams { height: 0, ..valid }.validate().is_err());
        assert!(MandelbrotParams { width: 10_001, ..valid }.validate().is_err());
        assert!(MandelbrotParams { scale_factor: 0.0, ..valid }.validate().is_err());
        assert!(MandelbrotParams { scale_factor: -1.0, ..valid }.validate().is_err());
        assert!(MandelbrotParams { center_real: f64::NAN, ..valid }.validate().is_err());
        assert!(MandelbrotParams { center_imag: f64::INFINITY, ..valid }.validate().is_err());
        // max_iter = 0 is a legal no-iteration render
        assert!(MandelbrotParams { max_iter: 0, ..valid }.validate().is_ok());
    }

    #[test]
    fn test_mandelbrot_pixel_limit() {
        let params = MandelbrotParams {
            width: 10_000,
            height: 10_000,
            ..valid_mandelbrot()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_json_validation_bounds() {
        assert!(JsonParseParams { record_count: 0, seed: 1 }.validate().is_err());
        assert!(JsonParseParams { record_count: 1, seed: 0 }.validate().is_ok());
        assert!(JsonParseParams { record_count: 1_000_000, seed: 1 }.validate().is_ok());
        assert!(JsonParseParams { record_count: 1_000_001, seed: 1 }.validate().is_err());
    }

    #[test]
    fn test_matrix_validation_bounds() {
        assert!(MatrixMulParams { dimension: 0, seed: 1 }.validate().is_err());
        assert!(MatrixMulParams { dimension: 1, seed: 0 }.validate().is_ok());
        assert!(MatrixMulParams { dimension: 2000, seed: u32::MAX }.validate().is_ok());
        assert!(MatrixMulParams { dimension: 2001, seed: 1 }.validate().is_err());
        assert!(MatrixMulParams { dimension: u32::MAX, seed: 1 }.validate().is_err());
    }

    #[test]
    fn test_task_kind_parse_and_display() {
        for kind in TaskKind::ALL {
            assert_eq!(kind.to_string().parse::<TaskKind>().unwrap(), kind);
        }
        assert!("sorting".parse::<TaskKind>().is_err());
    }

    #[test]
    fn test_untagged_params_deserialize() {
        let m: TaskParams = serde_json::from_str(r#"{"dimension":2,"seed":12345}"#).unwrap();
        assert_eq!(m.kind(), TaskKind::MatrixMul);
        let j: TaskParams = serde_json::from_str(r#"{"record_count":10,"seed":42}"#).unwrap();
        assert_eq!(j.kind(), TaskKind::JsonParse);
        let p: TaskParams = serde_json::from_str(
            r#"{"width":2,"height":2,"max_iter":10,"center_real":0.0,"center_imag":0.0,"scale_factor":4.0}"#,
        )
        .unwrap();
        assert_eq!(p.kind(), TaskKind::Mandelbrot);
    }
}
