//! Binary parameter codec.
//!
//! Fixed little-endian layouts shared by every module across the ABI
//! boundary. Offsets are part of the contract; a silent change here corrupts
//! cross-implementation comparisons without any error.
//!
//! | task       | size | layout                                                          |
//! |------------|------|-----------------------------------------------------------------|
//! | mandelbrot | 40   | width u32 @0, height u32 @4, max_iter u32 @8, pad u32 @12,      |
//! |            |      | center_real f64 @16, center_imag f64 @24, scale_factor f64 @32  |
//! | json_parse | 8    | record_count u32 @0, seed u32 @4                                |
//! | matrix_mul | 8    | dimension u32 @0, seed u32 @4                                   |

use crate::error::{BenchError, Result};
use crate::params::{JsonParseParams, MandelbrotParams, MatrixMulParams, TaskKind, TaskParams};

pub const MANDELBROT_PARAMS_SIZE: usize = 40;
pub const JSON_PARSE_PARAMS_SIZE: usize = 8;
pub const MATRIX_MUL_PARAMS_SIZE: usize = 8;

/// Serialized size of a task's parameter struct
pub const fn encoded_len(kind: TaskKind) -> usize {
    match kind {
        TaskKind::Mandelbrot => MANDELBROT_PARAMS_SIZE,
        TaskKind::JsonParse => JSON_PARSE_PARAMS_SIZE,
        TaskKind::MatrixMul => MATRIX_MUL_PARAMS_SIZE,
    }
}

/// Encode parameters into their fixed-size buffer
pub fn encode(params: &TaskParams) -> Vec<u8> {
    match params {
        TaskParams::Mandelbrot(p) => encode_mandelbrot(p).to_vec(),
        TaskParams::JsonParse(p) => encode_pair(p.record_count, p.seed).to_vec(),
        TaskParams::MatrixMul(p) => encode_pair(p.dimension, p.seed).to_vec(),
    }
}

/// Decode a buffer produced by [`encode`]; trailing bytes are ignored
pub fn decode(kind: TaskKind, bytes: &[u8]) -> Result<TaskParams> {
    Ok(match kind {
        TaskKind::Mandelbrot => TaskParams::Mandelbrot(decode_mandelbrot(bytes)?),
        TaskKind::JsonParse => TaskParams::JsonParse(decode_json_parse(bytes)?),
        TaskKind::MatrixMul => TaskParams::MatrixMul(decode_matrix_mul(bytes)?),
    })
}

pub fn decode_mandelbrot(bytes: &[u8]) -> Result<MandelbrotParams> {
    ensure_len(TaskKind::Mandelbrot, bytes)?;
    Ok(MandelbrotParams {
        width: read_u32(bytes, 0),
        height: read_u32(bytes, 4),
        max_iter: read_u32(bytes, 8),
        center_real: read_f64(bytes, 16),
        center_imag: read_f64(bytes, 24),
        scale_factor: read_f64(bytes, 32),
    })
}

pub fn decode_json_parse(bytes: &[u8]) -> Result<JsonParseParams> {
    ensure_len(TaskKind::JsonParse, bytes)?;
    Ok(JsonParseParams {
        record_count: read_u32(bytes, 0),
        seed: read_u32(bytes, 4),
    })
}

pub fn decode_matrix_mul(bytes: &[u8]) -> Result<MatrixMulParams> {
    ensure_len(TaskKind::MatrixMul, bytes)?;
    Ok(MatrixMulParams {
        dimension: read_u32(bytes, 0),
        seed: read_u32(bytes, 4),
    })
}

fn ensure_len(kind: TaskKind, bytes: &[u8]) -> Result<()> {
    let expected = encoded_len(kind);
    if bytes.len() < expected {
        return Err(BenchError::BufferTooShort {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

pub fn encode_mandelbrot(p: &MandelbrotParams) -> [u8; MANDELBROT_PARAMS_SIZE] {
    let mut buf = [0u8; MANDELBROT_PARAMS_SIZE];
    buf[0..4].copy_from_slice(&p.width.to_le_bytes());
    buf[4..8].copy_from_slice(&p.height.to_le_bytes());
    buf[8..12].copy_from_slice(&p.max_iter.to_le_bytes());
    // 12..16 is alignment padding for the f64 fields and stays zero
    buf[16..24].copy_from_slice(&p.center_real.to_le_bytes());
    buf[24..32].copy_from_slice(&p.center_imag.to_le_bytes());
    buf[32..40].copy_from_slice(&p.scale_factor.to_le_bytes());
    buf
}

fn encode_pair(first: u32, second: u32) -> [u8; 8] {
    let mut buf = [0u8; 8];
    buf[0..4].copy_from_slice(&first.to_le_bytes());
    buf[4..8].copy_from_slice(&second.to_le_bytes());
    buf
}

/// Callers guarantee `offset + 4 <= bytes.len()`
#[inline]
pub(crate) fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(word)
}

#[inline]
pub(crate) fn read_f64(bytes: &[u8], offset: usize) -> f64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[offset..offset + 8]);
    f64::from_le_bytes(word)
}
