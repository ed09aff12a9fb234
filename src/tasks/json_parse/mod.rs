//! # JSON Parse
//!
//! Generates `record_count` records from an LCG stream, serializes them to a
//! compact JSON array, parses the text back with a strict hand-written
//! parser and hashes the parsed records. A parse that does not reproduce the
//! requested record count yields hash `0`.
//!
//! Record layout: `{"id":1,"value":-12,"flag":true,"name":"a1"}` where
//! `value` is the raw LCG draw reinterpreted as `i32` and `flag` is set for
//! even values.

pub mod code;
pub mod test;

pub use code::*;

use crate::params::{JsonParseParams, TaskKind};
use crate::registry::{RunTaskFn, TaskRunner};
use crate::utils::VariantInfo;
use crate::verify::VerificationVector;

/// Runner for the JSON round-trip task
pub struct JsonParseRunner;

impl TaskRunner for JsonParseRunner {
    fn kind(&self) -> TaskKind {
        TaskKind::JsonParse
    }

    fn description(&self) -> &'static str {
        "Serialize synthetic records to JSON and parse them back"
    }

    fn category(&self) -> &'static str {
        "parsing"
    }

    fn implementations(&self) -> Vec<VariantInfo<RunTaskFn>> {
        code::available_variants()
    }

    fn reference_vectors(&self) -> Vec<VerificationVector> {
        reference_cases()
            .into_iter()
            .map(|(name, description, category, params)| {
                VerificationVector::new(name, description, category, params.into(), compute_hash(&params))
            })
            .collect()
    }
}

/// (name, description, category, params) for every reference vector
pub fn reference_cases() -> Vec<(String, String, &'static str, JsonParseParams)> {
    let mut cases = Vec::new();

    let critical = [
        ("single_record", "Minimal array", 1, 12345),
        ("large_dataset", "Ten thousand records", 10_000, 999),
        ("zero_seed", "Zero seed still produces values", 100, 0),
        ("max_seed", "Maximum seed value", 50, u32::MAX),
        ("power_of_two_records", "Power of two record count", 1024, 2048),
        ("prime_number_records", "Prime record count", 997, 1009),
        ("alternating_pattern_seed", "Alternating bit pattern seed", 200, 0xAAAA_AAAA),
    ];
    for (name, description, record_count, seed) in critical {
        cases.push((
            name.to_string(),
            description.to_string(),
            "critical",
            JsonParseParams { record_count, seed },
        ));
    }

    for seed in 1..=8 {
        cases.push((
            format!("sequential_seed_{seed}"),
            format!("10 records, seed {seed}"),
            "rng_validation",
            JsonParseParams { record_count: 10, seed },
        ));
    }
    for (i, seed) in [1u32 << 31, (1 << 31) - 1, 0x5555_5555, 0xDEAD_BEEF].into_iter().enumerate() {
        cases.push((
            format!("bit_pattern_seed_{i}"),
            format!("25 records, seed {seed:#010x}"),
            "rng_validation",
            JsonParseParams { record_count: 25, seed },
        ));
    }

    let edge = [
        ("empty_array", "Rejected: zero records", 0, 42),
        ("many_records", "One hundred thousand records", 100_000, 7),
        ("over_limit", "Rejected: above the record limit", 1_000_001, 7),
        ("two_records", "Two records exercise the separator", 2, 1),
    ];
    for (name, description, record_count, seed) in edge {
        cases.push((
            name.to_string(),
            description.to_string(),
            "edge_case",
            JsonParseParams { record_count, seed },
        ));
    }

    cases
}
