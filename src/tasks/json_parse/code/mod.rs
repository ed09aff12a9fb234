//! JSON round-trip implementations.

pub mod c_impl;
mod original;
mod parser;

pub use c_impl::{json_parse_c_run_task, C_IMPL_AVAILABLE};
pub use original::{
    compute_hash, generate_records, hash_records, json_parse_run_task, serialize_records, JsonRecord,
};
pub use parser::{parse_records, ParseError};

use crate::registry::RunTaskFn;
use crate::utils::VariantInfo;

/// Get all language implementations compiled into this build
pub fn available_variants() -> Vec<VariantInfo<RunTaskFn>> {
    let mut variants: Vec<VariantInfo<RunTaskFn>> = vec![VariantInfo {
        name: "rust",
        description: "Rust generator, serializer and byte-level parser",
        function: json_parse_run_task,
    }];

    if C_IMPL_AVAILABLE {
        variants.push(VariantInfo {
            name: "c",
            description: "C generator, serializer and parser",
            function: json_parse_c_run_task,
        });
    }

    variants
}
