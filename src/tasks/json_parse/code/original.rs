//! Reference record generator, serializer and hasher.

use super::parser::parse_records;
use crate::codec;
use crate::hash::Fnv1a;
use crate::params::JsonParseParams;
use crate::random::Lcg;
use std::fmt::Write;

/// One synthetic record
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JsonRecord {
    pub id: u32,
    pub value: i32,
    pub flag: bool,
    pub name: String,
}

/// Rough serialized size of one record, used to presize the output
const RECORD_SIZE_ESTIMATE: usize = 48;

/// ABI entry point: decode the parameter buffer, round-trip the records, hash
pub fn json_parse_run_task(params: &[u8]) -> u32 {
    match codec::decode_json_parse(params) {
        Ok(params) => compute_hash(&params),
        Err(_) => 0,
    }
}

/// Generate, serialize, parse back and hash; `0` for invalid params or a
/// parse that does not yield exactly `record_count` records
pub fn compute_hash(params: &JsonParseParams) -> u32 {
    if params.validate().is_err() {
        return 0;
    }
    let records = generate_records(params.record_count as usize, params.seed);
    let json = serialize_records(&records);
    match parse_records(&json) {
        Ok(parsed) if parsed.len() == params.record_count as usize => hash_records(&parsed),
        _ => 0,
    }
}

/// Records `1..=count` with values drawn from one LCG stream
pub fn generate_records(count: usize, seed: u32) -> Vec<JsonRecord> {
    let mut lcg = Lcg::new(seed);
    (0..count)
        .map(|i| {
            let value = lcg.next_u32() as i32;
            let id = (i + 1) as u32;
            JsonRecord {
                id,
                value,
                flag: value & 1 == 0,
                name: format!("a{id}"),
            }
        })
        .collect()
}

/// Compact JSON array, `[]` when empty
pub fn serialize_records(records: &[JsonRecord]) -> String {
    let mut json = String::with_capacity(records.len() * RECORD_SIZE_ESTIMATE + 2);
    json.push('[');
    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            json.push(',');
        }
        // Writing into a String cannot fail
        let _ = write!(
            json,
            "{{\"id\":{},\"value\":{},\"flag\":{},\"name\":\"",
            record.id, record.value, record.flag
        );
        push_escaped(&mut json, &record.name);
        json.push_str("\"}");
    }
    json.push(']');
    json
}

fn push_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
}

/// FNV-1a over id (LE), value (LE), flag (one byte) and name (UTF-8) per record
pub fn hash_records(records: &[JsonRecord]) -> u32 {
    let mut hasher = Fnv1a::new();
    for record in records {
        hasher.write_u32(record.id);
        hasher.write_i32(record.value);
        hasher.write_u8(record.flag as u8);
        hasher.write_bytes(record.name.as_bytes());
    }
    hasher.finish()
}
