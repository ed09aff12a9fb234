//! Execution result records and their export.

use crate::datagen::Scale;
use crate::error::{BenchError, ErrorKind, Result};
use crate::params::TaskKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// One task invocation, successful or not
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub task: TaskKind,
    pub language: String,
    pub scale: Scale,
    /// Position of this measured run within its series, from 0
    pub iteration: u32,
    /// Wall-clock time of the `run_task` call in milliseconds
    pub execution_time: f64,
    /// Bytes of module memory in use after the call
    pub memory_used: u64,
    pub result_hash: u32,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<ErrorKind>,
}

impl ExecutionResult {
    pub fn success(
        task: TaskKind,
        language: impl Into<String>,
        scale: Scale,
        iteration: u32,
        execution_time: f64,
        memory_used: u64,
        result_hash: u32,
    ) -> Self {
        Self {
            task,
            language: language.into(),
            scale,
            iteration,
            execution_time,
            memory_used,
            result_hash,
            success: true,
            timestamp: Utc::now(),
            error: None,
            error_type: None,
        }
    }

    pub fn failure(
        task: TaskKind,
        language: impl Into<String>,
        scale: Scale,
        iteration: u32,
        error: &BenchError,
    ) -> Self {
        Self {
            task,
            language: language.into(),
            scale,
            iteration,
            execution_time: 0.0,
            memory_used: 0,
            result_hash: 0,
            success: false,
            timestamp: Utc::now(),
            error: Some(error.to_string()),
            error_type: Some(error.kind()),
        }
    }
}

/// Write results as a pretty-printed JSON array
pub fn export_json(path: impl AsRef<Path>, results: &[ExecutionResult]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), results)?;
    Ok(())
}

/// Read a JSON array written by [`export_json`]
pub fn import_json(path: impl AsRef<Path>) -> Result<Vec<ExecutionResult>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Write results as CSV, one row per invocation
pub fn export_csv(path: impl AsRef<Path>, results: &[ExecutionResult]) -> Result<()> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);

    writeln!(
        file,
        "task,language,compiler,scale,iteration,execution_time_ms,memory_used,result_hash,success,timestamp,error_type"
    )?;

    for entry in results {
        let compiler = if entry.language == "c" {
            crate::utils::C_COMPILER_NAME.unwrap_or("Unknown")
        } else {
            ""
        };

        writeln!(
            file,
            "{},{},{},{},{},{:.6},{},{},{},{},{}",
            entry.task,
            entry.language,
            compiler,
            entry.scale,
            entry.iteration,
            entry.execution_time,
            entry.memory_used,
            entry.result_hash,
            entry.success,
            entry.timestamp.to_rfc3339(),
            entry.error_type.map(|k| k.to_string()).unwrap_or_default()
        )?;
    }

    file.flush()?;
    Ok(())
}
