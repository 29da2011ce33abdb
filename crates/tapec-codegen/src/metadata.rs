//! Unit identity and the metadata record embedded in every artifact.
//!
//! WASM units carry the record as JSON in the `tapec` custom section;
//! bytecode units flatten it into their top-level JSON object.

use serde::{Deserialize, Serialize};
use tapec_types::{BoundsPolicy, TAPE_LEN};

use crate::error::CodegenResult;
use crate::types::COMPILER_VERSION;

/// Caller-supplied identity of the unit being built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitInfo {
    /// Namespace for the generated routines (e.g. `hello`).
    pub name: String,
    /// Cell-access policy the generated code follows.
    pub bounds: BoundsPolicy,
    /// Hex SHA-256 of the source text.
    pub source_sha256: String,
}

impl UnitInfo {
    pub fn new(name: impl Into<String>, bounds: BoundsPolicy, source_sha256: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bounds,
            source_sha256: source_sha256.into(),
        }
    }

    /// Qualified name of the entry routine, e.g. `hello.execute`.
    pub fn entry_name(&self) -> String {
        format!("{}.execute", self.name)
    }

    /// Qualified name of the tape initialization routine.
    pub fn init_name(&self) -> String {
        format!("{}.init", self.name)
    }
}

/// Metadata describing a packaged unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitMetadata {
    pub compiler_version: String,
    pub unit: String,
    pub entry: String,
    pub tape_len: usize,
    pub bounds: BoundsPolicy,
    pub source_sha256: String,
}

impl UnitMetadata {
    pub fn new(info: &UnitInfo) -> Self {
        Self {
            compiler_version: COMPILER_VERSION.to_string(),
            unit: info.name.clone(),
            entry: info.entry_name(),
            tape_len: TAPE_LEN,
            bounds: info.bounds,
            source_sha256: info.source_sha256.clone(),
        }
    }

    /// Serialize to JSON bytes for embedding in a WASM custom section.
    pub fn to_json(&self) -> CodegenResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize from JSON bytes.
    pub fn from_json(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}
