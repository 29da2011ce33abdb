//! tapec compiler: orchestrates the full compilation pipeline.
//!
//! ```text
//! source → Lexer → Loop Resolver + Instruction Emitter → backend → unit → artifact
//! ```
//!
//! [`compile`] is the entry point: it builds a unit named `unit_name` from
//! `source` and writes it to `output_path`. Nothing is written unless the
//! whole build (including WASM validation) succeeds.

pub mod config;
pub mod error;

pub use config::{CompileOptions, Target};
pub use error::CompileError;
pub use tapec_codegen::UnitStats;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tapec_codegen::{compile_bytecode, compile_wasm, UnitInfo};
use tapec_types::{CompileErrors, SourceFile};

/// Source name used when the caller supplies text without a file name.
pub const ANONYMOUS_SOURCE: &str = "<source>";

/// A successfully built unit.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub unit: String,
    pub target: Target,
    /// Artifact contents: a WASM module or bytecode JSON.
    pub bytes: Vec<u8>,
    pub stats: UnitStats,
    pub source_sha256: String,
    /// Where the artifact was written, if it was.
    pub artifact_path: Option<PathBuf>,
}

impl CompileOutput {
    /// Write the artifact to `path`.
    pub fn write_to(&mut self, path: &Path) -> Result<(), CompileError> {
        std::fs::write(path, &self.bytes).map_err(|source| CompileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.artifact_path = Some(path.to_path_buf());
        Ok(())
    }
}

/// Compile `source` into a unit named `unit_name` at `output_path`, using
/// the default options (WASM, unchecked pointer).
pub fn compile(
    unit_name: &str,
    output_path: impl AsRef<Path>,
    source: &str,
) -> Result<CompileOutput, CompileError> {
    compile_with_options(unit_name, output_path, source, &CompileOptions::default())
}

pub fn compile_with_options(
    unit_name: &str,
    output_path: impl AsRef<Path>,
    source: &str,
    options: &CompileOptions,
) -> Result<CompileOutput, CompileError> {
    let source = SourceFile::new(ANONYMOUS_SOURCE, source);
    compile_source(&source, unit_name, output_path.as_ref(), options)
}

/// Compile an already-loaded source file and write the artifact.
pub fn compile_source(
    source: &SourceFile,
    unit_name: &str,
    output_path: &Path,
    options: &CompileOptions,
) -> Result<CompileOutput, CompileError> {
    let mut output = build(source, unit_name, options)?;
    output.write_to(output_path)?;
    Ok(output)
}

/// Build a unit in memory without touching the filesystem.
pub fn build(
    source: &SourceFile,
    unit_name: &str,
    options: &CompileOptions,
) -> Result<CompileOutput, CompileError> {
    validate_unit_name(unit_name)?;
    let source_sha256 = source_sha256(&source.source);
    let info = UnitInfo::new(unit_name, options.bounds, source_sha256.clone());

    let (bytes, stats) = match options.target {
        Target::Wasm => {
            let built = compile_wasm(source, &info)?;
            (built.output, built.stats)
        }
        Target::Bytecode => {
            let built = compile_bytecode(source, &info)?;
            (built.output.to_json()?, built.stats)
        }
    };

    Ok(CompileOutput {
        unit: unit_name.to_string(),
        target: options.target,
        bytes,
        stats,
        source_sha256,
        artifact_path: None,
    })
}

/// Check bracket balance only. Faster than a full build when only
/// diagnostics are needed.
pub fn check(source: &str, filename: &str) -> CompileErrors {
    tapec_codegen::check_loops(&SourceFile::new(filename, source))
}

// ══════════════════════════════════════════════════════════════════════════════
// Structured result
// ══════════════════════════════════════════════════════════════════════════════

/// JSON-serializable outcome of a compilation, for tooling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileResult {
    pub success: bool,
    pub unit: String,
    pub target: Target,
    /// Artifact bytes on success.
    pub artifact: Option<Vec<u8>>,
    pub source_sha256: String,
    pub stats: Option<UnitStats>,
    pub errors: CompileErrors,
    /// Failure that is not a source diagnostic (bad unit name, I/O, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Where the artifact was written, when the caller wrote one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_path: Option<String>,
}

impl CompileResult {
    /// Fold a build outcome into a result record.
    pub fn from_outcome(
        source: &SourceFile,
        unit_name: &str,
        options: &CompileOptions,
        outcome: Result<CompileOutput, CompileError>,
    ) -> Self {
        match outcome {
            Ok(out) => Self {
                success: true,
                unit: out.unit,
                target: out.target,
                artifact: Some(out.bytes),
                source_sha256: out.source_sha256,
                stats: Some(out.stats),
                errors: CompileErrors::empty(),
                message: None,
                artifact_path: out.artifact_path.map(|p| p.display().to_string()),
            },
            Err(err) => Self {
                success: false,
                unit: unit_name.to_string(),
                target: options.target,
                artifact: None,
                source_sha256: source_sha256(&source.source),
                stats: None,
                errors: err.diagnostics().cloned().unwrap_or_default(),
                message: match err {
                    CompileError::Syntax(_) => None,
                    other => Some(other.to_string()),
                },
                artifact_path: None,
            },
        }
    }
}

/// Compile without I/O and return a structured result.
pub fn compile_to_result(
    source: &str,
    filename: &str,
    unit_name: &str,
    options: &CompileOptions,
) -> CompileResult {
    let source = SourceFile::new(filename, source);
    let outcome = build(&source, unit_name, options);
    CompileResult::from_outcome(&source, unit_name, options, outcome)
}

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

/// Hex SHA-256 of the source text.
pub fn source_sha256(source: &str) -> String {
    format!("{:x}", Sha256::digest(source.as_bytes()))
}

/// Unit names qualify the generated routines (`<unit>.execute`), so they
/// must be identifier-like: ASCII alphanumerics, `_`, `-` and `.`, not
/// starting with a digit or `.`.
pub fn validate_unit_name(name: &str) -> Result<(), CompileError> {
    let invalid = |reason| CompileError::InvalidUnitName {
        name: name.to_string(),
        reason,
    };
    let Some(first) = name.chars().next() else {
        return Err(invalid("must not be empty"));
    };
    if first.is_ascii_digit() || first == '.' {
        return Err(invalid("must not start with a digit or '.'"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(invalid("may only contain ASCII letters, digits, '_', '-' and '.'"));
    }
    Ok(())
}
