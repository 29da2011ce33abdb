//! Compile options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tapec_types::BoundsPolicy;

/// Output format of a compiled unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// A WebAssembly module.
    #[default]
    Wasm,
    /// A JSON bytecode unit for the tapec VM.
    Bytecode,
}

impl Target {
    /// File extension for artifacts of this target.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Wasm => "wasm",
            Self::Bytecode => "tbc",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Wasm => "wasm",
            Self::Bytecode => "bytecode",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wasm" => Ok(Self::Wasm),
            "bytecode" => Ok(Self::Bytecode),
            other => Err(format!("unknown target '{other}' (expected wasm or bytecode)")),
        }
    }
}

/// Options for one compilation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    pub target: Target,
    pub bounds: BoundsPolicy,
}

impl CompileOptions {
    pub fn new(target: Target, bounds: BoundsPolicy) -> Self {
        Self { target, bounds }
    }
}
