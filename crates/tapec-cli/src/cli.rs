//! Command-line interface parsing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, ValueEnum};
use tapec_compiler::{CompileOptions, Target};
use tapec_types::{BoundsPolicy, SourceFile};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Source compiled successfully.
pub const EXIT_OK: i32 = 0;
/// The source was rejected (unbalanced brackets, bad unit name).
pub const EXIT_COMPILE: i32 = 1;
/// Reading the source or writing the artifact failed.
pub const EXIT_IO: i32 = 2;
/// `--run` was given and the program failed at run time.
pub const EXIT_RUNTIME: i32 = 3;

const LONG_ABOUT: &str = "Compile a tape-language program into a loadable unit.

The last path component of OUTPUT names the unit (its entry routine is
<unit>.execute); the artifact is written to OUTPUT.wasm or OUTPUT.tbc.
Characters other than > < + - . , [ ] are commentary and ignored.";

#[derive(Parser, Debug)]
#[command(
    name = "tapec",
    version = VERSION,
    about = "Single-pass compiler for the eight-symbol tape language",
    long_about = LONG_ABOUT
)]
pub struct Cli {
    #[arg(value_name = "SOURCE", long_help = "Source file to compile.")]
    pub source: PathBuf,
    #[arg(
        value_name = "OUTPUT",
        long_help = "Unit name and artifact stem; the target's extension is appended."
    )]
    pub output: String,
    #[arg(
        long = "target",
        value_enum,
        default_value_t = TargetArg::Wasm,
        long_help = "Artifact format: a WebAssembly module or a JSON bytecode unit."
    )]
    pub target: TargetArg,
    #[arg(
        long = "checked",
        action = ArgAction::SetTrue,
        long_help = "Fail at run time when a cell is accessed outside the tape instead of touching the guard bytes."
    )]
    pub checked: bool,
    #[arg(
        long = "format",
        value_enum,
        default_value_t = OutputFormat::Text,
        long_help = "Report format. json prints one compile result object on stdout."
    )]
    pub format: OutputFormat,
    #[arg(
        short = 'q',
        long = "quiet",
        action = ArgAction::SetTrue,
        long_help = "Suppress the completion message. Errors are still reported."
    )]
    pub quiet: bool,
    #[arg(
        long = "run",
        action = ArgAction::SetTrue,
        long_help = "After compiling, run the program on stdin/stdout. Status messages move to stderr. \
A bytecode unit runs on the built-in VM; for the wasm target the built-in reference \
evaluator runs the source instead of the emitted module."
    )]
    pub run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TargetArg {
    #[default]
    Wasm,
    Bytecode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Cli {
    pub fn options(&self) -> CompileOptions {
        let target = match self.target {
            TargetArg::Wasm => Target::Wasm,
            TargetArg::Bytecode => Target::Bytecode,
        };
        let bounds = if self.checked {
            BoundsPolicy::Checked
        } else {
            BoundsPolicy::Unchecked
        };
        CompileOptions::new(target, bounds)
    }

    /// Last path component of OUTPUT.
    pub fn unit_name(&self) -> String {
        Path::new(&self.output)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.output.clone())
    }

    /// `OUTPUT.<ext>`
    pub fn artifact_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.{}", self.output, self.options().target.extension()))
    }

    pub fn read_source(&self) -> io::Result<SourceFile> {
        read_source(&self.source)
    }
}

/// Load a source file. Invalid UTF-8 sequences decode to U+FFFD, which is
/// commentary like every other non-symbol character.
pub fn read_source(path: &Path) -> io::Result<SourceFile> {
    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    Ok(SourceFile::new(path.display().to_string(), text))
}
