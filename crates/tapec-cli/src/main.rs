// CLI entrypoint for tapec.

use std::io::{self, Write};

use clap::Parser;

use tapec_cli::cli::{Cli, OutputFormat, EXIT_COMPILE, EXIT_IO, EXIT_OK, EXIT_RUNTIME};
use tapec_cli::report::render_errors;
use tapec_codegen::BytecodeUnit;
use tapec_compiler::{compile_source, CompileError, CompileOutput, CompileResult, Target};
use tapec_eval::{EvalError, Evaluator, IoSink, IoSource, Machine, Vm, DEFAULT_GAS_LIMIT};
use tapec_types::{BoundsPolicy, SourceFile};

fn main() {
    let cli = Cli::parse();
    std::process::exit(run(&cli));
}

fn run(cli: &Cli) -> i32 {
    let source = match cli.read_source() {
        Ok(source) => source,
        Err(err) => {
            let err = CompileError::Io {
                path: cli.source.clone(),
                source: err,
            };
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::json!({
                    "success": false,
                    "message": err.to_string(),
                })),
                OutputFormat::Text => eprintln!("error: {err}"),
            }
            return EXIT_IO;
        }
    };

    let options = cli.options();
    let unit = cli.unit_name();
    let path = cli.artifact_path();
    let outcome = compile_source(&source, &unit, &path, &options);

    let exit = match &outcome {
        Ok(_) => EXIT_OK,
        Err(CompileError::Io { .. }) => EXIT_IO,
        Err(_) => EXIT_COMPILE,
    };

    // Program output owns stdout under --run.
    let status = |line: String| {
        if cli.run {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    };

    let built = match cli.format {
        OutputFormat::Json => {
            let built = outcome.as_ref().ok().cloned();
            let mut result = CompileResult::from_outcome(&source, &unit, &options, outcome);
            // The artifact is on disk; keep the report small.
            result.artifact = None;
            match serde_json::to_string_pretty(&result) {
                Ok(json) => status(json),
                Err(err) => eprintln!("error: failed to serialize compile result: {err}"),
            }
            built
        }
        OutputFormat::Text => match outcome {
            Ok(out) => {
                if !cli.quiet {
                    status(format!(
                        "{} compiled to {}",
                        cli.source.display(),
                        path.display()
                    ));
                }
                Some(out)
            }
            Err(CompileError::Syntax(errors)) => {
                eprint!("{}", render_errors(&errors));
                None
            }
            Err(err) => {
                eprintln!("error: {err}");
                None
            }
        },
    };

    match built {
        Some(out) if cli.run => match execute(&source, &out, options.bounds) {
            Ok(()) => exit,
            Err(err) => {
                eprintln!("runtime error: {err}");
                EXIT_RUNTIME
            }
        },
        _ => exit,
    }
}

/// Run a freshly built unit on stdin/stdout. Bytecode units run on the VM;
/// WASM units run through the reference evaluator, which shares their
/// semantics.
fn execute(source: &SourceFile, out: &CompileOutput, bounds: BoundsPolicy) -> Result<(), EvalError> {
    let mut machine = Machine::new(bounds, DEFAULT_GAS_LIMIT);
    let mut input = IoSource(io::stdin().lock());
    let mut output = IoSink(io::stdout().lock());

    match out.target {
        Target::Bytecode => {
            let unit = BytecodeUnit::from_json(&out.bytes).map_err(|e| {
                EvalError::InvalidBytecode(format!("artifact is not a bytecode unit: {e}"))
            })?;
            Vm::new(&unit)?.run(&mut machine, &mut input, &mut output)?;
        }
        Target::Wasm => {
            Evaluator::new(source)?.run(&mut machine, &mut input, &mut output)?;
        }
    }
    output.0.flush().map_err(|e| EvalError::Io(e.to_string()))
}
