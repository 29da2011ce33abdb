//! tapec compiler as a WASM module for browser environments.
//!
//! This crate exposes the tapec compilation pipeline via `wasm-bindgen`,
//! suitable for running in a browser Web Worker. Everything crosses the
//! boundary as JSON strings.
//!
//! # Usage (JavaScript)
//!
//! ```js
//! import init, { compile, check } from 'tapec-wasm';
//!
//! await init();
//!
//! const result = JSON.parse(compile("+++.", "three.bf", "three", "{}"));
//! // { success: true, unit: "three", target: "wasm", artifact: [0, 97, 115, 109, ...], ... }
//! const module = await WebAssembly.instantiate(new Uint8Array(result.artifact), {
//!   env: { read_byte: () => -1, write_byte: (b) => console.log(b) },
//! });
//! module.instance.exports.execute();
//! ```

use tapec_compiler::{CompileOptions, Target};
use wasm_bindgen::prelude::*;

/// Compile a tape program.
///
/// `options_json` is a JSON `CompileOptions` object such as
/// `{"target":"bytecode","bounds":"checked"}`; missing fields take their
/// defaults and an empty string means all defaults.
///
/// Returns a JSON string containing a `CompileResult`. On failure `success`
/// is `false`, `artifact` is `null`, and `errors` (or `message`) explains why.
#[wasm_bindgen]
pub fn compile(source: &str, filename: &str, unit_name: &str, options_json: &str) -> String {
    let options = match parse_options(options_json) {
        Ok(options) => options,
        Err(msg) => return failure_json(unit_name, &msg),
    };
    let result = tapec_compiler::compile_to_result(source, filename, unit_name, &options);
    serde_json::to_string(&result).unwrap_or_else(|e| {
        failure_json(unit_name, &format!("serialization error: {e}"))
    })
}

/// Check bracket balance without generating code.
///
/// Returns a JSON string containing structured errors. Faster than full
/// compilation when only diagnostics are needed (e.g., editor integration).
#[wasm_bindgen]
pub fn check(source: &str, filename: &str) -> String {
    let errors = tapec_compiler::check(source, filename);
    serde_json::to_string(&errors).unwrap_or_else(|e| check_failure_json(&e.to_string()))
}

/// Return the compiler version string.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// File extension for artifacts of `target` (`"wasm"` or `"bytecode"`).
#[wasm_bindgen]
pub fn artifact_extension(target: &str) -> Option<String> {
    target.parse::<Target>().ok().map(|t| t.extension().to_string())
}

fn parse_options(json: &str) -> Result<CompileOptions, String> {
    if json.trim().is_empty() {
        return Ok(CompileOptions::default());
    }
    serde_json::from_str(json).map_err(|e| format!("invalid options: {e}"))
}

fn failure_json(unit_name: &str, message: &str) -> String {
    serde_json::json!({
        "success": false,
        "unit": unit_name,
        "artifact": null,
        "errors": { "errors": [], "total_errors": 0 },
        "message": message,
    })
    .to_string()
}

fn check_failure_json(message: &str) -> String {
    serde_json::json!({
        "errors": [{ "message": format!("serialization error: {message}") }],
        "total_errors": 1,
    })
    .to_string()
}
