//! Human-readable diagnostics.
//!
//! ```text
//! hello.bf:3:7: E100 [syntax] unmatched ']': no loop is open
//!     3 | +++[-]]
//!       |       ^
//!       = help: remove this ']' or add a matching '[' before it
//! ```

use tapec_types::{CompileErrors, TapeError};

/// Render one diagnostic with its source line and a caret.
pub fn render_diagnostic(err: &TapeError) -> String {
    let mut out = format!("{}:{err}\n", err.file);
    out.push_str(&format!("{:>5} | {}\n", err.span.start_line, err.source_line));
    out.push_str(&format!("      | {}^\n", caret_padding(&err.source_line, err.span.start_col)));
    if let Some(help) = &err.suggestion {
        out.push_str(&format!("      = help: {help}\n"));
    }
    out
}

/// Render every stored diagnostic plus a count of any that were dropped.
pub fn render_errors(errors: &CompileErrors) -> String {
    let mut out: String = errors.errors.iter().map(render_diagnostic).collect();
    if errors.total_errors > errors.errors.len() {
        out.push_str(&format!(
            "... and {} more error(s)\n",
            errors.total_errors - errors.errors.len()
        ));
    }
    out
}

/// Whitespace reaching column `col` (1-based, in chars). Tabs are kept so
/// the caret lines up however the terminal expands them.
fn caret_padding(line: &str, col: u32) -> String {
    line.chars()
        .take(col.saturating_sub(1) as usize)
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .collect()
}
