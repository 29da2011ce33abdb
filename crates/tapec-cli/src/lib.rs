//! tapec command-line front end: argument parsing and diagnostics rendering.

pub mod cli;
pub mod report;
