//! Actuation error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the OS-facing volume/brightness backends
#[derive(Error, Debug)]
pub enum ActuationError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Command {
        program: &'static str,
        status: std::process::ExitStatus,
    },

    #[error("sysfs access to {path} failed: {source}")]
    Sysfs {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected sysfs contents in {path}: {contents:?}")]
    SysfsParse { path: PathBuf, contents: String },

    #[error("No backlight device found")]
    NoBacklight,

    #[error("Backend rejected value: {0}")]
    Rejected(String),
}
