use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FixtureError {
    #[error("Invalid fixture spec: {0}")]
    Validation(String),

    #[error("Port allocation error: {0}")]
    PortAllocation(String),

    #[error("Failed to create scratch directory: {0}")]
    ScratchDir(#[source] std::io::Error),

    #[error("Template '{}' not found: {source}", .path.display())]
    TemplateNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse template '{}': {source}", .path.display())]
    TemplateParse {
        path: PathBuf,
        #[source]
        source: minijinja::Error,
    },

    #[error("Failed to render template '{}': {source}", .path.display())]
    TemplateRender {
        path: PathBuf,
        #[source]
        source: minijinja::Error,
    },

    #[error("Failed to write config '{}': {source}", .path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to run '{program}': {source}")]
    RuntimeSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command '{command}' failed ({}): {}", status_text(.status), .output.trim())]
    RuntimeFailed {
        command: String,
        status: Option<i32>,
        output: String,
    },

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("State error: {0}")]
    State(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FixtureError {
    /// Combined runtime output carried by this error, empty if there is none
    pub fn output(&self) -> &str {
        match self {
            FixtureError::RuntimeFailed { output, .. } => output,
            _ => "",
        }
    }

    /// True for failures that happened before the container runtime was invoked
    pub fn is_pre_launch(&self) -> bool {
        !matches!(
            self,
            FixtureError::RuntimeFailed { .. } | FixtureError::RuntimeSpawn { .. }
        )
    }
}

fn status_text(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, FixtureError>;
