// Container runtime invocation for the fixture
// Builds run/stop/rm argument lists and executes them without a shell

use crate::errors::{FixtureError, Result};
use std::path::Path;
use std::process::Command;

/// Port carbon-clickhouse listens on inside the container (graphite plaintext)
pub const INTERNAL_PORT: u16 = 2003;

/// Where the image expects its configuration directory
pub const CONTAINER_CONFIG_DIR: &str = "/etc/carbon-clickhouse";

/// Captured result of one runtime invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeOutput {
    /// Exit code, `None` if the process was killed by a signal
    pub status: Option<i32>,
    /// stdout followed by stderr
    pub output: String,
}

impl RuntimeOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Turn a non-zero exit into `RuntimeFailed`, keeping the output
    pub fn into_result(self, command: String) -> Result<String> {
        if self.success() {
            Ok(self.output)
        } else {
            Err(FixtureError::RuntimeFailed {
                command,
                status: self.status,
                output: self.output,
            })
        }
    }
}

/// A container engine driven through its command line
pub trait ContainerRuntime: Send + Sync {
    /// Program name, used in diagnostics
    fn program(&self) -> &str;

    /// Run one subcommand and wait for it. Only spawn failures are errors.
    fn exec(&self, args: &[String]) -> Result<RuntimeOutput>;

    /// Run a subcommand and fail on non-zero exit
    fn exec_checked(&self, args: &[String]) -> Result<String> {
        let command = format!("{} {}", self.program(), args.join(" "));
        self.exec(args)?.into_result(command)
    }
}

/// Docker-compatible CLI (docker, podman, nerdctl)
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: String,
}

impl DockerCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl ContainerRuntime for DockerCli {
    fn program(&self) -> &str {
        &self.binary
    }

    fn exec(&self, args: &[String]) -> Result<RuntimeOutput> {
        tracing::debug!(program = %self.binary, args = ?args, "invoking container runtime");

        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .map_err(|e| FixtureError::RuntimeSpawn {
                program: self.binary.clone(),
                source: e,
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        tracing::debug!(status = ?output.status.code(), "container runtime exited");

        Ok(RuntimeOutput {
            status: output.status.code(),
            output: combined,
        })
    }
}

/// Parameters of a detached `run` invocation
#[derive(Debug, Clone)]
pub struct LaunchSpec<'a> {
    pub name: &'a str,
    pub address: &'a str,
    pub config_dir: &'a Path,
    pub link: &'a str,
    pub tz: Option<&'a str>,
    pub image_ref: String,
}

impl LaunchSpec<'_> {
    /// Build `run -d ...` arguments (safe from injection, no shell involved)
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            self.name.to_string(),
            "-p".to_string(),
            format!("{}:{}", self.address, INTERNAL_PORT),
            "-v".to_string(),
            format!("{}:{}", self.config_dir.display(), CONTAINER_CONFIG_DIR),
            "--link".to_string(),
            self.link.to_string(),
        ];

        if let Some(tz) = self.tz {
            args.push("-e".to_string());
            args.push(format!("TZ={}", tz));
        }

        args.push(self.image_ref.clone());
        args
    }
}

pub fn stop_args(name: &str) -> Vec<String> {
    vec!["stop".to_string(), name.to_string()]
}

pub fn rm_args(name: &str) -> Vec<String> {
    vec!["rm".to_string(), name.to_string()]
}
