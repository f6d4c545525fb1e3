// Lifecycle of the disposable carbon-clickhouse container
//
// `start` acquires resources in a fixed order (address, scratch directory,
// rendered config, container). Anything that fails before the runtime is
// invoked releases what was acquired; a failed launch keeps the scratch
// directory so the rendered config can be inspected.

use crate::config::{FixtureSpec, DEFAULT_DOCKER};
use crate::docker::container::{rm_args, stop_args, ContainerRuntime, DockerCli, LaunchSpec};
use crate::docker::ports::{LocalPortAllocator, PortAllocator};
use crate::errors::{FixtureError, Result};
use crate::state::FixtureRecord;
use crate::templates::{render_config, TemplateParams, CONFIG_FILE_NAME};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Container name used for every fixture. Only one can be live at a time;
/// a second `start` fails in the runtime with a name conflict.
pub const CONTAINER_NAME: &str = "carbon-clickhouse-gch-test";

const SCRATCH_PREFIX: &str = "carbon-clickhouse";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureState {
    Unstarted,
    Running,
    /// The runtime was invoked and failed; the scratch directory is kept
    LaunchFailed,
    Stopped,
    Deleted,
}

impl FixtureState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixtureState::Unstarted => "unstarted",
            FixtureState::Running => "running",
            FixtureState::LaunchFailed => "launch-failed",
            FixtureState::Stopped => "stopped",
            FixtureState::Deleted => "deleted",
        }
    }
}

/// Manages one carbon-clickhouse container for a test run
///
/// Calls are expected to come from a single test's setup and teardown in
/// sequence. Dropping a `Fixture` releases nothing; call [`Fixture::delete`]
/// or [`Fixture::cleanup`].
pub struct Fixture {
    spec: FixtureSpec,
    runtime: Arc<dyn ContainerRuntime>,
    allocator: Arc<dyn PortAllocator>,
    address: String,
    container: String,
    scratch_dir: Option<PathBuf>,
    state: FixtureState,
    started_at: Option<DateTime<Utc>>,
}

impl Fixture {
    /// Create a fixture driving the runtime binary named in `spec.docker`
    pub fn new(spec: FixtureSpec) -> Self {
        let binary = if spec.docker.is_empty() {
            DEFAULT_DOCKER.to_string()
        } else {
            spec.docker.clone()
        };
        Self::with_parts(
            spec,
            Arc::new(DockerCli::new(binary)),
            Arc::new(LocalPortAllocator),
        )
    }

    /// Create a fixture with explicit runtime and allocator
    pub fn with_parts(
        spec: FixtureSpec,
        runtime: Arc<dyn ContainerRuntime>,
        allocator: Arc<dyn PortAllocator>,
    ) -> Self {
        Self {
            spec,
            runtime,
            allocator,
            address: String::new(),
            container: String::new(),
            scratch_dir: None,
            state: FixtureState::Unstarted,
            started_at: None,
        }
    }

    /// Rebuild a running fixture from a saved record
    pub fn restore(record: FixtureRecord) -> Self {
        let (image, version) = record
            .image_ref
            .rsplit_once(':')
            .unwrap_or((record.image_ref.as_str(), ""));
        let spec = FixtureSpec::new(version)
            .with_image(image)
            .with_docker(record.docker.clone());

        let mut fixture = Self::new(spec);
        fixture.address = record.address;
        fixture.container = record.container;
        fixture.scratch_dir = record.scratch_dir;
        fixture.started_at = Some(record.started_at);
        fixture.state = if record.launch_failed {
            FixtureState::LaunchFailed
        } else {
            FixtureState::Running
        };
        fixture
    }

    /// Start the container, linked to `clickhouse_container` and configured
    /// from `test_dir/<template>` with `clickhouse_url` and the reserved address.
    ///
    /// Returns the runtime's combined output. A launch failure returns
    /// `RuntimeFailed` carrying that output; see [`FixtureError::output`].
    pub fn start(
        &mut self,
        test_dir: &Path,
        clickhouse_url: &str,
        clickhouse_container: &str,
    ) -> Result<String> {
        self.spec.validate()?;
        self.spec.apply_defaults();

        // A failed launch leaves its scratch directory behind; a live
        // container still has its own mounted
        if self.state == FixtureState::LaunchFailed {
            self.cleanup();
        }

        self.address = self.allocator.allocate(None)?;

        let scratch_dir = tempfile::Builder::new()
            .prefix(SCRATCH_PREFIX)
            .tempdir()
            .map_err(FixtureError::ScratchDir)?
            .keep();
        tracing::debug!(dir = %scratch_dir.display(), "created scratch directory");
        self.scratch_dir = Some(scratch_dir.clone());

        // The second reservation replaces the first
        self.address = match self.allocator.allocate(None) {
            Ok(address) => address,
            Err(e) => {
                self.cleanup();
                return Err(e);
            }
        };

        if let Err(e) = self.write_config(test_dir, clickhouse_url, &scratch_dir) {
            self.cleanup();
            return Err(e);
        }

        let launch = LaunchSpec {
            name: CONTAINER_NAME,
            address: &self.address,
            config_dir: &scratch_dir,
            link: clickhouse_container,
            tz: self.spec.tz.as_deref(),
            image_ref: self.spec.image_ref(),
        };
        let args = launch.to_args();
        let command = format!("{} {}", self.runtime.program(), args.join(" "));

        let output = match self.runtime.exec(&args) {
            Ok(output) => output,
            Err(e) => {
                self.state = FixtureState::LaunchFailed;
                return Err(e);
            }
        };

        // From here on a container may exist, so teardown has something to remove
        self.container = CONTAINER_NAME.to_string();

        match output.into_result(command) {
            Ok(out) => {
                self.state = FixtureState::Running;
                self.started_at = Some(Utc::now());
                tracing::info!(address = %self.address, image = %self.spec.image_ref(), "carbon-clickhouse started");
                Ok(out)
            }
            Err(e) => {
                self.state = FixtureState::LaunchFailed;
                tracing::warn!(
                    dir = %scratch_dir.display(),
                    "carbon-clickhouse launch failed, keeping scratch directory"
                );
                Err(e)
            }
        }
    }

    /// Stop the container; with `also_delete`, remove it as well
    ///
    /// A no-op returning empty output when no container is tracked. If the
    /// stop fails, nothing is deleted.
    pub fn stop(&mut self, also_delete: bool) -> Result<String> {
        if self.container.is_empty() {
            return Ok(String::new());
        }

        let out = self.runtime.exec_checked(&stop_args(&self.container))?;
        self.state = FixtureState::Stopped;
        tracing::info!(container = %self.container, "carbon-clickhouse stopped");

        if also_delete {
            return self.delete();
        }
        Ok(out)
    }

    /// Remove the container and release the scratch directory
    ///
    /// The scratch directory goes away even when removal fails; the container
    /// name stays tracked in that case so the call can be retried.
    pub fn delete(&mut self) -> Result<String> {
        if self.container.is_empty() {
            return Ok(String::new());
        }

        let result = self.runtime.exec_checked(&rm_args(&self.container));
        if result.is_ok() {
            tracing::info!(container = %self.container, "carbon-clickhouse removed");
            self.container.clear();
            self.state = FixtureState::Deleted;
        }

        self.cleanup();

        result
    }

    /// Remove the scratch directory if one is tracked. Never fails.
    pub fn cleanup(&mut self) {
        if let Some(dir) = self.scratch_dir.take() {
            if let Err(e) = fs::remove_dir_all(&dir) {
                tracing::warn!(dir = %dir.display(), error = %e, "failed to remove scratch directory");
            }
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch_dir.as_deref()
    }

    /// Path of the rendered config, while the scratch directory exists
    pub fn config_file(&self) -> Option<PathBuf> {
        self.scratch_dir.as_ref().map(|d| d.join(CONFIG_FILE_NAME))
    }

    pub fn state(&self) -> FixtureState {
        self.state
    }

    pub fn spec(&self) -> &FixtureSpec {
        &self.spec
    }

    /// Snapshot for persisting, `None` unless a container is tracked
    pub fn record(&self) -> Option<FixtureRecord> {
        if self.container.is_empty() {
            return None;
        }

        Some(FixtureRecord {
            address: self.address.clone(),
            container: self.container.clone(),
            scratch_dir: self.scratch_dir.clone(),
            docker: self.runtime.program().to_string(),
            image_ref: self.spec.image_ref(),
            started_at: self.started_at.unwrap_or_else(Utc::now),
            launch_failed: self.state == FixtureState::LaunchFailed,
        })
    }

    fn write_config(&self, test_dir: &Path, clickhouse_url: &str, scratch_dir: &Path) -> Result<()> {
        let params = TemplateParams {
            CLICKHOUSE_URL: clickhouse_url,
            CCH_ADDR: &self.address,
            TZ: self.spec.tz.as_deref().unwrap_or(""),
        };
        let rendered = render_config(test_dir, &self.spec.template, &params)?;

        let path = scratch_dir.join(CONFIG_FILE_NAME);
        fs::write(&path, rendered).map_err(|e| FixtureError::ConfigWrite {
            path: path.clone(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), "rendered carbon-clickhouse config");

        Ok(())
    }
}
