use crate::errors::{FixtureError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Runtime binary used when `FixtureSpec::docker` is empty
pub const DEFAULT_DOCKER: &str = "docker";

/// Image used when `FixtureSpec::image` is empty
pub const DEFAULT_IMAGE: &str = "lomik/carbon-clickhouse";

/// Caller-supplied description of the carbon-clickhouse fixture to run
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FixtureSpec {
    /// Image tag to run; required
    #[serde(default)]
    pub version: String,

    /// Container runtime executable
    #[serde(default)]
    pub docker: String,

    #[serde(default)]
    pub image: String,

    /// Config template path, relative to the test directory
    #[serde(default)]
    pub template: String,

    /// Timezone override passed into the container as TZ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tz: Option<String>,
}

impl FixtureSpec {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Default::default()
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn with_tz(mut self, tz: impl Into<String>) -> Self {
        self.tz = Some(tz.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_docker(mut self, docker: impl Into<String>) -> Self {
        self.docker = docker.into();
        self
    }

    /// Load a fixture spec from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            FixtureError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let spec: FixtureSpec = serde_yml::from_str(&content)
            .map_err(|e| FixtureError::ConfigError(format!("Failed to parse config: {}", e)))?;

        Ok(spec)
    }

    /// Check required fields
    pub fn validate(&self) -> Result<()> {
        if self.version.is_empty() {
            return Err(FixtureError::Validation("version not set".to_string()));
        }
        Ok(())
    }

    /// Fill in the runtime binary and image when unset. Pure, no I/O.
    pub fn apply_defaults(&mut self) {
        if self.docker.is_empty() {
            self.docker = DEFAULT_DOCKER.to_string();
        }
        if self.image.is_empty() {
            self.image = DEFAULT_IMAGE.to_string();
        }
        if matches!(self.tz.as_deref(), Some("")) {
            self.tz = None;
        }
    }

    /// Full image reference, `<image>:<version>`
    pub fn image_ref(&self) -> String {
        let image = if self.image.is_empty() {
            DEFAULT_IMAGE
        } else {
            self.image.as_str()
        };
        format!("{}:{}", image, self.version)
    }
}
