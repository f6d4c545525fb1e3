// Configuration template rendering for the fixture
//
// Templates are Jinja-style (minijinja). Go text/template field references
// such as `{{.CCH_ADDR}}` are accepted too, so config templates written for
// the original graphite-clickhouse e2e suite can be used unchanged.

use crate::errors::{FixtureError, Result};
use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Name of the rendered file inside the scratch directory
pub const CONFIG_FILE_NAME: &str = "carbon-clickhouse.conf";

/// Matches `{{.NAME`, `{{ .NAME`, `{{- .NAME`
static GO_FIELD_REF: OnceLock<Regex> = OnceLock::new();

fn go_field_ref() -> &'static Regex {
    GO_FIELD_REF.get_or_init(|| {
        Regex::new(r"\{\{(-?)(\s*)\.([A-Za-z_][A-Za-z0-9_]*)").expect("Invalid Go field regex")
    })
}

/// Parameters available to a config template
#[derive(Debug, Clone, Serialize)]
#[allow(non_snake_case)]
pub struct TemplateParams<'a> {
    pub CLICKHOUSE_URL: &'a str,
    pub CCH_ADDR: &'a str,
    /// Timezone override, empty when unset
    pub TZ: &'a str,
}

/// Read `test_dir/template` and render it with `params`
///
/// Each stage fails with its own error variant: `TemplateNotFound` when the
/// file can't be read, `TemplateParse` for syntax errors, `TemplateRender`
/// when rendering fails (including references to unknown parameters).
pub fn render_config<P: Serialize>(test_dir: &Path, template: &str, params: &P) -> Result<String> {
    let path = test_dir.join(template);

    let source = fs::read_to_string(&path).map_err(|e| FixtureError::TemplateNotFound {
        path: path.clone(),
        source: e,
    })?;
    let source = rewrite_go_field_refs(&source);

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(template)
        .to_string();

    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);
    env.set_auto_escape_callback(|_| AutoEscape::None);

    let tmpl = env
        .template_from_named_str(&name, &source)
        .map_err(|e| FixtureError::TemplateParse {
            path: path.clone(),
            source: e,
        })?;

    tmpl.render(params)
        .map_err(|e| FixtureError::TemplateRender { path, source: e })
}

/// Turn Go-style `{{.NAME}}` references into plain `{{NAME}}`
fn rewrite_go_field_refs(source: &str) -> String {
    go_field_ref()
        .replace_all(source, "{{${1}${2}${3}")
        .into_owned()
}
