use crate::config::FixtureSpec;
use crate::errors::{FixtureError, Result};
use crate::fixture::Fixture;
use crate::state::StateManager;
use colored::Colorize;
use std::path::Path;

/// Start the fixture and record it in `state_dir`
///
/// Prints the reserved address on stdout so scripts can capture it.
pub fn run(
    config: &Path,
    test_dir: &Path,
    clickhouse_url: &str,
    clickhouse_container: &str,
    state_dir: &Path,
) -> Result<()> {
    let state_mgr = StateManager::new(state_dir)?;

    if let Some(record) = state_mgr.load()? {
        return Err(FixtureError::State(format!(
            "Fixture '{}' is already tracked at {}. Run 'cchfix down' first.",
            record.container, record.address
        )));
    }

    let spec = FixtureSpec::load(config)?;
    let mut fixture = Fixture::new(spec);

    eprintln!(
        "Starting {} linked to '{}'...",
        fixture.spec().image_ref(),
        clickhouse_container
    );

    if let Err(e) = fixture.start(test_dir, clickhouse_url, clickhouse_container) {
        if !e.output().is_empty() {
            eprint!("{}", e.output());
        }
        // A half-created container can still be removed by 'down'
        if let Some(record) = fixture.record() {
            state_mgr.save(&record)?;
        }
        if let Some(config_file) = fixture.config_file() {
            eprintln!(
                "{} rendered config kept at {}",
                "⚠".yellow(),
                config_file.display()
            );
        }
        return Err(e);
    }

    if let Some(record) = fixture.record() {
        state_mgr.save(&record)?;
    }

    eprintln!(
        "{} carbon-clickhouse listening on {}",
        "✓".green(),
        fixture.address()
    );
    println!("{}", fixture.address());

    Ok(())
}
