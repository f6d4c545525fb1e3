use crate::errors::{FixtureError, Result};
use crate::fixture::{Fixture, FixtureState};
use crate::state::StateManager;
use colored::Colorize;
use std::path::Path;

/// Stop the tracked fixture, removing it unless `keep` is set
///
/// A record left by a failed launch skips `stop` and is forgotten even when
/// `rm` fails. `force` does the same for a fixture whose `stop` fails.
pub fn run(keep: bool, force: bool, state_dir: &Path) -> Result<()> {
    let state_mgr = StateManager::new(state_dir)?;

    let Some(record) = state_mgr.load()? else {
        eprintln!("No fixture is tracked in {}", state_dir.display());
        return Ok(());
    };

    let mut fixture = Fixture::restore(record);
    let container = fixture.container().to_string();

    if fixture.state() == FixtureState::LaunchFailed {
        eprintln!("Releasing '{}' left by a failed launch...", container);
        remove_best_effort(&mut fixture);
        state_mgr.remove()?;
        eprintln!("{} Released '{}'", "✓".green(), container);
        return Ok(());
    }

    eprintln!("Stopping '{}'...", container);
    if let Err(e) = fixture.stop(!keep) {
        print_output(&e);
        if !force || keep {
            return Err(e);
        }
        tracing::warn!(container = %container, error = %e, "stop failed, forcing removal");
        remove_best_effort(&mut fixture);
        state_mgr.remove()?;
        eprintln!("{} Forgot '{}'", "⚠".yellow(), container);
        return Ok(());
    }
    tracing::debug!(state = fixture.state().as_str(), "teardown finished");

    if keep {
        eprintln!("{} Stopped '{}' (container kept)", "✓".green(), container);
    } else {
        state_mgr.remove()?;
        eprintln!("{} Removed '{}'", "✓".green(), container);
    }

    Ok(())
}

fn remove_best_effort(fixture: &mut Fixture) {
    if let Err(e) = fixture.delete() {
        print_output(&e);
        tracing::warn!(container = %fixture.container(), error = %e, "rm failed");
    }
}

fn print_output(e: &FixtureError) {
    if !e.output().is_empty() {
        eprint!("{}", e.output());
    }
}
