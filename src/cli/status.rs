use crate::errors::Result;
use crate::state::StateManager;
use std::path::Path;

/// Show the tracked fixture, if any
pub fn run(state_dir: &Path) -> Result<()> {
    let state_mgr = StateManager::new(state_dir)?;

    let Some(record) = state_mgr.load()? else {
        println!("No fixture running.");
        return Ok(());
    };

    println!("{:<12} {}", "CONTAINER", record.container);
    println!("{:<12} {}", "ADDRESS", record.address);
    println!("{:<12} {}", "IMAGE", record.image_ref);
    println!("{:<12} {}", "RUNTIME", record.docker);
    if let Some(dir) = &record.scratch_dir {
        println!("{:<12} {}", "CONFIG DIR", dir.display());
    }
    println!("{:<12} {}", "STARTED", record.started_at.to_rfc3339());

    Ok(())
}
