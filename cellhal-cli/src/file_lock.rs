use anyhow::{Context, Result, anyhow};
use fs2::FileExt;
use std::fs::{self, File};

/// Takes the per-user agent lock, which serializes agents sharing the saved
/// modem state. The lock is held until the returned file is dropped.
pub fn acquire_agent_lock() -> Result<File> {
    let mut lock_path = dirs::data_local_dir().unwrap_or_else(std::env::temp_dir);
    lock_path.push("cellhal");
    fs::create_dir_all(&lock_path)
        .with_context(|| format!("Failed to create {}", lock_path.display()))?;
    lock_path.push("agent.lock");

    let file = File::create(&lock_path).context("Failed to create lock file")?;

    // Exclusive lock; fails if another agent holds it
    file.try_lock_exclusive()
        .map_err(|_| anyhow!("Another cellhal agent is already running"))?;

    Ok(file)
}
