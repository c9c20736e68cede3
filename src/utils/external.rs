use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::process::Command;

/// Runs an external extraction tool and waits for it. A missing tool or a
/// non-zero exit status is an error.
pub fn run_tool<I, S>(tool: &str, args: I) -> Result<(), Box<dyn std::error::Error>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(tool);
    command.args(args);
    log::debug!("Running {:?}", command);

    let status = command
        .status()
        .map_err(|e| format!("Failed to run {}: {}", tool, e))?;
    if !status.success() {
        return Err(format!("{} failed ({})", tool, status).into());
    }
    Ok(())
}

/// Removes a previous extraction so the tool starts from a clean directory.
pub fn remove_dir_if_exists(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)?;
    }
    Ok(())
}
