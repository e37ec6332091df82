use anyhow::{Context, Result, bail};
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// True for locators that must be cloned rather than read in place.
pub fn is_remote(locator: &str) -> bool {
    locator.starts_with("http://") || locator.starts_with("https://") || locator.starts_with("git@")
}

/// Shallow-clones `url` into `dest` with a hard deadline. The child is
/// killed on timeout and the clone reported failed; no retry.
pub fn clone_shallow(url: &str, dest: &Path, timeout: Duration) -> Result<()> {
    let mut child = Command::new("git")
        .args(["clone", "--depth", "1"])
        .arg(url)
        .arg(dest)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .context("Failed to spawn git; is it installed?")?;

    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait().context("Failed to poll git clone")? {
            Some(status) if status.success() => return Ok(()),
            Some(status) => {
                let mut stderr = String::new();
                if let Some(mut pipe) = child.stderr.take() {
                    let _ = pipe.read_to_string(&mut stderr);
                }
                bail!("git clone of {} failed ({}): {}", url, status, stderr.trim());
            }
            None => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    bail!("git clone of {} timed out after {:?}", url, timeout);
                }
                std::thread::sleep(Duration::from_millis(100));
            }
        }
    }
}
