//! Filesystem utilities for key files.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Permission mode applied to files that hold private key material.
#[cfg(unix)]
const PRIVATE_FILE_MODE: u32 = 0o600;

/// Write `contents` to `destination` through a sibling temp file and a rename.
///
/// Readers never observe a half-written key file. When `private` is set the
/// file is restricted to the owner before any bytes are written (Unix only).
///
/// # Errors
///
/// Returns an error if the temp file cannot be written or the rename fails.
pub fn write_atomic(destination: &Path, contents: &[u8], private: bool) -> io::Result<()> {
    let temp_path = temp_sibling(destination);

    let mut file = fs::File::create(&temp_path)?;
    if private {
        restrict_permissions(&temp_path)?;
    }
    if let Err(err) = file.write_all(contents).and_then(|()| file.sync_all()) {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }
    drop(file);

    rename_with_fallback(&temp_path, destination)
}

/// Atomically rename a file, with fallback for platforms where rename fails if target exists.
///
/// On some platforms (notably Windows), `fs::rename` fails if the destination already exists.
/// This function handles that case by removing the destination first and retrying.
///
/// If the rename ultimately fails, the temp file is cleaned up.
fn rename_with_fallback(temp_path: &Path, destination: &Path) -> io::Result<()> {
    if let Err(initial_err) = fs::rename(temp_path, destination) {
        // Best-effort replace on platforms where rename fails if target exists.
        let _ = fs::remove_file(destination);
        fs::rename(temp_path, destination).map_err(|retry_err| {
            // Clean up the temp file on failure
            let _ = fs::remove_file(temp_path);
            io::Error::new(
                retry_err.kind(),
                format!(
                    "Atomic rename failed (initial: {}, retry: {})",
                    initial_err, retry_err
                ),
            )
        })?;
    }
    Ok(())
}

fn temp_sibling(destination: &Path) -> PathBuf {
    let file_name = destination
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "key".to_string());
    destination.with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()))
}

fn restrict_permissions(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path)?.permissions();
        perms.set_mode(PRIVATE_FILE_MODE);
        fs::set_permissions(path, perms)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
