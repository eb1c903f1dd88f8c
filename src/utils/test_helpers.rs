//! Fixtures shared by the unit tests: temp file trees, aged files, logging.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

static LOGGING_INIT: Once = Once::new();

/// Sends this crate's `debug` output to the test writer.
///
/// `RUST_LOG` overrides the default filter.
pub fn setup_test_logging() {
    LOGGING_INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("file_locator=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Creates a temp directory holding `(relative path, contents)` files.
/// Parent directories are created as needed.
pub fn file_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (path, content) in files {
        let full = dir.path().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full, content).unwrap();
    }
    dir
}

/// Writes `size` bytes to `dir/name` and backdates its mtime by `days_ago`.
pub fn write_aged_file(dir: &Path, name: &str, size: usize, days_ago: u64) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, vec![b'x'; size]).unwrap();
    let mtime = SystemTime::now() - Duration::from_secs(days_ago * SECONDS_PER_DAY);
    fs::File::options()
        .write(true)
        .open(&path)
        .and_then(|file| file.set_modified(mtime))
        .unwrap();
    path
}

/// Permission tests are meaningless as root, which can read anything.
pub fn running_as_root() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid has no preconditions and no side effects.
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
