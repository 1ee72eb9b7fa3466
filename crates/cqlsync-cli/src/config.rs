//! Configuration file handling.
//!
//! Looks for `.config/cqlsync.styx` in the current directory or any parent directory.

use camino::{Utf8Path, Utf8PathBuf};
pub use cqlsync_config::{Config, ConfigError};

const CONFIG_FILE: &str = ".config/cqlsync.styx";

/// A loaded configuration and the directory holding its `.config/`.
pub struct Loaded {
    pub config: Config,
    pub root: Utf8PathBuf,
}

impl Loaded {
    /// Resolve a path from the configuration against the project root.
    pub fn resolve(&self, path: &str) -> Utf8PathBuf {
        self.root.join(path)
    }
}

/// Load configuration from `.config/cqlsync.styx`, searching up the directory tree.
pub fn load() -> Result<Loaded, ConfigError> {
    let cwd = std::env::current_dir()?;
    let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| ConfigError::Io(e.into_io_error()))?;
    let path = find_config_file(&cwd)?;
    load_file(&path)
}

/// Load a configuration file given explicitly.
pub fn load_file(path: &Utf8Path) -> Result<Loaded, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = Config::parse(&content)?;

    // `<root>/.config/cqlsync.styx`, or the file's own directory for any other layout.
    let dir = path.parent().unwrap_or(Utf8Path::new("."));
    let root = match dir.file_name() {
        Some(".config") => dir.parent().unwrap_or(dir),
        _ => dir,
    };

    tracing::debug!(%path, %root, "loaded configuration");
    Ok(Loaded {
        config,
        root: root.to_owned(),
    })
}

/// Find `.config/cqlsync.styx` by searching up the directory tree.
fn find_config_file(start: &Utf8Path) -> Result<Utf8PathBuf, ConfigError> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE))
        .find(|candidate| candidate.exists())
        .ok_or(ConfigError::NotFound)
}
