//! Configuration access port trait.

use std::path::PathBuf;

pub trait ConfigPort {
    /// Raw value of `key` in `[section]`, if present.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Trimmed path value; blank counts as absent.
    fn get_path(&self, section: &str, key: &str) -> Option<PathBuf> {
        self.get_string(section, key)
            .map(|raw| raw.trim().to_string())
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }
}
