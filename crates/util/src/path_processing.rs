use std::path::PathBuf;

use dirs_next::home_dir;

/// Expands a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let p = path.trim();
    if p == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = p.strip_prefix("~/") {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    if let Some(rest) = p.strip_prefix("~\\") {
        // Windows-style
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    PathBuf::from(p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_absolute_paths_alone() {
        assert_eq!(expand_tilde(" /etc/ghwf/config.json "), PathBuf::from("/etc/ghwf/config.json"));
    }

    #[test]
    fn expands_home_prefix() {
        let Some(home) = home_dir() else {
            return;
        };
        assert_eq!(expand_tilde("~/ghwf/config.json"), home.join("ghwf/config.json"));
        assert_eq!(expand_tilde("~"), home);
    }
}
