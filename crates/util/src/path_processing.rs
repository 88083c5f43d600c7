use std::path::PathBuf;

use dirs_next::home_dir;

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let p = path.trim();
    if p == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = p.strip_prefix("~/").or_else(|| p.strip_prefix("~\\")) {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    PathBuf::from(p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_trimmed_only() {
        assert_eq!(expand_tilde("  /etc/qflow/config.json "), PathBuf::from("/etc/qflow/config.json"));
    }

    #[test]
    fn home_prefix_is_expanded() {
        if let Some(home) = home_dir() {
            assert_eq!(expand_tilde("~/qflow.json"), home.join("qflow.json"));
            assert_eq!(expand_tilde("~"), home);
        }
    }
}
