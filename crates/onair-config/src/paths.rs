//! Platform-specific paths for the engine config and user templates.
//!
//! - **User config**: `~/.config/onair/` (Linux), `~/Library/Application Support/onair/` (macOS), `%APPDATA%\onair\` (Windows)
//! - **Engine config file**: `<user config>/engine.toml`
//! - **User templates**: `<user config>/templates/`

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Application name used for directory paths.
const APP_NAME: &str = "onair";

/// Subdirectory name for templates.
const TEMPLATES_SUBDIR: &str = "templates";

/// File name of the engine config.
const ENGINE_CONFIG_FILE: &str = "engine.toml";

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform config directory
/// cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the path of the user engine config file.
pub fn engine_config_path() -> PathBuf {
    user_config_dir().join(ENGINE_CONFIG_FILE)
}

/// Returns the user-specific templates directory.
pub fn user_templates_dir() -> PathBuf {
    user_config_dir().join(TEMPLATES_SUBDIR)
}

/// Ensure the user templates directory (and the config directory above it)
/// exists.
pub fn ensure_user_templates_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_templates_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }
    Ok(dir)
}

/// Find a template file by path or by name.
///
/// A name that is an existing file is returned as is. Otherwise the user
/// templates directory is searched, adding `.toml` if missing.
pub fn find_template(name: &str) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };
    let user_path = user_templates_dir().join(filename);
    user_path.is_file().then_some(user_path)
}

/// List the template files in the user templates directory.
pub fn list_user_templates() -> Vec<PathBuf> {
    list_templates_in_dir(&user_templates_dir())
}

/// List `.toml` files in `dir`, sorted. Missing or unreadable directories
/// yield an empty list.
pub fn list_templates_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut templates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    templates.sort();
    templates
}

/// Get the template name from a file path (the file stem).
pub fn template_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dirs_are_namespaced() {
        assert!(user_config_dir().ends_with("onair"));
        assert!(engine_config_path().ends_with("onair/engine.toml"));
        assert!(user_templates_dir().ends_with("onair/templates"));
    }

    #[test]
    fn test_find_template_by_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("card.toml");
        fs::write(&path, "name = \"card\"").unwrap();
        assert_eq!(find_template(path.to_str().unwrap()), Some(path));
    }

    #[test]
    fn test_find_template_not_found() {
        assert!(find_template("nonexistent_template_12345").is_none());
    }

    #[test]
    fn test_list_templates_in_dir() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.toml"), "").unwrap();
        fs::write(temp_dir.path().join("a.toml"), "").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "").unwrap();

        let names: Vec<_> = list_templates_in_dir(temp_dir.path())
            .iter()
            .filter_map(|p| template_name_from_path(p))
            .collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        assert!(list_templates_in_dir(Path::new("/nonexistent/path/12345")).is_empty());
    }
}
