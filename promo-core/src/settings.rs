//! Settings-file persistence.
//!
//! A promotion's admin configuration lives in a single YAML file chosen by the
//! user. The file stem doubles as the key for the per-file sync state.
//!
//! Write flow: serialize -> `<file>.tmp` sibling -> `chmod 0600` -> `rename`.
//! The `.tmp` file always sits next to the target so the rename never crosses
//! filesystems.

use std::path::{Path, PathBuf};

use crate::error::SettingsError;
use crate::types::PromotionSettings;

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// Key used for sync state: the settings file stem (`spring.yaml` -> `spring`).
pub fn settings_key(path: &Path) -> String {
    path.file_stem()
        .unwrap_or_else(|| path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

fn tmp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "settings.yaml".to_string());
    path.with_file_name(format!("{name}.tmp"))
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load settings from `path`.
///
/// Returns `SettingsError::NotFound` if absent,
/// `SettingsError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(path: &Path) -> Result<PromotionSettings, SettingsError> {
    if !path.exists() {
        return Err(SettingsError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&contents).map_err(|e| SettingsError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save settings to `path`, creating parent directories.
pub fn save_at(path: &Path, settings: &PromotionSettings) -> Result<(), SettingsError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    let yaml = serde_yaml::to_string(settings)?;
    std::fs::write(&tmp, yaml)?;
    set_file_permissions(&tmp)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// 4. Init
// ---------------------------------------------------------------------------

/// Scaffold a settings file with default values.
///
/// Idempotent: if the file already exists, loads and returns it unchanged.
pub fn init_at(path: &Path, name: Option<String>) -> Result<PromotionSettings, SettingsError> {
    if path.exists() {
        return load_at(path);
    }
    let mut settings = PromotionSettings::default();
    settings.name = name.unwrap_or_else(|| settings_key(path));
    save_at(path, &settings)?;
    Ok(settings)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), SettingsError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), SettingsError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SegmentId, SegmentSpec};
    use tempfile::TempDir;

    #[test]
    fn settings_key_is_file_stem() {
        assert_eq!(settings_key(Path::new("/tmp/spring.yaml")), "spring");
        assert_eq!(settings_key(Path::new("plain")), "plain");
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("spring.yaml");
        let mut settings = PromotionSettings::default();
        settings.name = "Spring".into();
        settings.segments = vec![SegmentSpec::new("A", "Sport").with_id(SegmentId(3))];
        save_at(&path, &settings).expect("save");
        let loaded = load_at(&path).expect("load");
        assert_eq!(loaded, settings);
    }

    #[test]
    fn save_cleans_up_tmp() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("spring.yaml");
        save_at(&path, &PromotionSettings::default()).expect("save");
        assert!(!dir.path().join("spring.yaml.tmp").exists());
    }

    #[test]
    fn load_missing_returns_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let err = load_at(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, SettingsError::NotFound { .. }));
    }

    #[test]
    fn init_uses_stem_as_default_name_and_is_idempotent() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("autumn.yaml");
        let first = init_at(&path, None).expect("init");
        assert_eq!(first.name, "autumn");

        let mut edited = first.clone();
        edited.description = "kept".into();
        save_at(&path, &edited).expect("save");

        let second = init_at(&path, Some("ignored".into())).expect("init again");
        assert_eq!(second.description, "kept");
        assert_eq!(second.name, "autumn");
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("p.yaml");
        save_at(&path, &PromotionSettings::default()).expect("save");
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
