mod overlay;

pub use overlay::{Adjustment, OverlayEntry, OverlayValue, StyleOverlay};

use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::scoring::ModelConfig;

const APP_DIR: &str = "tee-fit";
const CONFIG_DIR: &str = "config";
const BASE_CONFIG_FILE: &str = "model_config.yaml";
const STYLE_DIR: &str = "style_profiles";

const SHIPPED_BASE: &str = include_str!("../../config/model_config.yaml");
const SHIPPED_STYLES: [(&str, &str); 2] = [
    ("relaxed", include_str!("../../style_profiles/relaxed.yaml")),
    ("slim", include_str!("../../style_profiles/slim.yaml")),
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config file at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: invalid YAML in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("style profile '{profile}': {message}")]
    Overlay { profile: String, message: String },

    #[error("invalid fit model config:\n  - {}", .0.join("\n  - "))]
    Invalid(Vec<String>),
}

/// Platform config directory for tee-fit (e.g. ~/.config/tee-fit/)
pub fn default_config_root() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(format!(".{}", APP_DIR)))
}

/// Pick the directory holding `config/` and `style_profiles/`.
///
/// An explicit directory wins; otherwise the working directory is used when
/// it carries a base config, and the platform config directory when not.
pub fn resolve_config_root(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir;
    }
    match std::env::current_dir() {
        Ok(cwd) if base_config_path(&cwd).exists() => cwd,
        _ => default_config_root(),
    }
}

pub fn base_config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_DIR).join(BASE_CONFIG_FILE)
}

/// Path of a style profile; a trailing `.yaml` in `name` is tolerated.
pub fn style_profile_path(root: &Path, name: &str) -> PathBuf {
    let name = name.strip_suffix(".yaml").unwrap_or(name);
    root.join(STYLE_DIR).join(format!("{}.yaml", name))
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the mandatory base configuration under `root`.
pub fn load_base_config(root: &Path) -> Result<ModelConfig, ConfigError> {
    let path = base_config_path(root);
    let content = read_file(&path)?;
    let config = serde_saphyr::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.clone(),
        message: e.to_string(),
    })?;
    debug!(path = %path.display(), "Loaded base config");
    Ok(config)
}

/// Load a style overlay. A missing overlay file is `Ok(None)`.
pub fn load_style_overlay(root: &Path, name: &str) -> Result<Option<StyleOverlay>, ConfigError> {
    let path = style_profile_path(root, name);
    let content = match read_file(&path) {
        Ok(content) => content,
        Err(ConfigError::NotFound { .. }) => {
            warn!(
                profile = name,
                path = %path.display(),
                "Style profile not found, using base config"
            );
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    StyleOverlay::parse(name, &path, &content).map(Some)
}

/// Resolve the effective configuration: the base config, with the named
/// style overlay merged on top when one is requested and present.
pub fn load_model_config(
    root: &Path,
    style_profile: Option<&str>,
) -> Result<ModelConfig, ConfigError> {
    let base = load_base_config(root)?;
    let Some(name) = style_profile else {
        return Ok(base);
    };
    match load_style_overlay(root, name)? {
        Some(overlay) => overlay.apply(&base),
        None => Ok(base),
    }
}

/// Names of the style profiles available under `root`, sorted.
pub fn list_style_profiles(root: &Path) -> Result<Vec<String>> {
    let pattern = root.join(STYLE_DIR).join("*.yaml");
    let pattern = pattern.to_string_lossy();
    let mut names: Vec<String> = glob::glob(&pattern)
        .with_context(|| format!("Invalid style profile pattern {}", pattern))?
        .filter_map(|entry| entry.ok())
        .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .collect();
    names.sort();
    Ok(names)
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory at {}", parent.display()))?;
    }
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save {}", path.display()))?;
    Ok(())
}

/// Write the shipped base config and style profiles under `root`.
///
/// Existing files are kept unless `force` is set. Returns the files written.
pub fn write_default_config(root: &Path, force: bool) -> Result<Vec<PathBuf>> {
    let mut files = vec![(base_config_path(root), SHIPPED_BASE)];
    files.extend(
        SHIPPED_STYLES
            .iter()
            .map(|(name, content)| (style_profile_path(root, name), *content)),
    );

    let mut written = Vec::new();
    for (path, content) in files {
        if path.exists() && !force {
            debug!(path = %path.display(), "Keeping existing file");
            continue;
        }
        write_atomic(&path, content)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn base_yaml() -> &'static str {
        r#"
aspects:
  chest: { weight: 0.20, scorer: score_chest, body_field: ChestWidth, shirt_field: ChestWidth }
  length:
    weight: 0.15
    scorer: score_length
    body_field: TorsoLength
    shirt_field: BodyLength
    needs_chest: true
scoring_params:
  chest: { relaxed_max: 2.0 }
interaction_adjustments:
  relaxed_heavy_bonus: 3
"#
    }

    #[test]
    fn test_missing_base_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_model_config(dir.path(), None);
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_malformed_base_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "config/model_config.yaml", "aspects: [1, 2");
        let result = load_model_config(dir.path(), None);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_no_overlay_uses_base() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "config/model_config.yaml", base_yaml());
        let config = load_model_config(dir.path(), None).unwrap();
        assert_eq!(config.aspects["chest"].weight, 0.20);
        assert_eq!(config.interaction_adjustments["relaxed_heavy_bonus"], 3.0);
    }

    #[test]
    fn test_missing_overlay_falls_back_to_base() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "config/model_config.yaml", base_yaml());
        let base = load_model_config(dir.path(), None).unwrap();
        let styled = load_model_config(dir.path(), Some("nonexistent")).unwrap();
        assert_eq!(base, styled);
    }

    #[test]
    fn test_overlay_merges_on_top() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "config/model_config.yaml", base_yaml());
        write(
            dir.path(),
            "style_profiles/relaxed.yaml",
            r#"
name: relaxed
description: Relaxed fit overlay
aspects:
  chest: { weight: 0.17 }
  length: { weight: 0.17 }
scoring_params:
  chest: { relaxed_max_multiplier: 1.35 }
interaction_adjustments:
  relaxed_heavy_bonus: 7
"#,
        );
        let config = load_model_config(dir.path(), Some("relaxed")).unwrap();
        assert_eq!(config.aspects["chest"].weight, 0.17);
        assert_eq!(config.aspects["length"].weight, 0.17);
        assert!((config.scoring_params["chest"]["relaxed_max"] - 2.7).abs() < 1e-9);
        assert_eq!(config.interaction_adjustments["relaxed_heavy_bonus"], 7.0);
    }

    #[test]
    fn test_malformed_overlay_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "config/model_config.yaml", base_yaml());
        write(dir.path(), "style_profiles/broken.yaml", "aspects: [oops");
        let result = load_model_config(dir.path(), Some("broken"));
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_style_profile_path_strips_extension() {
        let root = Path::new("/tmp/fit");
        assert_eq!(
            style_profile_path(root, "slim.yaml"),
            style_profile_path(root, "slim")
        );
    }

    #[test]
    fn test_explicit_root_wins() {
        let root = resolve_config_root(Some(PathBuf::from("/srv/fit")));
        assert_eq!(root, PathBuf::from("/srv/fit"));
    }

    #[test]
    fn test_write_default_config_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_default_config(dir.path(), false).unwrap();
        assert_eq!(written.len(), 3);

        let config = load_model_config(dir.path(), None).unwrap();
        assert_eq!(config, ModelConfig::default());
        assert_eq!(list_style_profiles(dir.path()).unwrap(), vec!["relaxed", "slim"]);

        // Second run keeps what is there
        assert!(write_default_config(dir.path(), false).unwrap().is_empty());
        assert_eq!(write_default_config(dir.path(), true).unwrap().len(), 3);
    }

    #[test]
    fn test_shipped_relaxed_overlay() {
        let dir = tempfile::tempdir().unwrap();
        write_default_config(dir.path(), false).unwrap();
        let config = load_model_config(dir.path(), Some("relaxed")).unwrap();
        assert!((config.scoring_params["chest"]["relaxed_max"] - 2.7).abs() < 1e-9);
        assert_eq!(config.aspects["chest"].weight, 0.17);
    }

    #[test]
    fn test_invalid_error_lists_every_problem() {
        let err = ConfigError::Invalid(vec!["a: bad".to_string(), "b: worse".to_string()]);
        let message = err.to_string();
        assert!(message.contains("a: bad"));
        assert!(message.contains("b: worse"));
    }
}
