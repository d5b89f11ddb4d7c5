use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

use super::ConfigError;
use crate::scoring::{AspectConfig, ModelConfig, ParamMap, ProjectionConfig};

const MULTIPLIER_SUFFIX: &str = "_multiplier";
const OFFSET_SUFFIX: &str = "_offset";

/// Overlay keys that describe the profile and are never merged.
const METADATA_KEYS: [&str; 2] = ["name", "description"];

/// Scalar value found anywhere in an overlay.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OverlayValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

/// How an overlay entry changes its base value.
///
/// Parsed from the key suffix: `<key>_multiplier` scales, `<key>_offset`
/// shifts, anything else replaces.
#[derive(Debug, Clone, PartialEq)]
pub enum Adjustment<T> {
    Replace(T),
    Multiply(f64),
    Offset(f64),
}

impl Adjustment<f64> {
    /// Apply to a base value. A missing base takes the overlay value as
    /// given for a multiplier and counts as zero for an offset.
    pub fn apply(&self, base: Option<f64>) -> f64 {
        match self {
            Adjustment::Replace(v) => *v,
            Adjustment::Multiply(factor) => base.map_or(*factor, |b| b * factor),
            Adjustment::Offset(delta) => base.unwrap_or(0.0) + delta,
        }
    }
}

/// One overlay key, with its suffix already parsed off.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayEntry<T> {
    pub key: String,
    pub adjustment: Adjustment<T>,
}

impl<T> OverlayEntry<T> {
    fn parse(key: &str, value: T, as_number: impl Fn(&T) -> Option<f64>) -> Result<Self, String> {
        let (base_key, suffix) = if let Some(base) = key.strip_suffix(MULTIPLIER_SUFFIX) {
            (base, Some(MULTIPLIER_SUFFIX))
        } else if let Some(base) = key.strip_suffix(OFFSET_SUFFIX) {
            (base, Some(OFFSET_SUFFIX))
        } else {
            (key, None)
        };

        let adjustment = match suffix {
            Some(suffix) => {
                let n = as_number(&value)
                    .ok_or_else(|| format!("'{}' needs a numeric value", key))?;
                if suffix == MULTIPLIER_SUFFIX {
                    Adjustment::Multiply(n)
                } else {
                    Adjustment::Offset(n)
                }
            }
            None => Adjustment::Replace(value),
        };

        Ok(Self {
            key: base_key.to_string(),
            adjustment,
        })
    }
}

/// Keys of one overlay section, values not yet checked for type.
type RawSection = IndexMap<String, Option<OverlayValue>>;

#[derive(Debug, Deserialize)]
struct RawOverlay {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    aspects: IndexMap<String, RawSection>,
    #[serde(default)]
    scoring_params: IndexMap<String, RawSection>,
    #[serde(default)]
    interaction_adjustments: RawSection,
    #[serde(default)]
    projection_config: Option<ProjectionConfig>,
}

/// A named style profile, parsed and ready to merge over a base config.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleOverlay {
    pub name: String,
    pub description: Option<String>,
    aspects: IndexMap<String, Vec<OverlayEntry<Option<OverlayValue>>>>,
    scoring_params: IndexMap<String, RawSection>,
    interaction_adjustments: Vec<OverlayEntry<f64>>,
    projection_config: Option<ProjectionConfig>,
}

fn is_metadata(key: &str) -> bool {
    METADATA_KEYS.contains(&key)
}

/// Numeric entries of a section, metadata keys dropped. Any other
/// non-number is an error.
fn numeric_entries(section: &str, map: &RawSection) -> Result<Vec<OverlayEntry<f64>>, String> {
    map.iter()
        .filter(|(key, _)| !is_metadata(key))
        .map(|(key, value)| match value {
            Some(OverlayValue::Number(n)) => OverlayEntry::parse(key, *n, |v| Some(*v))
                .map_err(|e| format!("{}.{}: {}", section, key, e)),
            _ => Err(format!("{}.{}: '{}' needs a numeric value", section, key, key)),
        })
        .collect()
}

impl StyleOverlay {
    /// Parse overlay YAML read from `path` for profile `profile`.
    pub fn parse(profile: &str, path: &Path, yaml: &str) -> Result<Self, ConfigError> {
        let raw: RawOverlay = serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let invalid = |message: String| ConfigError::Overlay {
            profile: profile.to_string(),
            message,
        };

        let mut aspects = IndexMap::new();
        for (aspect, keys) in raw.aspects {
            if is_metadata(&aspect) {
                continue;
            }
            let entries = keys
                .into_iter()
                .filter(|(key, _)| !is_metadata(key))
                .map(|(key, value)| {
                    OverlayEntry::parse(&key, value, |v| match v {
                        Some(OverlayValue::Number(n)) => Some(*n),
                        _ => None,
                    })
                    .map_err(|e| format!("aspects.{}.{}: {}", aspect, key, e))
                })
                .collect::<Result<Vec<_>, _>>()
                .map_err(invalid)?;
            aspects.insert(aspect, entries);
        }

        // Checked at merge time, once unknown aspects are known
        let scoring_params = raw
            .scoring_params
            .into_iter()
            .filter(|(aspect, _)| !is_metadata(aspect))
            .collect();

        let interaction_adjustments =
            numeric_entries("interaction_adjustments", &raw.interaction_adjustments)
                .map_err(invalid)?;

        Ok(Self {
            name: raw.name.unwrap_or_else(|| profile.to_string()),
            description: raw.description,
            aspects,
            scoring_params,
            interaction_adjustments,
            projection_config: raw.projection_config,
        })
    }

    /// Merge this overlay into a copy of `base`; `base` is left untouched.
    pub fn apply(&self, base: &ModelConfig) -> Result<ModelConfig, ConfigError> {
        let mut merged = base.clone();

        for (aspect, entries) in &self.aspects {
            let Some(config) = merged.aspects.get_mut(aspect) else {
                warn!(
                    profile = %self.name,
                    aspect = %aspect,
                    "Ignoring overlay for unknown aspect"
                );
                continue;
            };
            for entry in entries {
                apply_aspect_entry(config, entry).map_err(|message| ConfigError::Overlay {
                    profile: self.name.clone(),
                    message: format!("aspects.{}.{}: {}", aspect, entry.key, message),
                })?;
            }
        }

        for (aspect, section) in &self.scoring_params {
            let Some(params) = merged.scoring_params.get_mut(aspect) else {
                warn!(
                    profile = %self.name,
                    aspect = %aspect,
                    "Ignoring scoring params for unknown aspect"
                );
                continue;
            };
            let entries = numeric_entries(&format!("scoring_params.{}", aspect), section)
                .map_err(|message| ConfigError::Overlay {
                    profile: self.name.clone(),
                    message,
                })?;
            apply_numeric(params, &entries);
        }

        apply_numeric(&mut merged.interaction_adjustments, &self.interaction_adjustments);

        if let Some(projection) = &self.projection_config {
            merged.projection_config = projection.clone();
        }

        Ok(merged)
    }
}

fn apply_numeric(params: &mut ParamMap, entries: &[OverlayEntry<f64>]) {
    for entry in entries {
        let value = entry.adjustment.apply(params.get(&entry.key).copied());
        params.insert(entry.key.clone(), value);
    }
}

fn apply_aspect_entry(
    config: &mut AspectConfig,
    entry: &OverlayEntry<Option<OverlayValue>>,
) -> Result<(), String> {
    use OverlayValue::{Bool, Number, Text};

    match (entry.key.as_str(), &entry.adjustment) {
        ("weight", Adjustment::Replace(Some(Number(v)))) => config.weight = *v,
        ("weight", Adjustment::Multiply(factor)) => config.weight *= factor,
        ("weight", Adjustment::Offset(delta)) => config.weight += delta,
        ("scorer", Adjustment::Replace(Some(Text(id)))) => config.scorer = id.clone(),
        ("body_field", Adjustment::Replace(Some(Text(field)))) => {
            config.body_field = Some(field.clone())
        }
        ("body_field", Adjustment::Replace(None)) => config.body_field = None,
        ("shirt_field", Adjustment::Replace(Some(Text(field)))) => {
            config.shirt_field = field.clone()
        }
        ("needs_chest", Adjustment::Replace(Some(Bool(flag)))) => config.needs_chest = *flag,
        ("weight" | "scorer" | "body_field" | "shirt_field" | "needs_chest", _) => {
            return Err("unsupported value for this key".to_string());
        }
        (other, _) => warn!(key = %other, "Ignoring unknown aspect key in overlay"),
    }
    Ok(())
}
