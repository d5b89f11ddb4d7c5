use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Per-aspect numeric parameters, keyed by parameter name.
pub type ParamMap = IndexMap<String, f64>;

/// Main fit model configuration.
///
/// The keys of `aspects` are the active aspect list; file order is scoring
/// order, which keeps rationale concatenation deterministic.
///
/// Example YAML:
/// ```yaml
/// aspects:
///   chest:
///     weight: 0.20
///     scorer: score_chest
///     body_field: ChestWidth
///     shirt_field: ChestWidth
///     needs_chest: false
/// scoring_params:
///   chest:
///     relaxed_max: 2.0
/// interaction_adjustments:
///   relaxed_heavy_bonus: 3
/// projection_config:
///   increments:
///     ChestWidth: 1.0
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    pub aspects: IndexMap<String, AspectConfig>,

    #[serde(default)]
    pub scoring_params: IndexMap<String, ParamMap>,

    #[serde(default)]
    pub interaction_adjustments: ParamMap,

    #[serde(default)]
    pub projection_config: ProjectionConfig,
}

/// One scored dimension of fit.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AspectConfig {
    /// Relative weight in the overall score (non-negative)
    pub weight: f64,

    /// Scorer id, e.g. "score_chest"
    pub scorer: String,

    /// Body measurement read by the scorer; `null` for garment-only aspects
    #[serde(default)]
    pub body_field: Option<String>,

    /// Garment measurement read by the scorer
    pub shirt_field: String,

    /// Whether the scorer also receives the garment's chest width
    #[serde(default)]
    pub needs_chest: bool,
}

/// Bulk projection settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectionConfig {
    /// Inches added to each named body measurement
    #[serde(default)]
    pub increments: ParamMap,

    /// Scale applied to the confidence of projected-body results
    #[serde(default = "default_confidence_mod")]
    pub confidence_mod: f64,
}

fn default_confidence_mod() -> f64 {
    0.85
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            increments: IndexMap::new(),
            confidence_mod: default_confidence_mod(),
        }
    }
}

fn aspect(
    weight: f64,
    scorer: &str,
    body: Option<&str>,
    shirt: &str,
    needs_chest: bool,
) -> AspectConfig {
    AspectConfig {
        weight,
        scorer: scorer.to_string(),
        body_field: body.map(str::to_string),
        shirt_field: shirt.to_string(),
        needs_chest,
    }
}

fn params(pairs: &[(&str, f64)]) -> ParamMap {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

impl Default for ModelConfig {
    fn default() -> Self {
        let mut aspects = IndexMap::new();
        let defaults = [
            ("chest", 0.20, "score_chest", Some("ChestWidth"), "ChestWidth", false),
            ("shoulder", 0.20, "score_shoulder", Some("ShoulderWidth"), "ShoulderWidth", false),
            ("length", 0.15, "score_length", Some("TorsoLength"), "BodyLength", true),
            ("hem", 0.15, "score_hem", Some("HemWidth"), "HemWidth", true),
            ("sleeve", 0.15, "score_sleeve", Some("SleeveLength"), "SleeveLength", true),
            ("weight", 0.15, "score_weight", None, "Weight", false),
        ];
        for (name, weight, scorer, body, shirt, needs_chest) in defaults {
            aspects.insert(name.to_string(), aspect(weight, scorer, body, shirt, needs_chest));
        }

        let mut scoring_params = IndexMap::new();
        scoring_params.insert(
            "chest".to_string(),
            params(&[
                ("too_tight_penalty", 35.0),
                ("slim_penalty", 20.0),
                ("relaxed_max", 2.0),
                ("oversized_max", 4.0),
                ("comically_oversized_max", 6.0),
                ("very_oversized_penalty", 10.0),
                ("comically_oversized_penalty", 8.0),
            ]),
        );
        scoring_params.insert(
            "shoulder".to_string(),
            params(&[
                ("too_narrow_penalty", 45.0),
                ("drop_max", 2.0),
                ("very_oversized_penalty", 10.0),
            ]),
        );
        scoring_params.insert(
            "length".to_string(),
            params(&[
                ("cropped_min", -2.0),
                ("short_max", -0.5),
                ("ideal_max", 1.0),
                ("long_max", 3.0),
                ("very_long_score", 75.0),
            ]),
        );
        scoring_params.insert(
            "hem".to_string(),
            params(&[
                ("too_tight_penalty", 60.0),
                ("flared_min", 2.0),
                ("box_cut_max", 1.0),
                ("tapered_score", 70.0),
            ]),
        );
        scoring_params.insert(
            "sleeve".to_string(),
            params(&[
                ("cap_min", -2.0),
                ("short_max", 0.0),
                ("ideal_max", 2.0),
                ("cap_score", 60.0),
                ("short_score", 80.0),
                ("ideal_score", 100.0),
                ("elbow_score", 85.0),
            ]),
        );
        scoring_params.insert(
            "weight".to_string(),
            params(&[
                ("light_max", 4.2),
                ("mid_max", 5.0),
                ("heavy_max", 6.5),
                ("light_score", 55.0),
                ("mid_score", 85.0),
                ("heavy_score", 100.0),
                ("very_heavy_score", 90.0),
            ]),
        );

        Self {
            aspects,
            scoring_params,
            interaction_adjustments: params(&[
                ("oversized_heavy_bonus", 7.0),
                ("oversized_light_penalty", 6.0),
                ("relaxed_heavy_bonus", 3.0),
                ("slim_light_penalty", 4.0),
            ]),
            projection_config: ProjectionConfig {
                increments: params(&[
                    ("ChestWidth", 1.0),
                    ("ShoulderWidth", 0.5),
                    ("SleeveLength", 0.5),
                    ("TorsoLength", 0.0),
                    ("HemWidth", 0.5),
                ]),
                confidence_mod: 0.85,
            },
        }
    }
}
