use serde::Serialize;
use tracing::debug;

use super::aspects::{AspectInputs, AspectScore, FitTag};
use super::config::{ModelConfig, ProjectionConfig};
use super::interaction;
use super::params::{InteractionParams, Scorer, ScorerKind};
use super::validation::validate_model;
use crate::config::ConfigError;
use crate::data::{BodyProfile, GarmentProfile, WEIGHT_FIELD};

const DEFAULT_CHEST_FIELD: &str = "ChestWidth";

/// Aspects with data needed before tags are reported and the interaction
/// pass runs.
const MIN_PRESENT_ASPECTS: usize = 2;

pub const NO_MEASUREMENTS_RATIONALE: &str = "No measurements available for this shirt.";

/// An aspect with its scorer bound to typed parameters.
#[derive(Debug, Clone)]
pub struct ResolvedAspect {
    pub name: String,
    pub weight: f64,
    pub scorer: Scorer,
    pub body_field: Option<String>,
    pub shirt_field: String,
    pub needs_chest: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AspectContribution {
    pub aspect: String,
    pub weight: f64,
    #[serde(flatten)]
    pub result: AspectScore,
}

#[derive(Debug, Clone, Serialize)]
pub struct FitResult {
    /// `None` when no aspect had data
    pub fit_score: Option<f64>,
    pub confidence: u32,
    pub tags: Vec<FitTag>,
    pub rationale: String,
    pub aspects: Vec<AspectContribution>,
}

impl FitResult {
    pub fn tags_joined(&self) -> String {
        self.tags.iter().map(FitTag::as_str).collect::<Vec<_>>().join("; ")
    }
}

/// A configuration resolved for scoring. Built once, read-only afterwards,
/// so several models (base and style) can be used side by side.
#[derive(Debug, Clone)]
pub struct FitModel {
    aspects: Vec<ResolvedAspect>,
    interactions: InteractionParams,
    projection: ProjectionConfig,
    chest_field: String,
    weight_field: String,
}

impl FitModel {
    pub fn from_config(config: &ModelConfig) -> Result<Self, ConfigError> {
        validate_model(config).map_err(ConfigError::Invalid)?;

        let mut aspects = Vec::with_capacity(config.aspects.len());
        for (name, aspect) in &config.aspects {
            let scorer = ScorerKind::parse(&aspect.scorer)
                .map_err(|e| ConfigError::Invalid(vec![format!("aspects.{}.scorer: {}", name, e)]))
                .and_then(|kind| {
                    Scorer::resolve(name, kind, config.scoring_params.get(name))
                        .map_err(ConfigError::Invalid)
                })?;
            aspects.push(ResolvedAspect {
                name: name.clone(),
                weight: aspect.weight,
                scorer,
                body_field: aspect.body_field.clone(),
                shirt_field: aspect.shirt_field.clone(),
                needs_chest: aspect.needs_chest,
            });
        }
        let interactions = InteractionParams::resolve(&config.interaction_adjustments)
            .map_err(ConfigError::Invalid)?;

        let field_of = |kind: ScorerKind| {
            aspects
                .iter()
                .find(|a| a.scorer.kind() == kind)
                .map(|a| a.shirt_field.clone())
        };
        let chest_field =
            field_of(ScorerKind::Chest).unwrap_or_else(|| DEFAULT_CHEST_FIELD.to_string());
        let weight_field = field_of(ScorerKind::Weight).unwrap_or_else(|| WEIGHT_FIELD.to_string());

        Ok(Self {
            aspects,
            interactions,
            projection: config.projection_config.clone(),
            chest_field,
            weight_field,
        })
    }

    pub fn aspects(&self) -> &[ResolvedAspect] {
        &self.aspects
    }

    pub fn projection(&self) -> &ProjectionConfig {
        &self.projection
    }

    /// Score one garment against one body.
    pub fn score(&self, body: &BodyProfile, garment: &GarmentProfile) -> FitResult {
        debug!(shirt = %garment.name, "Scoring fit");
        let shirt_chest = garment.get(&self.chest_field);

        let mut contributions = Vec::with_capacity(self.aspects.len());
        let mut present = 0usize;
        for aspect in &self.aspects {
            let inputs = AspectInputs {
                body: aspect.body_field.as_deref().and_then(|f| body.get(f)),
                shirt: garment.get(&aspect.shirt_field),
                shirt_chest: if aspect.needs_chest { shirt_chest } else { None },
                others_present: present > 0,
            };
            let result = aspect.scorer.evaluate(&inputs).unwrap_or_else(|| {
                debug!(
                    shirt = %garment.name,
                    aspect = %aspect.name,
                    "Missing data, using neutral score"
                );
                AspectScore::missing(&aspect.name)
            });
            if result.present {
                present += 1;
            }
            contributions.push(AspectContribution {
                aspect: aspect.name.clone(),
                weight: aspect.weight,
                result,
            });
        }

        if present == 0 {
            return FitResult {
                fit_score: None,
                confidence: 0,
                tags: Vec::new(),
                rationale: NO_MEASUREMENTS_RATIONALE.to_string(),
                aspects: contributions,
            };
        }

        let total_weight: f64 = contributions.iter().map(|c| c.weight).sum();
        let weighted: f64 = contributions.iter().map(|c| c.weight * c.result.score).sum();
        let mut fit_score = (weighted / total_weight).round_ties_even();

        let mut tags: Vec<FitTag> = Vec::new();
        for tag in contributions.iter().filter_map(|c| c.result.tag) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        if present >= MIN_PRESENT_ASPECTS {
            let shirt_weight = garment.get(&self.weight_field);
            fit_score = interaction::adjust(&tags, shirt_weight, fit_score, &self.interactions);
        } else {
            tags.clear();
        }

        let confidence = confidence(present, self.aspects.len());
        let rationale = contributions
            .iter()
            .map(|c| c.result.rationale.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        FitResult {
            fit_score: Some(fit_score),
            confidence,
            tags,
            rationale,
            aspects: contributions,
        }
    }
}

/// Share of active aspects with data, as a rounded percentage.
pub fn confidence(present: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * present as f64 / total as f64).round_ties_even() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> FitModel {
        FitModel::from_config(&ModelConfig::default()).unwrap()
    }

    fn body() -> BodyProfile {
        [
            ("ChestWidth", 20.0),
            ("ShoulderWidth", 18.0),
            ("TorsoLength", 28.0),
            ("HemWidth", 20.0),
            ("SleeveLength", 8.0),
        ]
        .into_iter()
        .collect()
    }

    fn shirt(chest: f64) -> GarmentProfile {
        GarmentProfile::new("Test")
            .with("ChestWidth", chest)
            .with("ShoulderWidth", 18.5)
            .with("BodyLength", 28.5)
            .with("HemWidth", 20.5)
            .with("SleeveLength", 9.0)
            .with("Weight", 5.5)
    }

    #[test]
    fn test_comically_oversized_lightweight() {
        let body: BodyProfile = [
            ("ChestWidth", 19.0),
            ("ShoulderWidth", 17.0),
            ("TorsoLength", 15.0),
        ]
        .into_iter()
        .collect();
        let garment = GarmentProfile::new("Tent")
            .with("ChestWidth", 29.0)
            .with("ShoulderWidth", 25.0)
            .with("TorsoLength", 22.0)
            .with("Weight", 3.8);

        let result = model().score(&body, &garment);
        assert!(result.tags.contains(&FitTag::ComicallyOversized));
        let score = result.fit_score.unwrap();
        assert!(score < 65.0, "score was {}", score);
        assert_eq!(score, 40.0);
    }

    #[test]
    fn test_empty_garment_gives_sentinel() {
        let result = model().score(&body(), &GarmentProfile::new("Blank"));
        assert_eq!(result.fit_score, None);
        assert_eq!(result.confidence, 0);
        assert!(result.tags.is_empty());
        assert_eq!(result.rationale, NO_MEASUREMENTS_RATIONALE);
    }

    #[test]
    fn test_nan_fields_count_as_missing() {
        let garment = GarmentProfile::new("NaN")
            .with("ChestWidth", f64::NAN)
            .with("Weight", f64::NAN);
        let result = model().score(&body(), &garment);
        assert_eq!(result.fit_score, None);
    }

    #[test]
    fn test_boxy_beats_tight() {
        let boxy = model().score(&body(), &shirt(23.0));
        let tight = model().score(&body(), &shirt(18.0));
        assert!(boxy.fit_score.unwrap() > tight.fit_score.unwrap());
        assert!(tight.tags.contains(&FitTag::TooTight));
    }

    #[test]
    fn test_score_matches_weighted_mean_before_adjustment() {
        let m = model();
        let result = m.score(&body(), &shirt(20.0));
        let total: f64 = result.aspects.iter().map(|a| a.weight).sum();
        let weighted: f64 = result.aspects.iter().map(|a| a.weight * a.result.score).sum();
        // Nothing here triggers an interaction rule
        assert_eq!(result.fit_score.unwrap(), (weighted / total).round_ties_even());
        assert_eq!(result.confidence, 100);
    }

    #[test]
    fn test_rationale_joined_in_aspect_order() {
        let garment = GarmentProfile::new("Chest only")
            .with("ChestWidth", 21.0)
            .with("Weight", 5.5);
        let result = model().score(&body(), &garment);
        assert_eq!(
            result.rationale,
            "Chest: +1.0\" vs body (relaxed). [No shoulder data] [No length data] [No hem data] \
             [No sleeve data] Weight: 5.5 oz (ideal is 5–6 oz for vintage)."
        );
    }

    #[test]
    fn test_single_aspect_suppresses_tags() {
        let garment = GarmentProfile::new("Chest only").with("ChestWidth", 21.0);
        let result = model().score(&body(), &garment);
        assert!(result.tags.is_empty());
        assert_eq!(result.confidence, 17); // 1 of 6
        // (100*.2 + 50*.8) / 1.0
        assert_eq!(result.fit_score, Some(60.0));
    }

    #[test]
    fn test_confidence_monotonic() {
        let m = model();
        let one = m.score(&body(), &GarmentProfile::new("a").with("ChestWidth", 21.0));
        let two = GarmentProfile::new("b")
            .with("ChestWidth", 21.0)
            .with("ShoulderWidth", 18.0);
        let two = m.score(&body(), &two);
        let all = m.score(&body(), &shirt(21.0));
        assert!(one.confidence <= two.confidence);
        assert!(two.confidence <= all.confidence);
    }

    #[test]
    fn test_cropped_counts_as_present() {
        let garment = GarmentProfile::new("Crop").with("BodyLength", 24.0).with("ChestWidth", 20.0);
        let result = model().score(&body(), &garment);
        let length = &result.aspects[2];
        assert_eq!(length.result.tag, Some(FitTag::Cropped));
        assert_eq!(length.result.score, 50.0);
        assert!(length.result.present);
        assert!(result.tags.contains(&FitTag::Cropped));
    }

    #[test]
    fn test_tags_deduplicated() {
        // Boxy from the length ratio and the hem ratio
        let garment = GarmentProfile::new("Box")
            .with("ChestWidth", 22.0)
            .with("BodyLength", 24.0)
            .with("HemWidth", 24.0);
        let body: BodyProfile = [("ChestWidth", 20.0)].into_iter().collect();
        let result = model().score(&body, &garment);
        let boxy = result.tags.iter().filter(|t| **t == FitTag::BoxyCut).count();
        assert_eq!(boxy, 1);
    }

    #[test]
    fn test_weight_only_garment_uses_sole_light_score() {
        let garment = GarmentProfile::new("Weight only").with("Weight", 3.8);
        let result = model().score(&body(), &garment);
        let weight = &result.aspects[5];
        assert_eq!(weight.aspect, "weight");
        assert_eq!(weight.result.score, 42.0);
        // (50*.85 + 42*.15) / 1.0
        assert_eq!(result.fit_score, Some(49.0));
        assert_eq!(result.confidence, 17);
        assert!(result.tags.is_empty());
    }

    #[test]
    fn test_cropped_length_keeps_regular_light_score() {
        let garment = GarmentProfile::new("Crop light")
            .with("BodyLength", 24.0)
            .with("Weight", 3.8);
        let result = model().score(&body(), &garment);
        assert_eq!(result.aspects[2].result.tag, Some(FitTag::Cropped));
        assert_eq!(result.aspects[5].result.score, 55.0);
        // (50*.85 + 55*.15) / 1.0
        assert_eq!(result.fit_score, Some(51.0));
        assert_eq!(result.confidence, 33);
        assert_eq!(result.tags, vec![FitTag::Cropped, FitTag::Lightweight]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ModelConfig::default();
        for aspect in config.aspects.values_mut() {
            aspect.weight = 0.0;
        }
        assert!(matches!(FitModel::from_config(&config), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_confidence_rounding() {
        assert_eq!(confidence(0, 6), 0);
        assert_eq!(confidence(1, 6), 17);
        assert_eq!(confidence(3, 6), 50);
        assert_eq!(confidence(6, 6), 100);
        assert_eq!(confidence(0, 0), 0);
    }
}
