use anyhow::{bail, Result};

use super::config::ParamMap;

/// Reads named parameters out of a config section, remembering every key
/// that is missing so all of them can be reported at once.
pub(crate) struct ParamReader<'a> {
    section: String,
    map: Option<&'a ParamMap>,
    missing: Vec<String>,
}

impl<'a> ParamReader<'a> {
    pub(crate) fn new(section: impl Into<String>, map: Option<&'a ParamMap>) -> Self {
        Self {
            section: section.into(),
            map,
            missing: Vec::new(),
        }
    }

    pub(crate) fn get(&mut self, key: &str) -> f64 {
        match self.map.and_then(|m| m.get(key)) {
            Some(value) => *value,
            None => {
                self.missing.push(format!("{}.{}: missing", self.section, key));
                0.0
            }
        }
    }

    pub(crate) fn finish<T>(self, value: T) -> Result<T, Vec<String>> {
        if self.missing.is_empty() {
            Ok(value)
        } else {
            Err(self.missing)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerKind {
    Chest,
    Shoulder,
    Length,
    Hem,
    Sleeve,
    Weight,
}

impl ScorerKind {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim() {
            "score_chest" => Ok(ScorerKind::Chest),
            "score_shoulder" => Ok(ScorerKind::Shoulder),
            "score_length" => Ok(ScorerKind::Length),
            "score_hem" => Ok(ScorerKind::Hem),
            "score_sleeve" => Ok(ScorerKind::Sleeve),
            "score_weight" => Ok(ScorerKind::Weight),
            other => bail!("unknown scorer '{}'", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChestParams {
    pub too_tight_penalty: f64,
    pub slim_penalty: f64,
    pub relaxed_max: f64,
    pub oversized_max: f64,
    pub comically_oversized_max: f64,
    pub very_oversized_penalty: f64,
    pub comically_oversized_penalty: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShoulderParams {
    pub too_narrow_penalty: f64,
    pub drop_max: f64,
    pub very_oversized_penalty: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LengthParams {
    pub cropped_min: f64,
    pub short_max: f64,
    pub ideal_max: f64,
    pub long_max: f64,
    pub very_long_score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HemParams {
    pub too_tight_penalty: f64,
    pub flared_min: f64,
    pub box_cut_max: f64,
    pub tapered_score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SleeveParams {
    pub cap_min: f64,
    pub short_max: f64,
    pub ideal_max: f64,
    pub cap_score: f64,
    pub short_score: f64,
    pub ideal_score: f64,
    pub elbow_score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightParams {
    pub light_max: f64,
    pub mid_max: f64,
    pub heavy_max: f64,
    pub light_score: f64,
    pub mid_score: f64,
    pub heavy_score: f64,
    pub very_heavy_score: f64,
}

/// A scorer bound to its aspect's parameters, resolved once per config.
#[derive(Debug, Clone, PartialEq)]
pub enum Scorer {
    Chest(ChestParams),
    Shoulder(ShoulderParams),
    Length(LengthParams),
    Hem(HemParams),
    Sleeve(SleeveParams),
    Weight(WeightParams),
}

impl Scorer {
    /// Bind `kind` to the parameters found under `scoring_params.<aspect>`.
    pub fn resolve(
        aspect: &str,
        kind: ScorerKind,
        params: Option<&ParamMap>,
    ) -> Result<Self, Vec<String>> {
        let mut p = ParamReader::new(format!("scoring_params.{}", aspect), params);
        match kind {
            ScorerKind::Chest => {
                let params = ChestParams {
                    too_tight_penalty: p.get("too_tight_penalty"),
                    slim_penalty: p.get("slim_penalty"),
                    relaxed_max: p.get("relaxed_max"),
                    oversized_max: p.get("oversized_max"),
                    comically_oversized_max: p.get("comically_oversized_max"),
                    very_oversized_penalty: p.get("very_oversized_penalty"),
                    comically_oversized_penalty: p.get("comically_oversized_penalty"),
                };
                p.finish(Scorer::Chest(params))
            }
            ScorerKind::Shoulder => {
                let params = ShoulderParams {
                    too_narrow_penalty: p.get("too_narrow_penalty"),
                    drop_max: p.get("drop_max"),
                    very_oversized_penalty: p.get("very_oversized_penalty"),
                };
                p.finish(Scorer::Shoulder(params))
            }
            ScorerKind::Length => {
                let params = LengthParams {
                    cropped_min: p.get("cropped_min"),
                    short_max: p.get("short_max"),
                    ideal_max: p.get("ideal_max"),
                    long_max: p.get("long_max"),
                    very_long_score: p.get("very_long_score"),
                };
                p.finish(Scorer::Length(params))
            }
            ScorerKind::Hem => {
                let params = HemParams {
                    too_tight_penalty: p.get("too_tight_penalty"),
                    flared_min: p.get("flared_min"),
                    box_cut_max: p.get("box_cut_max"),
                    tapered_score: p.get("tapered_score"),
                };
                p.finish(Scorer::Hem(params))
            }
            ScorerKind::Sleeve => {
                let params = SleeveParams {
                    cap_min: p.get("cap_min"),
                    short_max: p.get("short_max"),
                    ideal_max: p.get("ideal_max"),
                    cap_score: p.get("cap_score"),
                    short_score: p.get("short_score"),
                    ideal_score: p.get("ideal_score"),
                    elbow_score: p.get("elbow_score"),
                };
                p.finish(Scorer::Sleeve(params))
            }
            ScorerKind::Weight => {
                let params = WeightParams {
                    light_max: p.get("light_max"),
                    mid_max: p.get("mid_max"),
                    heavy_max: p.get("heavy_max"),
                    light_score: p.get("light_score"),
                    mid_score: p.get("mid_score"),
                    heavy_score: p.get("heavy_score"),
                    very_heavy_score: p.get("very_heavy_score"),
                };
                p.finish(Scorer::Weight(params))
            }
        }
    }

    pub fn kind(&self) -> ScorerKind {
        match self {
            Scorer::Chest(_) => ScorerKind::Chest,
            Scorer::Shoulder(_) => ScorerKind::Shoulder,
            Scorer::Length(_) => ScorerKind::Length,
            Scorer::Hem(_) => ScorerKind::Hem,
            Scorer::Sleeve(_) => ScorerKind::Sleeve,
            Scorer::Weight(_) => ScorerKind::Weight,
        }
    }
}

/// Bonus and penalty magnitudes for the interaction pass.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionParams {
    pub oversized_heavy_bonus: f64,
    pub oversized_light_penalty: f64,
    pub relaxed_heavy_bonus: f64,
    pub slim_light_penalty: f64,
}

impl InteractionParams {
    pub fn resolve(map: &ParamMap) -> Result<Self, Vec<String>> {
        let mut p = ParamReader::new("interaction_adjustments", Some(map));
        let params = InteractionParams {
            oversized_heavy_bonus: p.get("oversized_heavy_bonus"),
            oversized_light_penalty: p.get("oversized_light_penalty"),
            relaxed_heavy_bonus: p.get("relaxed_heavy_bonus"),
            slim_light_penalty: p.get("slim_light_penalty"),
        };
        p.finish(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ModelConfig;

    #[test]
    fn test_parse_scorer_ids() {
        assert_eq!(ScorerKind::parse("score_chest").unwrap(), ScorerKind::Chest);
        assert_eq!(ScorerKind::parse(" score_weight ").unwrap(), ScorerKind::Weight);
        assert!(ScorerKind::parse("score_fabric_stretch").is_err());
    }

    #[test]
    fn test_resolve_chest_from_default_config() {
        let config = ModelConfig::default();
        let params = config.scoring_params.get("chest");
        let scorer = Scorer::resolve("chest", ScorerKind::Chest, params).unwrap();
        match scorer {
            Scorer::Chest(p) => {
                assert_eq!(p.relaxed_max, 2.0);
                assert_eq!(p.comically_oversized_penalty, 8.0);
            }
            other => panic!("expected chest scorer, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_reports_every_missing_param() {
        let mut map = ParamMap::new();
        map.insert("drop_max".to_string(), 2.0);
        let errors = Scorer::resolve("shoulder", ScorerKind::Shoulder, Some(&map)).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("scoring_params.shoulder.too_narrow_penalty"));
        assert!(errors[1].contains("very_oversized_penalty"));
    }

    #[test]
    fn test_resolve_without_section() {
        let errors = Scorer::resolve("hem", ScorerKind::Hem, None).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_interaction_params() {
        let config = ModelConfig::default();
        let params = InteractionParams::resolve(&config.interaction_adjustments).unwrap();
        assert_eq!(params.oversized_heavy_bonus, 7.0);
        assert_eq!(params.slim_light_penalty, 4.0);

        let errors = InteractionParams::resolve(&ParamMap::new()).unwrap_err();
        assert_eq!(errors.len(), 4);
    }
}
