use super::config::ProjectionConfig;
use crate::data::BodyProfile;

/// Project a body forward by the configured increments.
///
/// Returns a new profile; fields the input lacks are never synthesized and
/// zero increments are skipped.
pub fn project(body: &BodyProfile, config: &ProjectionConfig) -> BodyProfile {
    let mut projected = body.clone();
    for (field, increment) in &config.increments {
        if *increment == 0.0 {
            continue;
        }
        if let Some(value) = body.raw(field) {
            projected.insert(field.as_str(), value + increment);
        }
    }
    projected
}

/// Scale a confidence for a projected body, rounded half to even.
pub fn scale_confidence(confidence: u32, factor: f64) -> u32 {
    (confidence as f64 * factor).round_ties_even().clamp(0.0, 100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ModelConfig;

    fn config() -> ProjectionConfig {
        ModelConfig::default().projection_config
    }

    fn body() -> BodyProfile {
        [("ChestWidth", 20.0), ("ShoulderWidth", 18.0), ("TorsoLength", 28.0)]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_project_applies_increments() {
        let projected = project(&body(), &config());
        assert_eq!(projected.get("ChestWidth"), Some(21.0));
        assert_eq!(projected.get("ShoulderWidth"), Some(18.5));
        assert_eq!(projected.get("TorsoLength"), Some(28.0));
    }

    #[test]
    fn test_project_does_not_synthesize_fields() {
        let projected = project(&body(), &config());
        assert_eq!(projected.get("HemWidth"), None);
        assert_eq!(projected.get("SleeveLength"), None);
        assert_eq!(projected.len(), 3);
    }

    #[test]
    fn test_project_leaves_input_untouched() {
        let original = body();
        let copy = original.clone();
        let _ = project(&original, &config());
        assert_eq!(original, copy);
    }

    #[test]
    fn test_nan_stays_unknown() {
        let body: BodyProfile = [("ChestWidth", f64::NAN)].into_iter().collect();
        let projected = project(&body, &config());
        assert_eq!(projected.get("ChestWidth"), None);
    }

    #[test]
    fn test_empty_increments_is_identity() {
        assert_eq!(project(&body(), &ProjectionConfig::default()), body());
    }

    #[test]
    fn test_scale_confidence() {
        assert_eq!(scale_confidence(100, 0.85), 85);
        assert_eq!(scale_confidence(50, 0.85), 42); // 42.5 rounds to even
        assert_eq!(scale_confidence(67, 0.85), 57);
        assert_eq!(scale_confidence(0, 0.85), 0);
    }

    #[test]
    fn test_scaled_confidence_never_exceeds_raw() {
        for confidence in 0..=100 {
            assert!(scale_confidence(confidence, 0.85) <= confidence);
        }
    }
}
