use super::config::ModelConfig;
use super::params::{InteractionParams, Scorer, ScorerKind};

/// Validate a fit model configuration before it is resolved.
/// Returns all validation errors at once (not just the first).
pub fn validate_model(config: &ModelConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.aspects.is_empty() {
        errors.push("aspects: at least one aspect is required".to_string());
    }

    let mut weight_sum = 0.0;
    for (name, aspect) in &config.aspects {
        if !aspect.weight.is_finite() || aspect.weight < 0.0 {
            errors.push(format!(
                "aspects.{}.weight: must be a non-negative number, got {}",
                name, aspect.weight
            ));
        } else {
            weight_sum += aspect.weight;
        }

        if aspect.shirt_field.trim().is_empty() {
            errors.push(format!("aspects.{}.shirt_field: must not be empty", name));
        }

        match ScorerKind::parse(&aspect.scorer) {
            Ok(kind) => {
                if let Err(missing) = Scorer::resolve(name, kind, config.scoring_params.get(name)) {
                    errors.extend(missing);
                }
            }
            Err(e) => errors.push(format!("aspects.{}.scorer: {}", name, e)),
        }
    }

    if !config.aspects.is_empty() && weight_sum <= 0.0 {
        errors.push("aspects: sum of aspect weights must be greater than zero".to_string());
    }

    if let Err(missing) = InteractionParams::resolve(&config.interaction_adjustments) {
        errors.extend(missing);
    }

    let confidence_mod = config.projection_config.confidence_mod;
    if !(0.0..=1.0).contains(&confidence_mod) {
        errors.push(format!(
            "projection_config.confidence_mod: must be between 0 and 1, got {}",
            confidence_mod
        ));
    }

    for (field, increment) in &config.projection_config.increments {
        if !increment.is_finite() {
            errors.push(format!("projection_config.increments.{}: must be finite", field));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
