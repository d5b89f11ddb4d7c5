use tracing::info;

use super::aspects::FitTag;
use super::params::InteractionParams;

/// Fixed penalty for a comically oversized shirt in light fabric.
const COMICAL_LIGHT_PENALTY: f64 = 10.0;
const COMICAL_CAP: f64 = 70.0;
const VERY_OVERSIZED_CAP: f64 = 85.0;

const COMICAL_LIGHT_MAX: f64 = 5.0;
const HEAVY_MIN: f64 = 6.0;
const RELAXED_HEAVY_MIN: f64 = 6.5;
const LIGHT_MAX: f64 = 4.5;

/// Nudge an aggregate score for combinations of cut and fabric weight.
///
/// Rules run in order, each on the previous rule's output. The first two
/// are exclusive; the rest always run. Scores stay within 0..=100, and
/// the oversized tags cap the final result.
pub fn adjust(
    tags: &[FitTag],
    shirt_weight: Option<f64>,
    score: f64,
    params: &InteractionParams,
) -> f64 {
    let has = |tag: FitTag| tags.contains(&tag);
    let mut score = score;

    match shirt_weight {
        Some(weight) if has(FitTag::ComicallyOversized) && weight < COMICAL_LIGHT_MAX => {
            score = (score - COMICAL_LIGHT_PENALTY).max(0.0);
            info!(weight, "Applied harsh penalty for very oversized lightweight shirt");
        }
        Some(weight) if has(FitTag::Oversized) || has(FitTag::VeryOversized) => {
            if weight >= HEAVY_MIN {
                score = (score + params.oversized_heavy_bonus).min(100.0);
            } else if weight < LIGHT_MAX {
                score = (score - params.oversized_light_penalty * 2.0).max(0.0);
            }
        }
        _ => {}
    }

    if let Some(weight) = shirt_weight {
        if has(FitTag::RelaxedFit) && weight >= RELAXED_HEAVY_MIN {
            score = (score + params.relaxed_heavy_bonus).min(100.0);
        }
        if has(FitTag::SlimFit) && weight < LIGHT_MAX {
            score = (score - params.slim_light_penalty).max(0.0);
        }
    }

    if has(FitTag::ComicallyOversized) {
        score = score.min(COMICAL_CAP);
    } else if has(FitTag::VeryOversized) {
        score = score.min(VERY_OVERSIZED_CAP);
    }

    score
}
