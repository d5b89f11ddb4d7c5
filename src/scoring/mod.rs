pub mod aspects;
pub mod config;
pub mod engine;
pub mod interaction;
pub mod params;
pub mod projection;
pub mod validation;

pub use aspects::{AspectScore, FitTag, NEUTRAL_SCORE};
pub use config::*;
pub use engine::{AspectContribution, FitModel, FitResult, ResolvedAspect};
pub use params::{InteractionParams, Scorer, ScorerKind};
pub use projection::{project, scale_confidence};
pub use validation::validate_model;
