use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

use crate::data::{BodyProfile, GarmentProfile};
use crate::scoring::{project, scale_confidence, FitModel, FitResult};

/// A style overlay resolved into its own model.
#[derive(Debug, Clone)]
pub struct StyleRun {
    pub name: String,
    pub model: FitModel,
}

#[derive(Debug, Clone, Serialize)]
pub struct StyleFit {
    pub profile: String,
    #[serde(flatten)]
    pub result: FitResult,
}

/// Results for one garment: base body, projected body and optional style.
#[derive(Debug, Clone, Serialize)]
pub struct FitRecord {
    pub name: String,
    pub core: FitResult,
    /// Confidence already scaled for the projected body
    pub bulk: FitResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleFit>,
}

impl FitRecord {
    /// Score used for ordering: the style score when a style was requested.
    pub fn primary_score(&self) -> Option<f64> {
        match &self.style {
            Some(style) => style.result.fit_score,
            None => self.core.fit_score,
        }
    }
}

/// Score every garment against the body, the projected body and, when
/// given, the style model. Records come back best first.
///
/// Each model is passed explicitly, so the base model is never affected by
/// the style run.
pub fn evaluate_all(
    body: &BodyProfile,
    garments: &[GarmentProfile],
    core: &FitModel,
    style: Option<&StyleRun>,
) -> Vec<FitRecord> {
    let projection = core.projection();
    let bulk_body = project(body, projection);

    let mut records: Vec<FitRecord> = garments
        .iter()
        .map(|garment| {
            let core_result = core.score(body, garment);
            let mut bulk_result = core.score(&bulk_body, garment);
            bulk_result.confidence =
                scale_confidence(bulk_result.confidence, projection.confidence_mod);

            let style = style.map(|run| StyleFit {
                profile: run.name.clone(),
                result: run.model.score(body, garment),
            });

            FitRecord {
                name: garment.name.clone(),
                core: core_result,
                bulk: bulk_result,
                style,
            }
        })
        .collect();

    sort_records(&mut records);
    debug!(count = records.len(), "Evaluated garments");
    records
}

/// Descending by primary score, empty scores last, ties in input order.
pub fn sort_records(records: &mut [FitRecord]) {
    records.sort_by(|a, b| match (a.primary_score(), b.primary_score()) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
