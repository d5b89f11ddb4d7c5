use serde::{Serialize, Serializer};
use std::fmt;

use super::params::{
    ChestParams, HemParams, LengthParams, Scorer, ShoulderParams, SleeveParams, WeightParams,
};

/// Score reported for an aspect that could not be evaluated.
pub const NEUTRAL_SCORE: f64 = 50.0;

/// Lightweight score used when weight is the only aspect with data.
const SOLE_ASPECT_LIGHT_SCORE: f64 = 42.0;

/// Half-inch band treated as an exact fit for chest and shoulder.
const CLOSE_FIT_TOLERANCE: f64 = 0.5;

const SLEEVE_SHORT_RATIO: f64 = 0.35;
const SLEEVE_ELBOW_RATIO: f64 = 0.5;

/// Style tag attached to an aspect outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FitTag {
    TooTight,
    SlimFit,
    RelaxedFit,
    Oversized,
    VeryOversized,
    ComicallyOversized,
    ShouldersTooNarrow,
    DropShoulder,
    VeryOversizedShoulders,
    Cropped,
    ShortLength,
    VeryLong,
    BoxyCut,
    LonglineCut,
    TightWaist,
    FlaredHem,
    TaperedWaist,
    CapSleeve,
    ShortSleeves,
    ElbowLengthSleeves,
    Lightweight,
    Midweight,
    Heavyweight,
    VeryHeavyweight,
}

impl FitTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            FitTag::TooTight => "Too Tight",
            FitTag::SlimFit => "Slim Fit",
            FitTag::RelaxedFit => "Relaxed Fit",
            FitTag::Oversized => "Oversized",
            FitTag::VeryOversized => "Very Oversized",
            FitTag::ComicallyOversized => "Comically Oversized",
            FitTag::ShouldersTooNarrow => "Shoulders Too Narrow",
            FitTag::DropShoulder => "Drop-Shoulder",
            FitTag::VeryOversizedShoulders => "Very Oversized Shoulders",
            FitTag::Cropped => "Cropped",
            FitTag::ShortLength => "Short Length",
            FitTag::VeryLong => "Very Long",
            FitTag::BoxyCut => "Boxy Cut",
            FitTag::LonglineCut => "Longline Cut",
            FitTag::TightWaist => "Tight Waist",
            FitTag::FlaredHem => "Flared Hem",
            FitTag::TaperedWaist => "Tapered Waist",
            FitTag::CapSleeve => "Cap Sleeve",
            FitTag::ShortSleeves => "Short Sleeves",
            FitTag::ElbowLengthSleeves => "Elbow-Length Sleeves",
            FitTag::Lightweight => "Lightweight",
            FitTag::Midweight => "Midweight",
            FitTag::Heavyweight => "Heavyweight",
            FitTag::VeryHeavyweight => "Very Heavyweight",
        }
    }
}

impl fmt::Display for FitTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FitTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Outcome of one aspect scorer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AspectScore {
    pub score: f64,
    pub tag: Option<FitTag>,
    pub rationale: String,
    /// False only on the missing-data path
    pub present: bool,
}

impl AspectScore {
    fn measured(score: f64, tag: Option<FitTag>, rationale: String) -> Self {
        Self {
            score,
            tag,
            rationale,
            present: true,
        }
    }

    /// Neutral result for an aspect without usable inputs.
    pub fn missing(aspect: &str) -> Self {
        Self {
            score: NEUTRAL_SCORE,
            tag: None,
            rationale: format!("[No {} data]", aspect),
            present: false,
        }
    }
}

/// Values handed to a scorer. Absent means missing or NaN upstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct AspectInputs {
    pub body: Option<f64>,
    pub shirt: Option<f64>,
    /// Garment chest width, only set for aspects that need it
    pub shirt_chest: Option<f64>,
    /// Whether any aspect scored before this one had data
    pub others_present: bool,
}

impl Scorer {
    /// Run the scorer; `None` means its required inputs are missing.
    pub fn evaluate(&self, inputs: &AspectInputs) -> Option<AspectScore> {
        match self {
            Scorer::Chest(p) => score_chest(inputs.body, inputs.shirt, p),
            Scorer::Shoulder(p) => score_shoulder(inputs.body, inputs.shirt, p),
            Scorer::Length(p) => score_length(inputs.body, inputs.shirt, inputs.shirt_chest, p),
            Scorer::Hem(p) => score_hem(inputs.body, inputs.shirt, inputs.shirt_chest, p),
            Scorer::Sleeve(p) => score_sleeve(inputs.body, inputs.shirt, inputs.shirt_chest, p),
            Scorer::Weight(p) => score_weight(inputs.shirt, inputs.others_present, p),
        }
    }
}

/// Ratio band: applies to ratios below `upper`.
#[derive(Debug, Clone, Copy)]
pub struct RatioBand {
    pub upper: f64,
    pub score: f64,
    pub tag: Option<FitTag>,
    pub label: &'static str,
}

const LENGTH_RATIO_BANDS: [RatioBand; 3] = [
    RatioBand {
        upper: 1.2,
        score: 100.0,
        tag: Some(FitTag::BoxyCut),
        label: "boxy cut",
    },
    RatioBand {
        upper: 1.4,
        score: 90.0,
        tag: None,
        label: "regular",
    },
    RatioBand {
        upper: f64::INFINITY,
        score: 70.0,
        tag: Some(FitTag::LonglineCut),
        label: "longline",
    },
];

/// First band whose upper bound exceeds `ratio`, else the last band.
pub fn score_by_ratio(ratio: f64, bands: &[RatioBand]) -> Option<&RatioBand> {
    bands.iter().find(|band| ratio < band.upper).or_else(|| bands.last())
}

pub fn score_chest(body: Option<f64>, shirt: Option<f64>, p: &ChestParams) -> Option<AspectScore> {
    let diff = shirt? - body?;
    let note = |label: &str| format!("Chest: {:+.1}\" vs body ({}).", diff, label);

    let result = if diff < -CLOSE_FIT_TOLERANCE {
        AspectScore::measured(
            (100.0 + diff * p.too_tight_penalty).max(0.0),
            Some(FitTag::TooTight),
            note("tight"),
        )
    } else if diff < 0.0 {
        AspectScore::measured(
            (100.0 + diff * p.slim_penalty).max(0.0),
            Some(FitTag::SlimFit),
            note("slim"),
        )
    } else if diff < CLOSE_FIT_TOLERANCE {
        AspectScore::measured(100.0, None, note("close fit"))
    } else if diff < p.relaxed_max {
        AspectScore::measured(100.0, Some(FitTag::RelaxedFit), note("relaxed"))
    } else if diff < p.oversized_max {
        AspectScore::measured(95.0, Some(FitTag::Oversized), note("oversized"))
    } else if diff < p.comically_oversized_max {
        let score = 85.0 - (diff - p.oversized_max) * p.very_oversized_penalty;
        AspectScore::measured(score.max(0.0), Some(FitTag::VeryOversized), note("very oversized"))
    } else {
        let score = 70.0 - (diff - p.comically_oversized_max) * p.comically_oversized_penalty;
        AspectScore::measured(
            score.max(0.0),
            Some(FitTag::ComicallyOversized),
            note("comically oversized"),
        )
    };
    Some(result)
}

pub fn score_shoulder(
    body: Option<f64>,
    shirt: Option<f64>,
    p: &ShoulderParams,
) -> Option<AspectScore> {
    let diff = shirt? - body?;
    let note = |label: &str| format!("Shoulder: {:+.1}\" vs body ({}).", diff, label);

    let result = if diff < -CLOSE_FIT_TOLERANCE {
        AspectScore::measured(
            (100.0 + diff * p.too_narrow_penalty).max(0.0),
            Some(FitTag::ShouldersTooNarrow),
            note("too narrow"),
        )
    } else if diff < CLOSE_FIT_TOLERANCE {
        AspectScore::measured(100.0, None, note("fitted"))
    } else if diff < p.drop_max {
        AspectScore::measured(100.0, Some(FitTag::DropShoulder), note("drop-shoulder"))
    } else {
        AspectScore::measured(
            (100.0 - (diff - p.drop_max) * p.very_oversized_penalty).max(60.0),
            Some(FitTag::VeryOversizedShoulders),
            note("very oversized"),
        )
    };
    Some(result)
}

pub fn score_length(
    body: Option<f64>,
    shirt: Option<f64>,
    shirt_chest: Option<f64>,
    p: &LengthParams,
) -> Option<AspectScore> {
    let shirt = shirt?;

    if let Some(body) = body {
        let diff = shirt - body;
        let note = |label: &str| format!("Length: {:+.1}\" vs body ({}).", diff, label);
        let result = if diff < p.cropped_min {
            AspectScore::measured(NEUTRAL_SCORE, Some(FitTag::Cropped), note("cropped"))
        } else if diff < p.short_max {
            AspectScore::measured(70.0, Some(FitTag::ShortLength), note("short"))
        } else if diff < p.ideal_max {
            AspectScore::measured(100.0, None, note("ideal"))
        } else if diff < p.long_max {
            AspectScore::measured(90.0, None, note("long"))
        } else {
            AspectScore::measured(p.very_long_score, Some(FitTag::VeryLong), note("very long"))
        };
        return Some(result);
    }

    let ratio = shirt / shirt_chest?;
    let band = score_by_ratio(ratio, &LENGTH_RATIO_BANDS)?;
    Some(AspectScore::measured(
        band.score,
        band.tag,
        format!("Length: Length-to-chest ratio {:.2} ({}).", ratio, band.label),
    ))
}

pub fn score_hem(
    body: Option<f64>,
    shirt: Option<f64>,
    shirt_chest: Option<f64>,
    p: &HemParams,
) -> Option<AspectScore> {
    let shirt = shirt?;

    if let Some(body) = body {
        let diff = shirt - body;
        let note = format!("Hem: {:+.1}\" vs body.", diff);
        let result = if diff < 0.0 {
            AspectScore::measured(
                (100.0 - diff.abs() * p.too_tight_penalty).max(0.0),
                Some(FitTag::TightWaist),
                note,
            )
        } else if diff < p.flared_min {
            AspectScore::measured(100.0, None, note)
        } else {
            AspectScore::measured(90.0, Some(FitTag::FlaredHem), note)
        };
        return Some(result);
    }

    let diff = shirt - shirt_chest?;
    let note = format!("Hem: {:+.1}\" vs chest.", diff);
    let result = if diff < -p.box_cut_max {
        AspectScore::measured(p.tapered_score, Some(FitTag::TaperedWaist), note)
    } else if diff < p.box_cut_max {
        AspectScore::measured(100.0, None, note)
    } else {
        AspectScore::measured(90.0, Some(FitTag::BoxyCut), note)
    };
    Some(result)
}

pub fn score_sleeve(
    body: Option<f64>,
    shirt: Option<f64>,
    shirt_chest: Option<f64>,
    p: &SleeveParams,
) -> Option<AspectScore> {
    let shirt = shirt?;

    if let Some(body) = body {
        let diff = shirt - body;
        let note = format!("Sleeve: {:+.1}\" vs body arm.", diff);
        let result = if diff < p.cap_min {
            AspectScore::measured(p.cap_score, Some(FitTag::CapSleeve), note)
        } else if diff < p.short_max {
            AspectScore::measured(p.short_score, Some(FitTag::ShortSleeves), note)
        } else if diff < p.ideal_max {
            AspectScore::measured(p.ideal_score, None, note)
        } else {
            AspectScore::measured(p.elbow_score, Some(FitTag::ElbowLengthSleeves), note)
        };
        return Some(result);
    }

    // Without a usable chest width the ratio reads as zero.
    let ratio = match shirt_chest {
        Some(chest) if chest != 0.0 => shirt / chest,
        _ => 0.0,
    };
    let note = format!("Sleeve: Sleeve-to-chest ratio {:.2}.", ratio);
    let result = if ratio < SLEEVE_SHORT_RATIO {
        AspectScore::measured(p.short_score, Some(FitTag::ShortSleeves), note)
    } else if ratio > SLEEVE_ELBOW_RATIO {
        AspectScore::measured(p.elbow_score, Some(FitTag::ElbowLengthSleeves), note)
    } else {
        AspectScore::measured(p.ideal_score, None, note)
    };
    Some(result)
}

pub fn score_weight(
    shirt_weight: Option<f64>,
    others_present: bool,
    p: &WeightParams,
) -> Option<AspectScore> {
    let weight = shirt_weight?;

    let (score, tag) = if weight < p.light_max {
        let score = if others_present { p.light_score } else { SOLE_ASPECT_LIGHT_SCORE };
        (score, FitTag::Lightweight)
    } else if weight < p.mid_max {
        (p.mid_score, FitTag::Midweight)
    } else if weight < p.heavy_max {
        (p.heavy_score, FitTag::Heavyweight)
    } else {
        (p.very_heavy_score, FitTag::VeryHeavyweight)
    };

    Some(AspectScore::measured(
        score,
        Some(tag),
        format!("Weight: {:.1} oz (ideal is 5–6 oz for vintage).", weight),
    ))
}
