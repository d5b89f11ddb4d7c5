use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::path::Path;

use crate::evaluate::FitRecord;
use crate::scoring::FitResult;

pub const CORE_COLUMNS: [&str; 9] = [
    "ShirtName",
    "CoreFitScore",
    "CoreConfidence",
    "CoreTags",
    "CoreRationale",
    "BulkFitScore",
    "BulkConfidence",
    "BulkTags",
    "BulkRationale",
];

pub const STYLE_COLUMNS: [&str; 5] = [
    "StyleFitScore",
    "StyleConfidence",
    "StyleTags",
    "StyleRationale",
    "StyleProfile",
];

/// Header row for the results file
pub fn result_headers(with_style: bool) -> Vec<&'static str> {
    let mut headers = CORE_COLUMNS.to_vec();
    if with_style {
        headers.extend(STYLE_COLUMNS);
    }
    headers
}

fn score_cell(score: Option<f64>) -> String {
    score.map(|s| s.to_string()).unwrap_or_default()
}

fn result_cells(result: &FitResult) -> [String; 4] {
    [
        score_cell(result.fit_score),
        result.confidence.to_string(),
        result.tags_joined(),
        result.rationale.clone(),
    ]
}

/// One flat row, in `result_headers` order
pub fn result_row(record: &FitRecord, with_style: bool) -> Vec<String> {
    let mut row = vec![record.name.clone()];
    row.extend(result_cells(&record.core));
    row.extend(result_cells(&record.bulk));
    if with_style {
        match &record.style {
            Some(style) => {
                row.extend(result_cells(&style.result));
                row.push(style.profile.clone());
            }
            None => row.extend(std::iter::repeat(String::new()).take(STYLE_COLUMNS.len())),
        }
    }
    row
}

/// Write results as CSV atomically, creating parent directories
pub fn write_results_csv(path: &Path, records: &[FitRecord], with_style: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory at {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    {
        let mut writer = csv::Writer::from_writer(&mut file);
        writer
            .write_record(result_headers(with_style))
            .context("Failed to write results header")?;
        for record in records {
            writer
                .write_record(result_row(record, with_style))
                .with_context(|| format!("Failed to write results for {}", record.name))?;
        }
        writer.flush().context("Failed to flush results")?;
    }
    file.commit()
        .with_context(|| format!("Failed to save results to {}", path.display()))?;

    Ok(())
}
