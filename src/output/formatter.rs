use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::evaluate::FitRecord;
use crate::scoring::FitResult;

const GOOD_FIT: f64 = 80.0;
const FAIR_FIT: f64 = 60.0;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a fit score: whole numbers without decimals, "-" when empty
pub fn format_score(score: Option<f64>) -> String {
    match score {
        Some(s) if s.fract() == 0.0 => format!("{:.0}", s),
        Some(s) => format!("{:.1}", s),
        None => "-".to_string(),
    }
}

fn colorize_score(padded: &str, score: Option<f64>) -> String {
    match score {
        Some(s) if s >= GOOD_FIT => padded.green().bold().to_string(),
        Some(s) if s >= FAIR_FIT => padded.yellow().to_string(),
        Some(_) => padded.red().to_string(),
        None => padded.dimmed().to_string(),
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Score and confidence cell, e.g. "  87  100%"
fn score_cells(result: &FitResult, use_colors: bool) -> String {
    let score = format!("{:>4}", format_score(result.fit_score));
    let score = if use_colors {
        colorize_score(&score, result.fit_score)
    } else {
        score
    };
    format!("{} {:>4}", score, format!("{}%", result.confidence))
}

/// Format records as a ranked table: index, core, bulk and optional style
/// score/confidence pairs, then name and the primary result's tags.
/// Tags are truncated to the terminal width when stdout is a terminal.
pub fn format_fit_table(records: &[FitRecord], use_colors: bool) -> String {
    if records.is_empty() {
        return "No shirts found.".to_string();
    }

    let with_style = records.iter().any(|r| r.style.is_some());
    let separator = "  ";
    let name_width = records
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .min(32);

    let mut header = format!("{:>3} {:>9}{}{:>9}", "#", "Core", separator, "Bulk");
    if with_style {
        header.push_str(&format!("{}{:>9}", separator, "Style"));
    }
    header.push_str(&format!("{}{:<name_width$}{}Tags", separator, "Shirt", separator));
    let fixed_width = header.chars().count() - "Tags".len();
    let header = if use_colors { header.dimmed().to_string() } else { header };

    let term_width = get_terminal_width();
    let mut lines = vec![header];
    for (idx, record) in records.iter().enumerate() {
        let index_str = format!("{:>2}.", idx + 1);
        let mut line = if use_colors {
            index_str.dimmed().to_string()
        } else {
            index_str
        };
        line.push(' ');
        line.push_str(&score_cells(&record.core, use_colors));
        line.push_str(separator);
        line.push_str(&score_cells(&record.bulk, use_colors));
        let primary = match &record.style {
            Some(style) => {
                line.push_str(separator);
                line.push_str(&score_cells(&style.result, use_colors));
                &style.result
            }
            None => {
                if with_style {
                    line.push_str(separator);
                    line.push_str(&format!("{:>9}", ""));
                }
                &record.core
            }
        };

        let name = format!("{:<name_width$}", truncate(&record.name, name_width));
        line.push_str(separator);
        if use_colors {
            line.push_str(&name.bold().to_string());
        } else {
            line.push_str(&name);
        }

        let tags = primary.tags_joined();
        let tags = match term_width {
            Some(width) if width > fixed_width + 10 => truncate(&tags, width - fixed_width),
            Some(_) => truncate(&tags, 20),
            None => tags,
        };
        line.push_str(separator);
        if use_colors {
            line.push_str(&tags.cyan().to_string());
        } else {
            line.push_str(&tags);
        }
        lines.push(line.trim_end().to_string());
    }
    lines.join("\n")
}

fn format_result_detail(label: &str, result: &FitResult, use_colors: bool) -> String {
    let score = format_score(result.fit_score);
    let score = if use_colors {
        colorize_score(&score, result.fit_score)
    } else {
        score
    };
    let tags = if result.tags.is_empty() {
        "none".to_string()
    } else {
        result.tags_joined()
    };
    format!(
        "  {}: {} (confidence {}%)\n    Tags: {}\n    {}",
        label, score, result.confidence, tags, result.rationale
    )
}

/// Format one record with rationales (for verbose mode)
pub fn format_fit_detail(record: &FitRecord, use_colors: bool) -> String {
    let mut sections = Vec::with_capacity(4);
    if use_colors {
        sections.push(record.name.bold().to_string());
    } else {
        sections.push(record.name.clone());
    }
    sections.push(format_result_detail("Core", &record.core, use_colors));
    sections.push(format_result_detail("Bulk", &record.bulk, use_colors));
    if let Some(style) = &record.style {
        let label = format!("Style ({})", style.profile);
        sections.push(format_result_detail(&label, &style.result, use_colors));
    }
    sections.join("\n")
}

/// Format records as tab-separated values for scripting
/// Columns: name, core score, core confidence, bulk score, bulk confidence,
/// [style score, style confidence,] tags (no headers, no colors)
pub fn format_tsv(records: &[FitRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }

    records
        .iter()
        .map(|record| {
            let mut fields = vec![
                record.name.clone(),
                format_score(record.core.fit_score),
                record.core.confidence.to_string(),
                format_score(record.bulk.fit_score),
                record.bulk.confidence.to_string(),
            ];
            let primary = match &record.style {
                Some(style) => {
                    fields.push(format_score(style.result.fit_score));
                    fields.push(style.result.confidence.to_string());
                    &style.result
                }
                None => &record.core,
            };
            fields.push(primary.tags_joined());
            fields.join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format records as pretty-printed JSON, per-aspect breakdown included
pub fn format_json(records: &[FitRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}
