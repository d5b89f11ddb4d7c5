use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use super::types::{BodyProfile, GarmentProfile, WEIGHT_FIELD};

const MEASUREMENT_COLUMN: &str = "Measurement";
const VALUE_COLUMN: &str = "Value";
const NAME_COLUMN: &str = "ShirtName";

/// Columns that may carry fabric weight, in order of preference.
const WEIGHT_COLUMNS: [&str; 4] = ["Weight", "WeightOz", "weight", "weightoz"];

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader)
}

/// Cells as text; invalid UTF-8 is replaced rather than rejected.
fn decode(record: &csv::ByteRecord) -> Vec<String> {
    record
        .iter()
        .map(|cell| String::from_utf8_lossy(cell).into_owned())
        .collect()
}

fn read_headers<R: Read>(reader: &mut csv::Reader<R>) -> Option<Vec<String>> {
    match reader.byte_headers() {
        Ok(headers) => Some(decode(headers)),
        Err(e) => {
            warn!(error = %e, "Unreadable CSV header row");
            None
        }
    }
}

/// Data rows with their index; unreadable rows are logged and skipped.
fn read_records<R: Read>(
    reader: &mut csv::Reader<R>,
) -> impl Iterator<Item = (usize, Vec<String>)> + '_ {
    reader
        .byte_records()
        .enumerate()
        .filter_map(|(idx, record)| match record {
            Ok(record) => Some((idx, decode(&record))),
            Err(e) => {
                warn!(record = idx, error = %e, "Skipping unreadable CSV record");
                None
            }
        })
}

fn parse_cell(value: &str) -> Option<f64> {
    if value.is_empty() {
        return None;
    }
    value.parse::<f64>().ok()
}

/// Load body measurements from a CSV file.
///
/// Accepts a vertical `Measurement,Value` table or a single horizontal row
/// of named columns. Only a file that cannot be opened is an error.
pub fn load_body_measurements(path: &Path) -> Result<BodyProfile> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open body measurements at {}", path.display()))?;
    let body = parse_body(file);
    if body.is_empty() {
        warn!(path = %path.display(), "Body measurements file is empty");
    }
    Ok(body)
}

pub(crate) fn parse_body<R: Read>(reader: R) -> BodyProfile {
    let mut csv_reader = csv_reader(reader);
    let mut body = BodyProfile::new();
    let Some(headers) = read_headers(&mut csv_reader) else {
        return body;
    };
    let measurement_idx = headers.iter().position(|h| h == MEASUREMENT_COLUMN);
    let value_idx = headers.iter().position(|h| h == VALUE_COLUMN);

    match (measurement_idx, value_idx) {
        (Some(name_idx), Some(value_idx)) => {
            for (_, record) in read_records(&mut csv_reader) {
                let Some(name) = record.get(name_idx).filter(|n| !n.is_empty()) else {
                    continue;
                };
                match record.get(value_idx).and_then(|v| parse_cell(v)) {
                    Some(value) => body.insert(name.as_str(), value),
                    None => warn!(measurement = %name, "Unparsable body measurement"),
                }
            }
        }
        _ => {
            if let Some((_, record)) = read_records(&mut csv_reader).next() {
                for (header, cell) in headers.iter().zip(record.iter()) {
                    match parse_cell(cell) {
                        Some(value) => body.insert(header.as_str(), value),
                        None => warn!(measurement = %header, "Unparsable body measurement"),
                    }
                }
            }
        }
    }
    body
}

/// Load garments from a CSV file, one per row, in file order.
///
/// Fabric weight is normalized into the `Weight` field from the first
/// weight-like column present. Unreadable rows are skipped.
pub fn load_garments(path: &Path) -> Result<Vec<GarmentProfile>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open shirt data at {}", path.display()))?;
    let garments = parse_garments(file);
    if garments.is_empty() {
        warn!(path = %path.display(), "Shirt data file is empty");
    }
    debug!(count = garments.len(), "Loaded garments");
    Ok(garments)
}

pub(crate) fn parse_garments<R: Read>(reader: R) -> Vec<GarmentProfile> {
    let mut csv_reader = csv_reader(reader);
    let Some(headers) = read_headers(&mut csv_reader) else {
        return Vec::new();
    };
    let name_column = headers.iter().position(|h| h == NAME_COLUMN);
    let weight_column = WEIGHT_COLUMNS
        .iter()
        .find_map(|candidate| headers.iter().position(|h| h == candidate));

    let mut garments = Vec::new();
    for (idx, record) in read_records(&mut csv_reader) {
        let name = name_column
            .and_then(|i| record.get(i))
            .filter(|n| !n.is_empty())
            .cloned()
            .unwrap_or_else(|| format!("Shirt_{}", idx));

        let mut garment = GarmentProfile::new(name);
        for (header, cell) in headers.iter().zip(record.iter()) {
            if header == NAME_COLUMN || cell.is_empty() {
                continue;
            }
            match parse_cell(cell) {
                Some(value) => garment.insert(header.as_str(), value),
                None => {
                    debug!(shirt = %garment.name, column = %header, "Skipping non-numeric cell")
                }
            }
        }

        if let Some(value) = weight_column
            .and_then(|i| record.get(i))
            .and_then(|v| parse_cell(v))
        {
            garment.insert(WEIGHT_FIELD, value);
        }
        if garment.is_empty() {
            warn!(shirt = %garment.name, "Shirt has no usable measurements");
        }
        garments.push(garment);
    }
    garments
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_vertical_body() {
        let csv = "Measurement,Value\nChestWidth,18.5\nShoulderWidth,17.0\nTorsoLength,27.0\n\
                   HemWidth,18.0\nSleeveLength,8.0\n";
        let body = parse_body(csv.as_bytes());
        assert_eq!(body.len(), 5);
        assert_eq!(body.get("ChestWidth"), Some(18.5));
    }

    #[test]
    fn test_horizontal_body() {
        let csv = "ChestWidth,ShoulderWidth,TorsoLength,HemWidth,SleeveLength\n\
                   18.5,17.0,27.0,18.0,8.0\n";
        let body = parse_body(csv.as_bytes());
        assert_eq!(body.get("HemWidth"), Some(18.0));
        assert_eq!(body.get("SleeveLength"), Some(8.0));
    }

    #[test]
    fn test_body_trims_and_skips_bad_cells() {
        let csv = " Measurement , Value \nChestWidth, 19 \nHemWidth,n/a\nSleeveLength,\n";
        let body = parse_body(csv.as_bytes());
        assert_eq!(body.get("ChestWidth"), Some(19.0));
        assert_eq!(body.get("HemWidth"), None);
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn test_empty_body_file() {
        assert!(parse_body("".as_bytes()).is_empty());
    }

    #[test]
    fn test_body_with_invalid_utf8_keeps_readable_rows() {
        let csv: &[u8] = b"Measurement,Value\nChestWidth,20\nHem\xffWidth,18\nSleeveLength,8\n";
        let body = parse_body(csv);
        assert_eq!(body.get("ChestWidth"), Some(20.0));
        assert_eq!(body.get("SleeveLength"), Some(8.0));
        assert_eq!(body.len(), 3);
    }

    #[test]
    fn test_garments_basic() {
        let csv = "ShirtName,ChestWidth,ShoulderWidth,BodyLength,HemWidth,SleeveLength,Weight\n\
                   Test Tee,19.0,17.0,27.5,18.0,8.5,5.5\n";
        let garments = parse_garments(csv.as_bytes());
        assert_eq!(garments.len(), 1);
        assert_eq!(garments[0].name, "Test Tee");
        assert_eq!(garments[0].weight(), Some(5.5));
        assert_eq!(garments[0].get("BodyLength"), Some(27.5));
    }

    #[test]
    fn test_bad_row_does_not_stop_batch() {
        let csv: &[u8] = b"ShirtName,ChestWidth,Weight\nGood,20,5.5\nBad\xff,21,5\nOther,22,6.0\n";
        let garments = parse_garments(csv);
        assert_eq!(garments.len(), 3);
        assert_eq!(garments[0].name, "Good");
        assert!(garments[1].name.starts_with("Bad"));
        assert_eq!(garments[1].get("ChestWidth"), Some(21.0));
        assert_eq!(garments[2].name, "Other");
        assert_eq!(garments[2].weight(), Some(6.0));
    }

    #[test]
    fn test_weight_column_fallbacks() {
        let oz = parse_garments("ShirtName,WeightOz\nTest Tee,6.3\n".as_bytes());
        assert_eq!(oz[0].weight(), Some(6.3));

        let lower = parse_garments("ShirtName,weight\nTest Tee,6.7\n".as_bytes());
        assert_eq!(lower[0].weight(), Some(6.7));

        let none = parse_garments("ShirtName,ChestWidth\nTest Tee,20\n".as_bytes());
        assert_eq!(none[0].weight(), None);
    }

    #[test]
    fn test_garments_trim_headers_and_default_names() {
        let csv = "  ChestWidth  , WeightOz\n19.0,5.5\n21.0,\n";
        let garments = parse_garments(csv.as_bytes());
        assert_eq!(garments[0].name, "Shirt_0");
        assert_eq!(garments[1].name, "Shirt_1");
        assert_eq!(garments[0].get("ChestWidth"), Some(19.0));
        assert_eq!(garments[1].weight(), None);
    }

    #[test]
    fn test_garment_without_measurements_is_kept() {
        let garments = parse_garments("ShirtName,ChestWidth\nMystery,n/a\n".as_bytes());
        assert_eq!(garments.len(), 1);
        assert!(garments[0].is_empty());
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let body_path = dir.path().join("body.csv");
        let mut file = File::create(&body_path).unwrap();
        writeln!(file, "Measurement,Value\nChestWidth,20").unwrap();
        assert_eq!(load_body_measurements(&body_path).unwrap().get("ChestWidth"), Some(20.0));

        assert!(load_garments(&dir.path().join("missing.csv")).is_err());
    }
}
