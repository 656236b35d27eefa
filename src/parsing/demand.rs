use std::io::Read;
use std::path::Path;

use crate::core::demand::DemandRow;
use crate::core::types::RowId;
use crate::parsing::{column, parse_timestamp, ParseError, RowIssue};
use crate::utils::normalize::{canonical_id, canonical_id_opt};

/// Result of loading the demand ledger
#[derive(Debug)]
pub struct DemandLoad {
    pub rows: Vec<DemandRow>,
    pub issues: Vec<RowIssue>,
}

/// Read the demand ledger from a CSV file.
///
/// # Errors
///
/// Returns `ParseError::Io`/`ParseError::Csv` if the file cannot be read
/// at all, or `ParseError::MissingColumn` if a required header is absent.
/// Individual malformed rows do not fail the load; they are collected as
/// issues.
pub fn parse_demand_file(path: &Path) -> Result<DemandLoad, ParseError> {
    let file = std::fs::File::open(path)?;
    parse_demand_reader(file)
}

/// Read the demand ledger from any CSV source.
pub fn parse_demand_reader<R: Read>(reader: R) -> Result<DemandLoad, ParseError> {
    let mut csv = csv::ReaderBuilder::new().from_reader(reader);
    let headers = csv.headers()?.clone();

    let id = column(&headers, "Id")?;
    let timestamp = column(&headers, "UpdateDate")?;
    let part = column(&headers, "Part")?;
    let program = column(&headers, "Program")?;
    let qty = column(&headers, "Qty")?;
    let area = column(&headers, "Area")?;
    let material = column(&headers, "MaterialMaster")?;
    let reference = column(&headers, "OrderOrDocument")?;
    let known_value = column(&headers, "SAPValue")?;

    let mut rows = Vec::new();
    let mut issues = Vec::new();

    // Line 1 is the header; data rows are numbered from 2 to match the
    // write-back positions in the source grid.
    for (line, record) in (2u64..).zip(csv.records()) {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                issues.push(RowIssue {
                    line,
                    message: e.to_string(),
                });
                continue;
            }
        };
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let parsed_qty = match field(qty).trim().parse::<f64>() {
            Ok(v) => v.round() as i64,
            Err(_) => {
                issues.push(RowIssue {
                    line,
                    message: format!("invalid quantity: '{}'", field(qty)),
                });
                continue;
            }
        };
        let parsed_area = match field(area).trim().parse::<f64>() {
            Ok(v) => v,
            Err(_) => {
                issues.push(RowIssue {
                    line,
                    message: format!("invalid area: '{}'", field(area)),
                });
                continue;
            }
        };
        let Some(parsed_ts) = parse_timestamp(field(timestamp)) else {
            issues.push(RowIssue {
                line,
                message: format!("invalid timestamp: '{}'", field(timestamp)),
            });
            continue;
        };
        let parsed_value = match field(known_value).trim() {
            "" => None,
            raw => match raw.parse::<f64>() {
                Ok(v) => Some(v),
                Err(_) => {
                    issues.push(RowIssue {
                        line,
                        message: format!("invalid consumption value: '{raw}'"),
                    });
                    continue;
                }
            },
        };

        let mut row = DemandRow::new(
            RowId(line as u32),
            canonical_id(field(id)),
            field(part),
            field(material).trim(),
            parsed_qty,
            parsed_area,
            parsed_ts,
        );
        row.program = canonical_id_opt(field(program));
        row.reference = canonical_id_opt(field(reference));
        row.known_value = parsed_value;
        rows.push(row);
    }

    Ok(DemandLoad { rows, issues })
}
