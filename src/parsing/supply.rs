use std::io::Read;
use std::path::Path;

use crate::classify::{EntryUnit, MovementType, RawMovement};
use crate::core::types::{DocumentId, OrderId};
use crate::parsing::{column, parse_date, parse_time_of_entry, ParseError, RowIssue};
use crate::utils::normalize::{canonical_id, canonical_id_opt};

/// Result of loading the supply ledger
#[derive(Debug)]
pub struct SupplyLoad {
    pub movements: Vec<RawMovement>,
    pub issues: Vec<RowIssue>,
}

/// Read the supply ledger from a CSV export.
///
/// # Errors
///
/// Returns `ParseError::Io`/`ParseError::Csv` if the file cannot be read
/// at all, or `ParseError::MissingColumn` if a required header is absent.
/// Malformed rows become issues; rows with no material are skipped
/// outright (summary lines in the export carry none).
pub fn parse_supply_file(path: &Path) -> Result<SupplyLoad, ParseError> {
    let file = std::fs::File::open(path)?;
    parse_supply_reader(file)
}

/// Read the supply ledger from any CSV source.
pub fn parse_supply_reader<R: Read>(reader: R) -> Result<SupplyLoad, ParseError> {
    let mut csv = csv::ReaderBuilder::new().from_reader(reader);
    let headers = csv.headers()?.clone();

    let document = column(&headers, "Material Document")?;
    let movement_type = column(&headers, "Movement type")?;
    let material = column(&headers, "Material")?;
    let qty = column(&headers, "Qty in unit of entry")?;
    let unit = column(&headers, "Unit of Entry")?;
    let location = column(&headers, "Storage Location")?;
    let order = column(&headers, "Order")?;
    let posting_date = column(&headers, "Posting Date")?;
    let time_of_entry = column(&headers, "Time of Entry")?;
    let reference = column(&headers, "Reference")?;

    let mut movements = Vec::new();
    let mut issues = Vec::new();

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

        if field(material).trim().is_empty() {
            continue;
        }

        let parsed_qty = match field(qty).trim().parse::<f64>() {
            Ok(v) => v,
            Err(_) => {
                issues.push(RowIssue {
                    line,
                    message: format!("invalid quantity: '{}'", field(qty)),
                });
                continue;
            }
        };
        let Some(date) = parse_date(field(posting_date)) else {
            issues.push(RowIssue {
                line,
                message: format!("invalid posting date: '{}'", field(posting_date)),
            });
            continue;
        };
        let Some(time) = parse_time_of_entry(field(time_of_entry)) else {
            issues.push(RowIssue {
                line,
                message: format!("invalid time of entry: '{}'", field(time_of_entry)),
            });
            continue;
        };

        movements.push(RawMovement {
            document: DocumentId::new(canonical_id(field(document))),
            movement_type: MovementType::parse(field(movement_type)),
            material: field(material).trim().to_string(),
            qty: parsed_qty,
            unit: EntryUnit::parse(field(unit)),
            location: field(location).trim().to_string(),
            order: canonical_id_opt(field(order)).map(OrderId::new),
            reference: canonical_id_opt(field(reference)),
            timestamp: date.and_time(time),
        });
    }

    Ok(SupplyLoad { movements, issues })
}
