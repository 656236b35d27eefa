use std::path::Path;

use regex::Regex;

use crate::core::types::ExclusionEntry;
use crate::parsing::ParseError;

/// Line format of the upstream rejection log. One entry per line;
/// anything that does not match the pattern is not an exclusion and is
/// skipped without comment.
const ENTRY_PATTERN: &str = r"Planned order not found for (\d{7}[a-zA-Z]-[\w-]+), (D-\d{7}-\d{5}), ([\d,]+)\.000, Sigmanest Program:([\d-]+)";

/// Parse the exclusion list from a free-text rejection log.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read.
pub fn parse_exclusions_file(path: &Path) -> Result<Vec<ExclusionEntry>, ParseError> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_exclusions_text(&text))
}

/// Parse exclusion entries out of free text.
pub fn parse_exclusions_text(text: &str) -> Vec<ExclusionEntry> {
    let pattern = Regex::new(ENTRY_PATTERN).expect("exclusion entry pattern is valid");

    text.lines()
        .filter_map(|line| {
            let caps = pattern.captures(line.trim())?;
            let qty: i64 = caps[3].replace(',', "").parse().ok()?;
            Some(ExclusionEntry {
                item: caps[1].to_uppercase(),
                reference: caps[2].to_string(),
                qty,
                program: caps[4].to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_entry() {
        let text = "Planned order not found for 1230055A-X1A, D-1230055-10001, 5.000, Sigmanest Program:20231\n";
        let entries = parse_exclusions_text(text);

        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.item, "1230055A-X1A");
        assert_eq!(e.reference, "D-1230055-10001");
        assert_eq!(e.qty, 5);
        assert_eq!(e.program, "20231");
    }

    #[test]
    fn test_thousands_separator_in_qty() {
        let text = "Planned order not found for 1230055A-X1A, D-1230055-10001, 1,250.000, Sigmanest Program:20231\n";
        let entries = parse_exclusions_text(text);
        assert_eq!(entries[0].qty, 1250);
    }

    #[test]
    fn test_item_uppercased() {
        let text = "Planned order not found for 1230055a-x1a, D-1230055-10001, 5.000, Sigmanest Program:20231\n";
        assert_eq!(parse_exclusions_text(text)[0].item, "1230055A-X1A");
    }

    #[test]
    fn test_non_matching_lines_skipped() {
        let text = "some unrelated log line\n\
            Planned order not found for 1230055A-X1A, D-1230055-10001, 5.000, Sigmanest Program:20231\n\
            another stray line\n";
        assert_eq!(parse_exclusions_text(text).len(), 1);
    }

    #[test]
    fn test_empty_text() {
        assert!(parse_exclusions_text("").is_empty());
    }
}
