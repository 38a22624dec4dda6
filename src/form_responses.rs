use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::identity::normalize_name;

const FIRST_NAME_COL: &str = "First name";
const SURNAME_COL: &str = "Surname";
const SUBMITTED_AT_COL: &str = "Submitted at";

/// One form submission. Every column of the export is carried verbatim in
/// `answers`; the few fields the store keys on get accessors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormResponse {
    pub submitted_at: String,
    pub answers: BTreeMap<String, String>,
}

impl FormResponse {
    pub fn answer(&self, column: &str) -> Option<&str> {
        self.answers
            .get(column)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn email(&self) -> Option<&str> {
        self.answer("Email")
    }

    /// Mobile normalized to bare digits, as the store expects.
    pub fn mobile_digits(&self) -> Option<String> {
        let raw = self.answer("Mobile number")?;
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() { None } else { Some(digits) }
    }
}

/// Reads the flat form export and keeps, per normalized full name, the
/// response with the greatest `Submitted at` string. The export stamps
/// sortable ISO-ish timestamps, so string order matches submission order;
/// equal stamps keep the first row encountered. Rows missing either name
/// field are silently skipped.
pub fn load_responses(path: &Path) -> Result<HashMap<String, FormResponse>> {
    let file = File::open(path)
        .with_context(|| format!("open form response export {}", path.display()))?;
    parse_responses(file).with_context(|| format!("parse form response export {}", path.display()))
}

pub fn parse_responses<R: Read>(reader: R) -> Result<HashMap<String, FormResponse>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers().context("read export header row")?.clone();

    let mut out: HashMap<String, FormResponse> = HashMap::new();
    for record in rdr.records() {
        let record = record.context("read export row")?;
        let mut answers = BTreeMap::new();
        for (header, value) in headers.iter().zip(record.iter()) {
            answers.insert(header.to_string(), value.to_string());
        }

        let first = answers.get(FIRST_NAME_COL).map_or("", |v| v.trim());
        let surname = answers.get(SURNAME_COL).map_or("", |v| v.trim());
        if first.is_empty() || surname.is_empty() {
            continue;
        }
        let key = normalize_name(&format!("{first} {surname}"));

        let submitted_at = answers
            .get(SUBMITTED_AT_COL)
            .cloned()
            .unwrap_or_default();
        if let Some(existing) = out.get(&key)
            && submitted_at <= existing.submitted_at
        {
            continue;
        }
        out.insert(
            key,
            FormResponse {
                submitted_at,
                answers,
            },
        );
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &str) -> HashMap<String, FormResponse> {
        parse_responses(raw.as_bytes()).expect("csv should parse")
    }

    #[test]
    fn latest_submission_wins_per_person() {
        let rows = parse(
            "First name,Surname,Submitted at,Email\n\
             Jane,Doe,2025-01-01,old@example.com\n\
             jane,DOE,2025-06-01,new@example.com\n",
        );
        assert_eq!(rows.len(), 1);
        let resp = &rows["jane doe"];
        assert_eq!(resp.submitted_at, "2025-06-01");
        assert_eq!(resp.email(), Some("new@example.com"));
    }

    #[test]
    fn equal_timestamps_keep_first_row() {
        let rows = parse(
            "First name,Surname,Submitted at,Email\n\
             Jane,Doe,2025-01-01,first@example.com\n\
             Jane,Doe,2025-01-01,second@example.com\n",
        );
        assert_eq!(rows["jane doe"].email(), Some("first@example.com"));
    }

    #[test]
    fn rows_missing_a_name_field_are_skipped() {
        let rows = parse(
            "First name,Surname,Submitted at\n\
             Jane,,2025-01-01\n\
             ,Doe,2025-01-01\n",
        );
        assert!(rows.is_empty());
    }

    #[test]
    fn mobile_is_normalized_to_digits() {
        let rows = parse(
            "First name,Surname,Submitted at,Mobile number\n\
             Jane,Doe,2025-01-01,+61 400 123 456\n",
        );
        assert_eq!(rows["jane doe"].mobile_digits().as_deref(), Some("61400123456"));
    }
}
