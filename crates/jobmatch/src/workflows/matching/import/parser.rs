use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::normalizer::normalize_instant;
use super::PostingImportError;
use crate::workflows::identity::PostingId;
use crate::workflows::matching::domain::{PostingSnapshot, WageRange};

pub(crate) fn parse_postings<R: Read>(reader: R) -> Result<Vec<PostingSnapshot>, PostingImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut postings = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        // quoted fields may span lines
        let line = record.position().map_or(0, |position| position.line());
        let row: PostingRow = record.deserialize(Some(&headers))?;
        postings.push(row.into_snapshot(line)?);
    }

    Ok(postings)
}

#[derive(Debug, Deserialize)]
struct PostingRow {
    id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    created_at: Option<String>,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    location: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    wage_min: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    wage_max: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    active: Option<String>,
}

impl PostingRow {
    fn into_snapshot(self, line: u64) -> Result<PostingSnapshot, PostingImportError> {
        let raw_created = self
            .created_at
            .ok_or(PostingImportError::MissingTimestamp { line })?;
        let created_at =
            normalize_instant(&raw_created).ok_or(PostingImportError::InvalidTimestamp {
                line,
                value: raw_created,
            })?;

        Ok(PostingSnapshot {
            id: PostingId(self.id),
            created_at,
            title: self.title,
            description: self.description,
            location: self.location,
            wage: WageRange {
                min: self.wage_min.as_deref().and_then(parse_wage),
                max: self.wage_max.as_deref().and_then(parse_wage),
            },
            active: self.active.as_deref().map_or(true, parse_flag),
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Wages arrive as "1,200", "1200", or "1200.0"; anything else is treated as absent.
fn parse_wage(value: &str) -> Option<u32> {
    let cleaned: String = value.chars().filter(|ch| *ch != ',' && *ch != '_').collect();
    cleaned
        .trim()
        .parse::<u32>()
        .ok()
        .or_else(|| {
            cleaned
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|wage| wage.is_finite() && *wage >= 0.0 && *wage <= f64::from(u32::MAX))
                .map(|wage| wage.round() as u32)
        })
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "n" | "inactive" | "closed"
    )
}
