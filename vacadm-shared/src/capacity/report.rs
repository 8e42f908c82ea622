/// JSON and CSV renderings of capacity records
///
/// Both renderers consume the same `&[CapacityRecord]`; the format is picked
/// at the HTTP boundary from the `Accept` header.
///
/// The CSV has one header row. Each team contributes one row per visible
/// vacation, or a single row with empty vacation columns when it has none
/// (or the caller may not see them). Timestamps are RFC 3339.

use chrono::{DateTime, SecondsFormat, Utc};
use csv_async::AsyncWriter;

use super::CapacityRecord;
use crate::models::vacation::Vacation;

/// Column names of the CSV report
pub const CSV_HEADER: [&str; 11] = [
    "from",
    "to",
    "team_id",
    "availability",
    "vacation_id",
    "vacation_user_id",
    "vacation_approved_by",
    "vacation_from",
    "vacation_to",
    "vacation_created_at",
    "vacation_deleted_at",
];

/// Error type for report rendering
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv_async::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output representation of a capacity report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
}

impl ReportFormat {
    /// `text/csv` or `application/csv` anywhere in the header selects CSV
    pub fn from_accept(accept: Option<&str>) -> Self {
        let Some(accept) = accept else {
            return ReportFormat::Json;
        };

        let wants_csv = accept.split(',').any(|part| {
            let media = part.split(';').next().unwrap_or("").trim();
            media.eq_ignore_ascii_case("text/csv") || media.eq_ignore_ascii_case("application/csv")
        });

        if wants_csv {
            ReportFormat::Csv
        } else {
            ReportFormat::Json
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Json => "application/json",
            ReportFormat::Csv => "text/csv",
        }
    }
}

fn timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn row(record: &CapacityRecord, vacation: Option<&Vacation>) -> Vec<String> {
    let mut fields = vec![
        timestamp(record.from),
        timestamp(record.to),
        record.team_id.to_string(),
        record.availability.to_string(),
    ];

    match vacation {
        Some(v) => fields.extend([
            v.id.to_string(),
            v.user_id.to_string(),
            v.approved_by.to_string(),
            timestamp(v.from),
            timestamp(v.to),
            timestamp(v.created_at),
            v.deleted_at.map(timestamp).unwrap_or_default(),
        ]),
        None => fields.extend(std::iter::repeat(String::new()).take(7)),
    }

    fields
}

/// Renders records as a JSON array
pub fn render_json(records: &[CapacityRecord]) -> Result<Vec<u8>, ReportError> {
    Ok(serde_json::to_vec(records)?)
}

/// Renders records as CSV
pub async fn render_csv(records: &[CapacityRecord]) -> Result<Vec<u8>, ReportError> {
    let mut writer = AsyncWriter::from_writer(Vec::new());
    writer.write_record(&CSV_HEADER).await?;

    for record in records {
        match record.vacations.as_deref() {
            Some(vacations) if !vacations.is_empty() => {
                for vacation in vacations {
                    writer.write_record(row(record, Some(vacation))).await?;
                }
            }
            _ => writer.write_record(row(record, None)).await?,
        }
    }

    writer.flush().await?;
    Ok(writer.into_inner().await?)
}

/// Renders records in the requested format
pub async fn render(records: &[CapacityRecord], format: ReportFormat) -> Result<Vec<u8>, ReportError> {
    match format {
        ReportFormat::Json => render_json(records),
        ReportFormat::Csv => render_csv(records).await,
    }
}
