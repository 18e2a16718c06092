use chrono::{DateTime, NaiveDate, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::Contact;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExportField {
    Name,
    Email,
    Phone,
    Company,
    Status,
    Tags,
    CreatedAt,
    LastActivity,
}

impl ExportField {
    pub const DEFAULT: [ExportField; 5] = [
        ExportField::Name,
        ExportField::Email,
        ExportField::Phone,
        ExportField::Company,
        ExportField::Status,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ExportField::Name => "Name",
            ExportField::Email => "Email",
            ExportField::Phone => "Phone",
            ExportField::Company => "Company",
            ExportField::Status => "Status",
            ExportField::Tags => "Tags",
            ExportField::CreatedAt => "Created Date",
            ExportField::LastActivity => "Last Activity",
        }
    }

    fn value(&self, contact: &Contact) -> String {
        match self {
            ExportField::Name => contact.name.clone(),
            ExportField::Email => contact.email.clone(),
            ExportField::Phone => contact.phone.clone(),
            ExportField::Company => contact.company.clone(),
            ExportField::Status => contact.status.to_string(),
            ExportField::Tags => contact.tags.join(", "),
            ExportField::CreatedAt => short_date(contact.created_at),
            ExportField::LastActivity => short_date(contact.last_activity),
        }
    }
}

fn short_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%-m/%-d/%Y").to_string()
}

/// Renders `contacts` as CSV with one column per selected field, every cell
/// quoted.
pub fn contacts_to_csv(contacts: &[Contact], fields: &[ExportField]) -> Result<String, AppError> {
    if contacts.is_empty() || fields.is_empty() {
        return Err(AppError::InvalidInput("No data to export".to_string()));
    }

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(fields.iter().map(ExportField::label))?;
    for contact in contacts {
        writer.write_record(fields.iter().map(|field| field.value(contact)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Export(e.to_string()))?;
    let csv = String::from_utf8(bytes).map_err(|e| AppError::Export(e.to_string()))?;

    tracing::info!("Exported {} contacts with {} fields", contacts.len(), fields.len());
    Ok(csv)
}

pub fn export_file_name(today: NaiveDate) -> String {
    format!("contacts_{}.csv", today.format("%Y-%m-%d"))
}
