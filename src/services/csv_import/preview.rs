use smallvec::SmallVec;

use super::types::{ColumnMapping, ContactCandidate, RawRow, PREVIEW_ROWS};
use crate::error::AppError;

pub type Preview = SmallVec<[ContactCandidate; PREVIEW_ROWS]>;

/// Maps the first [`PREVIEW_ROWS`] rows exactly as the import would.
pub fn preview(rows: &[RawRow], mapping: &ColumnMapping) -> Result<Preview, AppError> {
    mapping.ensure_ready()?;
    let candidates: Preview = rows
        .iter()
        .take(PREVIEW_ROWS)
        .map(|row| mapping.apply(row))
        .collect();
    tracing::debug!("Generated preview of {} rows", candidates.len());
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::csv_import::{parse, TargetField};

    fn mapping() -> ColumnMapping {
        let mut mapping = ColumnMapping::default();
        mapping.set("Name", Some(TargetField::Name));
        mapping.set("Email", Some(TargetField::Email));
        mapping.set("Status", Some(TargetField::Status));
        mapping
    }

    #[test]
    fn preview_is_capped_at_five_rows() {
        let mut text = String::from("Name,Email,Status\n");
        for n in 0..8 {
            text.push_str(&format!("User {n},user{n}@x.com,active\n"));
        }
        let parsed = parse(&text).unwrap();
        let candidates = preview(&parsed.rows, &mapping()).unwrap();
        assert_eq!(candidates.len(), PREVIEW_ROWS);
        assert_eq!(candidates[4].name.as_deref(), Some("User 4"));
    }

    #[test]
    fn preview_matches_the_import_transform() {
        let parsed =
            parse("Name,Email,Status\nAlice,alice@x.com,VIP\nBob,bob@x.com,CUSTOMER").unwrap();
        let mapping = mapping();
        let candidates = preview(&parsed.rows, &mapping).unwrap();
        for (row, candidate) in parsed.rows.iter().zip(candidates.iter()) {
            assert_eq!(&mapping.apply(row), candidate);
        }
    }

    #[test]
    fn preview_requires_a_ready_mapping() {
        let parsed = parse("Name,Email\nAlice,alice@x.com").unwrap();
        let mut mapping = ColumnMapping::default();
        mapping.set("Name", Some(TargetField::Name));
        assert!(preview(&parsed.rows, &mapping).is_err());
    }
}
