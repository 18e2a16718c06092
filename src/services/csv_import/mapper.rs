use super::types::{ColumnMapping, ContactCandidate, RawRow, TargetField};
use crate::error::AppError;
use crate::models::ContactStatus;

impl ColumnMapping {
    /// Maps `column` onto `field`, or unmaps it when `field` is `None`.
    pub fn set(&mut self, column: &str, field: Option<TargetField>) {
        match field {
            Some(field) => {
                self.0.insert(column.to_string(), field);
            }
            None => {
                self.0.remove(column);
            }
        }
    }

    #[cfg(test)]
    pub fn get(&self, column: &str) -> Option<TargetField> {
        self.0.get(column).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, TargetField)> {
        self.0.iter().map(|(column, field)| (column.as_str(), *field))
    }

    fn targets(&self, field: TargetField) -> bool {
        self.0.values().any(|mapped| *mapped == field)
    }

    /// Required fields no column maps onto yet.
    pub fn missing_required(&self) -> Vec<TargetField> {
        TargetField::REQUIRED
            .into_iter()
            .filter(|field| !self.targets(*field))
            .collect()
    }

    pub fn is_ready(&self) -> bool {
        self.missing_required().is_empty()
    }

    pub fn ensure_ready(&self) -> Result<(), AppError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(AppError::InvalidInput(
                "Please map both Name and Email fields".to_string(),
            ))
        }
    }

    /// Builds the candidate for one row. Shared by preview and import.
    ///
    /// Empty cells leave the field unset. When several columns target the
    /// same field, the last non-empty one in column-name order wins.
    pub fn apply(&self, row: &RawRow) -> ContactCandidate {
        let mut candidate = ContactCandidate::default();
        for (column, field) in self.iter() {
            let value = match row.get(column) {
                Some(value) if !value.is_empty() => value,
                _ => continue,
            };
            match field {
                TargetField::Name => candidate.name = Some(value.clone()),
                TargetField::Email => candidate.email = Some(value.clone()),
                TargetField::Phone => candidate.phone = Some(value.clone()),
                TargetField::Company => candidate.company = Some(value.clone()),
                TargetField::Status => candidate.status = Some(normalize_status(value)),
                TargetField::Tags => candidate.tags = Some(split_tags(value)),
            }
        }
        candidate
    }
}

/// Unknown statuses fall back to `lead`.
pub fn normalize_status(value: &str) -> ContactStatus {
    value
        .to_lowercase()
        .parse()
        .unwrap_or(ContactStatus::Lead)
}

pub fn split_tags(value: &str) -> Vec<String> {
    value.split(',').map(|tag| tag.trim().to_string()).collect()
}

/// Returns `current` with `column` remapped. The column must be one of the
/// uploaded headers.
pub fn map_columns(
    headers: &[String],
    current: &ColumnMapping,
    column: &str,
    field: Option<TargetField>,
) -> Result<ColumnMapping, AppError> {
    if !headers.iter().any(|header| header == column) {
        return Err(AppError::InvalidInput(format!(
            "Unknown column: {}",
            column
        )));
    }
    let mut mapping = current.clone();
    mapping.set(column, field);
    Ok(mapping)
}

pub fn is_ready(mapping: &ColumnMapping) -> bool {
    mapping.is_ready()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        ["Name", "Email", "Company", "Status", "Tags"]
            .iter()
            .map(|h| h.to_string())
            .collect()
    }

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn ready_mapping() -> ColumnMapping {
        let mut mapping = ColumnMapping::default();
        mapping.set("Name", Some(TargetField::Name));
        mapping.set("Email", Some(TargetField::Email));
        mapping
    }

    #[test]
    fn readiness_requires_name_and_email() {
        let mut mapping = ColumnMapping::default();
        assert!(!is_ready(&mapping));
        mapping.set("Name", Some(TargetField::Name));
        assert!(!is_ready(&mapping));
        assert_eq!(mapping.missing_required(), vec![TargetField::Email]);
        mapping.set("Email", Some(TargetField::Email));
        assert!(is_ready(&mapping));
        assert!(mapping.ensure_ready().is_ok());
    }

    #[test]
    fn mapping_without_email_target_is_never_ready() {
        let mut mapping = ColumnMapping::default();
        let others = [
            TargetField::Name,
            TargetField::Phone,
            TargetField::Company,
            TargetField::Status,
            TargetField::Tags,
        ];
        for field in others {
            mapping.set(&format!("{:?}", field), Some(field));
        }
        assert!(!mapping.is_ready());
        assert!(mapping.ensure_ready().is_err());
    }

    #[test]
    fn setting_the_same_field_twice_is_idempotent() {
        let company = Some(TargetField::Company);
        let once = map_columns(&headers(), &ColumnMapping::default(), "Company", company).unwrap();
        let twice = map_columns(&headers(), &once, "Company", company).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn skipping_a_column_unmaps_it() {
        let mapping = map_columns(&headers(), &ready_mapping(), "Email", None).unwrap();
        assert_eq!(mapping.get("Email"), None);
        assert!(!mapping.is_ready());
    }

    #[test]
    fn unknown_columns_are_rejected() {
        let empty = ColumnMapping::default();
        assert!(map_columns(&headers(), &empty, "Fax", Some(TargetField::Phone)).is_err());
    }

    #[test]
    fn status_is_lower_cased_or_defaults_to_lead() {
        assert_eq!(normalize_status("CUSTOMER"), ContactStatus::Customer);
        assert_eq!(normalize_status("Prospect"), ContactStatus::Prospect);
        assert_eq!(normalize_status("VIP"), ContactStatus::Lead);
    }

    #[test]
    fn apply_transforms_tags_and_status() {
        let mut mapping = ready_mapping();
        mapping.set("Status", Some(TargetField::Status));
        mapping.set("Tags", Some(TargetField::Tags));
        let candidate = mapping.apply(&row(&[
            ("Name", "Alice"),
            ("Email", "alice@x.com"),
            ("Status", "CUSTOMER"),
            ("Tags", "vip ; enterprise"),
        ]));
        assert_eq!(candidate.status, Some(ContactStatus::Customer));
        assert_eq!(candidate.tags, Some(vec!["vip ; enterprise".to_string()]));
        assert_eq!(split_tags(" a, b ,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_and_unmapped_cells_are_left_out() {
        let candidate = ready_mapping().apply(&row(&[
            ("Name", "Alice"),
            ("Email", ""),
            ("Company", "Acme"),
        ]));
        assert_eq!(candidate.name.as_deref(), Some("Alice"));
        assert_eq!(candidate.email, None);
        assert_eq!(candidate.company, None);

        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "Alice" }));
    }

    #[test]
    fn mapping_round_trips_as_a_json_object() {
        let mapping: ColumnMapping =
            serde_json::from_str(r#"{"Full Name":"name","E-mail":"email"}"#).unwrap();
        assert!(mapping.is_ready());
        assert_eq!(mapping.get("Full Name"), Some(TargetField::Name));
    }
}
