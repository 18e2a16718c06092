use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, FieldErrors};
use crate::models::{ActivityForm, ContactForm, DealForm, ProfileForm, TaskForm};

static CONTACT_EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid contact email pattern"));

static PROFILE_EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("valid profile email pattern"));

fn finish(errors: FieldErrors) -> Result<(), AppError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

fn require(errors: &mut FieldErrors, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.insert(field, message.to_string());
    }
}

pub fn validate_contact(form: &ContactForm) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    require(&mut errors, "name", &form.name, "Name is required");
    if form.email.trim().is_empty() {
        errors.insert("email", "Email is required".to_string());
    } else if !CONTACT_EMAIL.is_match(&form.email) {
        errors.insert("email", "Please enter a valid email address".to_string());
    }
    finish(errors)
}

/// `contact_exists` reports whether the referenced contact is stored.
pub fn validate_deal(form: &DealForm, contact_exists: bool) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    require(&mut errors, "title", &form.title, "Title is required");
    match form.value {
        None => {
            errors.insert("value", "Deal value is required".to_string());
        }
        Some(value) if !value.is_finite() || value < 0.0 => {
            errors.insert("value", "Please enter a valid amount".to_string());
        }
        Some(_) => {}
    }
    if form.probability > 100 {
        errors.insert("probability", "Probability must be between 0 and 100".to_string());
    }
    match form.contact_id {
        None => {
            errors.insert("contactId", "Contact is required".to_string());
        }
        Some(_) if !contact_exists => {
            errors.insert("contactId", "Contact does not exist".to_string());
        }
        Some(_) => {}
    }
    finish(errors)
}

pub fn validate_task(form: &TaskForm) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    require(&mut errors, "title", &form.title, "Title is required");
    if form.due_date.is_none() {
        errors.insert("dueDate", "Due date is required".to_string());
    }
    finish(errors)
}

pub fn validate_activity(form: &ActivityForm) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    require(&mut errors, "description", &form.description, "Description is required");
    if form.contact_id.is_none() {
        errors.insert("contactId", "Contact is required".to_string());
    }
    finish(errors)
}

pub fn validate_profile(form: &ProfileForm) -> Result<(), AppError> {
    let mut errors = FieldErrors::new();
    require(&mut errors, "name", &form.name, "Name is required");
    if form.email.trim().is_empty() {
        errors.insert("email", "Email is required".to_string());
    } else if !PROFILE_EMAIL.is_match(&form.email) {
        errors.insert("email", "Please enter a valid email".to_string());
    }
    require(&mut errors, "role", &form.role, "Role is required");
    require(&mut errors, "department", &form.department, "Department is required");
    finish(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityType, DealStage, TaskPriority, TaskStatus};
    use chrono::NaiveDate;

    fn field_errors(result: Result<(), AppError>) -> FieldErrors {
        match result {
            Err(AppError::Validation(errors)) => errors,
            other => panic!("expected validation errors, got {:?}", other),
        }
    }

    #[test]
    fn contact_needs_name_and_a_valid_email() {
        let errors = field_errors(validate_contact(&ContactForm::default()));
        assert_eq!(errors["name"], "Name is required");
        assert_eq!(errors["email"], "Email is required");

        let form = ContactForm {
            name: "Ann".into(),
            email: "ann at x".into(),
            ..ContactForm::default()
        };
        let errors = field_errors(validate_contact(&form));
        assert_eq!(errors["email"], "Please enter a valid email address");

        let form = ContactForm {
            name: "Ann".into(),
            email: "ann@x.com".into(),
            ..ContactForm::default()
        };
        assert!(validate_contact(&form).is_ok());
    }

    #[test]
    fn deal_rejects_negative_values_and_unknown_contacts() {
        let form = DealForm {
            title: "Renewal".into(),
            value: Some(-5.0),
            stage: DealStage::Lead,
            contact_id: Some(9),
            probability: 50,
            expected_close_date: None,
        };
        let errors = field_errors(validate_deal(&form, false));
        assert_eq!(errors["value"], "Please enter a valid amount");
        assert_eq!(errors["contactId"], "Contact does not exist");
        assert!(!errors.contains_key("title"));
    }

    #[test]
    fn deal_requires_value_and_contact() {
        let form = DealForm {
            title: String::new(),
            value: None,
            stage: DealStage::Lead,
            contact_id: None,
            probability: 50,
            expected_close_date: None,
        };
        let errors = field_errors(validate_deal(&form, false));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn task_requires_title_and_due_date() {
        let mut form = TaskForm {
            title: "  ".into(),
            description: String::new(),
            due_date: None,
            priority: TaskPriority::Medium,
            status: TaskStatus::Pending,
            contact_id: None,
            deal_id: None,
        };
        assert_eq!(field_errors(validate_task(&form)).len(), 2);

        form.title = "Call back".into();
        form.due_date = NaiveDate::from_ymd_opt(2024, 5, 1);
        assert!(validate_task(&form).is_ok());
    }

    #[test]
    fn activity_requires_description_and_contact() {
        let form = ActivityForm {
            kind: ActivityType::Note,
            description: String::new(),
            contact_id: None,
            deal_id: None,
        };
        assert_eq!(field_errors(validate_activity(&form)).len(), 2);
    }

    #[test]
    fn profile_checks_every_field() {
        let errors = field_errors(validate_profile(&ProfileForm {
            email: "nope".into(),
            ..ProfileForm::default()
        }));
        assert_eq!(errors["email"], "Please enter a valid email");
        assert_eq!(errors.len(), 4);
    }
}
