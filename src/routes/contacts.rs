use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use crate::{
    error::AppError,
    models::{Contact, ContactForm},
    services::{
        filters::{filter_contacts, ContactQuery},
        validation::validate_contact,
    },
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/contacts", get(list_contacts).post(create_contact))
        .route(
            "/contacts/:id",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
}

async fn list_contacts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ContactQuery>,
) -> Json<Vec<Contact>> {
    let contacts = state.store.contacts.get_all().await;
    Json(filter_contacts(contacts, &query))
}

async fn get_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<Contact>, AppError> {
    Ok(Json(state.store.contacts.get_by_id(id).await?))
}

async fn create_contact(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ContactForm>,
) -> Result<(StatusCode, Json<Contact>), AppError> {
    validate_contact(&form)?;
    let tags = form.tag_list();
    let now = Utc::now();
    let contact = state
        .store
        .contacts
        .create(|id| Contact {
            id,
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone,
            company: form.company,
            status: form.status,
            tags,
            created_at: now,
            last_activity: now,
        })
        .await;
    tracing::info!("Created contact {}", contact.id);
    Ok((StatusCode::CREATED, Json(contact)))
}

async fn update_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(form): Json<ContactForm>,
) -> Result<Json<Contact>, AppError> {
    validate_contact(&form)?;
    let tags = form.tag_list();
    let contact = state
        .store
        .contacts
        .update(id, |contact| {
            contact.name = form.name.trim().to_string();
            contact.email = form.email.trim().to_string();
            contact.phone = form.phone;
            contact.company = form.company;
            contact.status = form.status;
            contact.tags = tags;
        })
        .await?;
    Ok(Json(contact))
}

async fn delete_contact(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    state.store.contacts.delete(id).await?;
    tracing::info!("Deleted contact {}", id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContactStatus;
    use crate::routes::test_support;
    use tokio_test::assert_err;

    fn form(name: &str, email: &str) -> ContactForm {
        ContactForm {
            name: name.into(),
            email: email.into(),
            tags: "vip, west".into(),
            ..ContactForm::default()
        }
    }

    #[tokio::test]
    async fn create_then_fetch_contact() {
        let state = test_support::state();
        let ann = form("Ann", "ann@x.com");
        let (status, Json(created)) = create_contact(State(state.clone()), Json(ann))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.id, 1);
        assert_eq!(created.status, ContactStatus::Active);
        assert_eq!(created.tags, vec!["vip", "west"]);

        let Json(fetched) = get_contact(State(state), Path(1)).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn invalid_form_is_rejected() {
        let state = test_support::state();
        let err = assert_err!(create_contact(State(state), Json(form("", "bad"))).await);
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn update_keeps_id_and_timestamps() {
        let state = test_support::state();
        let ann = form("Ann", "ann@x.com");
        let (_, Json(created)) = create_contact(State(state.clone()), Json(ann))
            .await
            .unwrap();

        let mut change = form("Ann Lee", "ann@x.com");
        change.status = ContactStatus::Customer;
        let Json(updated) = update_contact(State(state), Path(created.id), Json(change))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Ann Lee");
        assert_eq!(updated.status, ContactStatus::Customer);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn list_applies_filters_and_delete_removes() {
        let state = test_support::state();
        for (name, email) in [("Ann", "ann@x.com"), ("Bob", "bob@y.com")] {
            let (status, _) = create_contact(State(state.clone()), Json(form(name, email)))
                .await
                .unwrap();
            assert_eq!(status, StatusCode::CREATED);
        }

        let query = ContactQuery {
            search: Some("y.com".into()),
            status: None,
        };
        let Json(found) = list_contacts(State(state.clone()), Query(query)).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Bob");

        let status = delete_contact(State(state.clone()), Path(found[0].id)).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_err!(delete_contact(State(state), Path(found[0].id)).await);
    }
}
