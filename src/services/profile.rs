use parking_lot::RwLock;
use tracing::info;

use crate::config::LatencyProfile;
use crate::error::AppError;
use crate::models::{PasswordChange, PasswordChanged, Profile, ProfileForm};
use crate::services::store::simulate_latency;

const ENTITY: &str = "Profile";

/// The signed-in user's profile. There is exactly one.
pub struct ProfileStore {
    profile: RwLock<Profile>,
    latency: LatencyProfile,
}

impl ProfileStore {
    pub fn new(profile: Profile, latency: LatencyProfile) -> Self {
        Self {
            profile: RwLock::new(profile),
            latency,
        }
    }

    pub async fn get_profile(&self) -> Profile {
        simulate_latency(self.latency.list).await;
        self.profile.read().clone()
    }

    pub async fn update_profile(&self, id: u64, form: ProfileForm) -> Result<Profile, AppError> {
        simulate_latency(self.latency.create).await;
        let mut profile = self.profile.write();
        if profile.id != id {
            return Err(AppError::not_found(ENTITY, id));
        }
        profile.name = form.name;
        profile.email = form.email;
        profile.role = form.role;
        profile.department = form.department;
        info!("Updated profile {}", id);
        Ok(profile.clone())
    }

    /// Passwords are not stored. Any current password is accepted as long as
    /// one is given, and the new one must not be blank.
    pub async fn change_password(
        &self,
        id: u64,
        change: PasswordChange,
    ) -> Result<PasswordChanged, AppError> {
        simulate_latency(self.latency.update).await;
        if self.profile.read().id != id {
            return Err(AppError::not_found(ENTITY, id));
        }
        if change.current_password.is_empty() {
            return Err(AppError::InvalidInput("Current password is required".to_string()));
        }
        if change.new_password.trim().is_empty() {
            return Err(AppError::InvalidInput("New password must not be empty".to_string()));
        }
        Ok(PasswordChanged {
            success: true,
            message: "Password changed successfully".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    fn store() -> ProfileStore {
        ProfileStore::new(Profile::default(), LatencyProfile::none())
    }

    #[tokio::test]
    async fn update_replaces_fields_but_not_id() {
        let store = store();
        let form = ProfileForm {
            name: "Dana".into(),
            email: "dana@x.com".into(),
            role: "Admin".into(),
            department: "IT".into(),
        };
        let updated = assert_ok!(store.update_profile(1, form).await);
        assert_eq!(updated.id, 1);
        assert_eq!(updated.name, "Dana");
        assert_eq!(store.get_profile().await.department, "IT");
    }

    #[tokio::test]
    async fn wrong_id_is_not_found() {
        let store = store();
        let err = assert_err!(store.update_profile(2, ProfileForm::default()).await);
        assert_eq!(err.to_string(), "Profile not found");
    }

    #[tokio::test]
    async fn change_password_reports_success() {
        let store = store();
        let change = PasswordChange {
            current_password: "old".into(),
            new_password: "new-secret".into(),
        };
        let result = assert_ok!(store.change_password(1, change).await);
        assert!(result.success);
        assert_eq!(result.message, "Password changed successfully");
    }

    #[tokio::test]
    async fn change_password_rejects_blank_password() {
        let store = store();
        let change = PasswordChange {
            current_password: "old".into(),
            new_password: "  ".into(),
        };
        assert_err!(store.change_password(1, change).await);
    }

    #[tokio::test]
    async fn change_password_requires_the_current_password() {
        let store = store();
        let change = PasswordChange {
            current_password: String::new(),
            new_password: "new-secret".into(),
        };
        let err = assert_err!(store.change_password(1, change).await);
        assert_eq!(err.to_string(), "Invalid input: Current password is required");
    }
}
