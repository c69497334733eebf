//! User service — onboarding persistence and admin bootstrap.

use std::collections::HashSet;

use eventbot_domain::error::EventBotError;
use eventbot_domain::id::UserId;
use eventbot_domain::time;
use eventbot_domain::user::User;

use crate::ports::UserRepository;

/// Application service for onboarded users.
pub struct UserService<R> {
    repo: R,
    admins: HashSet<UserId>,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new service. Users whose id is in `admins` get the admin flag
    /// when they complete onboarding.
    pub fn new(repo: R, admins: HashSet<UserId>) -> Self {
        Self { repo, admins }
    }

    /// Look up a user, `None` if they never completed onboarding.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn find(&self, user_id: &UserId) -> Result<Option<User>, EventBotError> {
        self.repo.get(user_id).await
    }

    /// Build, validate and store the user collected by the onboarding wizard.
    ///
    /// # Errors
    ///
    /// Returns [`EventBotError::Validation`] if a field is invalid, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, first_name, last_name))]
    pub async fn complete_onboarding(
        &self,
        user_id: UserId,
        first_name: &str,
        last_name: &str,
        birth_year: i32,
    ) -> Result<User, EventBotError> {
        let is_admin = self.admins.contains(&user_id);
        let user = User::builder()
            .id(user_id)
            .first_name(first_name)
            .last_name(last_name)
            .birth_year(birth_year)
            .admin(is_admin)
            .build(time::year_of(time::now()))?;
        let user = self.repo.put(user).await?;
        tracing::info!(user_id = %user.id, is_admin, "user onboarded");
        Ok(user)
    }
}
