//! User — a person who completed onboarding.

use serde::{Deserialize, Serialize};

use crate::error::{EventBotError, NameField, ValidationError};
use crate::id::UserId;

/// Longest accepted first or last name, in characters.
pub const MAX_NAME_LEN: usize = 50;
/// Earliest accepted birth year.
pub const MIN_BIRTH_YEAR: i32 = 1900;

/// A registered chat user.
///
/// Users are immutable once validated; updates replace the whole record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub birth_year: i32,
    pub is_admin: bool,
}

impl User {
    /// Create a builder for constructing a [`User`].
    #[must_use]
    pub fn builder() -> UserBuilder {
        UserBuilder::default()
    }

    /// `"First Last"`.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Check domain invariants against the given current year.
    ///
    /// # Errors
    ///
    /// Returns [`EventBotError::Validation`] when a name is empty, contains
    /// anything but letters and spaces, or is too long, or when the birth
    /// year is outside `[1900, current_year]`.
    pub fn validate(&self, current_year: i32) -> Result<(), EventBotError> {
        validate_person_name(NameField::FirstName, &self.first_name)?;
        validate_person_name(NameField::LastName, &self.last_name)?;
        check_birth_year(self.birth_year, current_year)?;
        Ok(())
    }
}

/// Validate a first or last name, returning it trimmed.
///
/// # Errors
///
/// Returns a [`ValidationError`] when the trimmed value is empty, contains
/// characters other than letters and spaces, or exceeds [`MAX_NAME_LEN`].
pub fn validate_person_name(field: NameField, input: &str) -> Result<String, ValidationError> {
    let name = input.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyPersonName(field));
    }
    if !name.chars().all(|c| c.is_alphabetic() || c == ' ') {
        return Err(ValidationError::InvalidPersonName(field));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::PersonNameTooLong {
            field,
            max: MAX_NAME_LEN,
        });
    }
    Ok(name.to_string())
}

/// Parse a birth year typed by the user.
///
/// # Errors
///
/// Returns [`ValidationError::BirthYearNotANumber`] when the text is not an
/// integer and [`ValidationError::BirthYearOutOfRange`] when it is outside
/// `[1900, current_year]`.
pub fn parse_birth_year(input: &str, current_year: i32) -> Result<i32, ValidationError> {
    let year: i32 = input
        .trim()
        .parse()
        .map_err(|_| ValidationError::BirthYearNotANumber)?;
    check_birth_year(year, current_year)?;
    Ok(year)
}

fn check_birth_year(year: i32, current_year: i32) -> Result<(), ValidationError> {
    if (MIN_BIRTH_YEAR..=current_year).contains(&year) {
        Ok(())
    } else {
        Err(ValidationError::BirthYearOutOfRange {
            year,
            min: MIN_BIRTH_YEAR,
            max: current_year,
        })
    }
}

/// Step-by-step builder for [`User`].
#[derive(Debug, Default)]
pub struct UserBuilder {
    id: Option<UserId>,
    first_name: Option<String>,
    last_name: Option<String>,
    birth_year: Option<i32>,
    is_admin: bool,
}

impl UserBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<UserId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn first_name(mut self, name: impl Into<String>) -> Self {
        self.first_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn last_name(mut self, name: impl Into<String>) -> Self {
        self.last_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn birth_year(mut self, year: i32) -> Self {
        self.birth_year = Some(year);
        self
    }

    #[must_use]
    pub fn admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }

    /// Consume the builder, validate against `current_year`, and return a
    /// [`User`] with trimmed names.
    ///
    /// # Errors
    ///
    /// Returns [`EventBotError::Validation`] if a field is missing or invalid.
    pub fn build(self, current_year: i32) -> Result<User, EventBotError> {
        let id = self
            .id
            .filter(|id| !id.as_str().trim().is_empty())
            .ok_or(ValidationError::MissingUserId)?;
        let user = User {
            id,
            first_name: self.first_name.unwrap_or_default().trim().to_string(),
            last_name: self.last_name.unwrap_or_default().trim().to_string(),
            birth_year: self.birth_year.unwrap_or_default(),
            is_admin: self.is_admin,
        };
        user.validate(current_year)?;
        Ok(user)
    }
}
