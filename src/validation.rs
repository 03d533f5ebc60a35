use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::LazyLock};

static STUDENT_ID: LazyLock<Regex> = LazyLock::new(|| {
    // ASCII only: `\d` would also accept other Unicode digit classes.
    Regex::new(r"^[0-9]{6}$").expect("student id pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in all fields")]
    EmptyFields,
    #[error("Please enter a valid 6-digit Student ID")]
    MalformedStudentId,
}

impl ValidationError {
    /// Form field the login page should refocus after showing the error.
    pub fn focus(&self) -> Option<&'static str> {
        match self {
            Self::EmptyFields => None,
            Self::MalformedStudentId => Some("studentId"),
        }
    }
}

pub fn validate_student_id(value: &str) -> bool {
    STUDENT_ID.is_match(value)
}

/// Input-time filter applied while the user types into the id field.
pub fn sanitize_student_id_input(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// A six digit student number. Only constructible through [`StudentId::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StudentId(String);

impl StudentId {
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        if validate_student_id(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(ValidationError::MalformedStudentId)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StudentId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StudentId> for String {
    fn from(id: StudentId) -> Self {
        id.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Submit-time checks run before any credential lookup.
pub fn validate_login_form(student_id: &str, password: &str) -> Result<StudentId, ValidationError> {
    let student_id = student_id.trim();
    if student_id.is_empty() || password.is_empty() {
        return Err(ValidationError::EmptyFields);
    }
    StudentId::parse(student_id)
}
