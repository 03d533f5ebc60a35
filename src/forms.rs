use serde::{Deserialize, Serialize};
use std::fmt;

/// Controls that are disabled while their submission is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    Login,
    Signup,
    Assignment,
    Profile,
    Report,
}

impl FormKind {
    /// Modal that hosts the form, closed when the submission completes.
    pub fn modal(&self) -> Option<&'static str> {
        match self {
            Self::Assignment => Some("assignmentModal"),
            Self::Profile => Some("profileModal"),
            _ => None,
        }
    }

    pub fn success_message(&self) -> Option<&'static str> {
        match self {
            Self::Login => Some("Login successful!"),
            Self::Signup => None,
            Self::Assignment => Some("Assignment created successfully!"),
            Self::Profile => Some("Profile updated successfully!"),
            Self::Report => Some("Report downloaded successfully!"),
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Login => "Login",
            Self::Signup => "Signup",
            Self::Assignment => "Assignment",
            Self::Profile => "Profile",
            Self::Report => "Report",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentDraft {
    pub title: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub due_date: Option<chrono::NaiveDate>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}
