use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Identifier assigned by the remote store. Treated as an opaque string, never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StudentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for StudentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for StudentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(rename = "_id", alias = "id")]
    pub id: StudentId,
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
}

/// In-progress edit of the four editable fields. Always an owned copy.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub class: String,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DraftField {
    FullName,
    Email,
    Age,
    Class,
}

impl DraftField {
    /// Name used on the wire and as the form input name.
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Email => "email",
            Self::Age => "age",
            Self::Class => "class",
        }
    }
}

impl StudentDraft {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, field: DraftField) -> &str {
        match field {
            DraftField::FullName => &self.full_name,
            DraftField::Email => &self.email,
            DraftField::Age => &self.age,
            DraftField::Class => &self.class,
        }
    }

    pub fn set(&mut self, field: DraftField, value: String) {
        let slot = match field {
            DraftField::FullName => &mut self.full_name,
            DraftField::Email => &mut self.email,
            DraftField::Age => &mut self.age,
            DraftField::Class => &mut self.class,
        };
        *slot = value;
    }

    pub fn has_full_name(&self) -> bool {
        !self.full_name.is_empty()
    }
}

impl From<&Student> for StudentDraft {
    fn from(student: &Student) -> Self {
        Self {
            full_name: student.full_name.clone(),
            email: student.email.clone().unwrap_or_default(),
            age: student.age.clone().unwrap_or_default(),
            class: student.class.clone().unwrap_or_default(),
        }
    }
}

/// One keystroke's worth of draft change. Only the fields present are applied.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct DraftFieldUpdate {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub age: Option<String>,
    pub class: Option<String>,
}

impl DraftFieldUpdate {
    pub fn into_changes(self) -> Vec<(DraftField, String)> {
        let Self {
            full_name,
            email,
            age,
            class,
        } = self;

        [
            (DraftField::FullName, full_name),
            (DraftField::Email, email),
            (DraftField::Age, age),
            (DraftField::Class, class),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
        .collect()
    }
}
