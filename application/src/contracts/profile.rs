use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use domain::user::{User, UserId, UserPatch};

/// Profile row as the store returns it (snake_case columns).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
}

impl From<ProfileRecord> for User {
    fn from(record: ProfileRecord) -> Self {
        Self {
            id: record.id,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            phone: record.phone.filter(|phone| !phone.is_empty()),
            date_of_birth: record.date_of_birth.filter(|date| !date.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProfile {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Column-level changes for an update. Absent fields are never sent.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<String>,
}

impl ProfileChanges {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.date_of_birth.is_none()
    }

    /// Provided columns in a stable order, for stores that build SQL.
    pub fn columns(&self) -> Vec<(&'static str, &str)> {
        [
            ("first_name", self.first_name.as_deref()),
            ("last_name", self.last_name.as_deref()),
            ("email", self.email.as_deref()),
            ("phone", self.phone.as_deref()),
            ("date_of_birth", self.date_of_birth.as_deref()),
        ]
        .into_iter()
        .filter_map(|(column, value)| value.map(|value| (column, value)))
        .collect()
    }
}

/// Blank patch values are dropped, never written as empty columns.
impl From<&UserPatch> for ProfileChanges {
    fn from(patch: &UserPatch) -> Self {
        let patch = patch.clone().without_blanks();
        Self {
            first_name: patch.first_name,
            last_name: patch.last_name,
            email: patch.email,
            phone: patch.phone,
            date_of_birth: patch.date_of_birth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKey<'a> {
    Id(&'a UserId),
    Email(&'a str),
    Phone(&'a str),
}

impl ProfileKey<'_> {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Id(_) => "id",
            Self::Email(_) => "email",
            Self::Phone(_) => "phone",
        }
    }

    pub fn value(&self) -> String {
        match self {
            Self::Id(id) => id.to_string(),
            Self::Email(value) | Self::Phone(value) => (*value).to_string(),
        }
    }
}
