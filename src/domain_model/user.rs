use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub postal_code: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub address: Option<Address>,
    pub password: String,
}

/// Partial update for `PUT /user/me`; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangePasswordInput {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Language {
    #[value(name = "de")]
    German,
    #[value(name = "en")]
    English,
}

impl Language {
    pub fn terms_path(self) -> &'static str {
        match self {
            Language::German => "/t&c/ger.md",
            Language::English => "/t&c/en.md",
        }
    }
}
