use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::{Metadata, UnknownVariant};
use crate::validation::{Rules, Validate, ValidationErrors};

pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
    Mentor,
}

impl Role {
    pub const ALL: [&'static str; 3] = ["admin", "student", "mentor"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
            Role::Mentor => "mentor",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "student" => Ok(Role::Student),
            "mentor" => Ok(Role::Mentor),
            other => Err(UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    #[serde(flatten)]
    pub meta: Metadata,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
}

/// Public projection returned alongside tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.meta.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupInput {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: String,
}

/// Checked signup payload; the password is still plaintext here.
#[derive(Debug)]
pub struct ValidSignup {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
}

impl Validate for SignupInput {
    type Output = ValidSignup;

    fn validate(self) -> Result<ValidSignup, ValidationErrors> {
        let mut rules = Rules::new();
        rules
            .required("email", &self.email)
            .email("email", &self.email)
            .min_len("password", &self.password, MIN_PASSWORD_LENGTH)
            .required("full_name", &self.full_name)
            .one_of("role", &self.role, &Role::ALL);
        rules.finish()?;

        let role = self
            .role
            .parse()
            .map_err(|e: UnknownVariant| ValidationErrors::single("role", e.to_string()))?;

        Ok(ValidSignup {
            email: self.email,
            password: self.password,
            full_name: self.full_name,
            role,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SigninInput {
    pub email: String,
    pub password: String,
}

impl Validate for SigninInput {
    type Output = SigninInput;

    fn validate(self) -> Result<SigninInput, ValidationErrors> {
        let mut rules = Rules::new();
        rules
            .required("email", &self.email)
            .email("email", &self.email)
            .required("password", &self.password);
        rules.finish()?;
        Ok(self)
    }
}
