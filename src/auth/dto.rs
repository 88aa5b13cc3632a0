use serde::{Deserialize, Serialize};

use crate::users::User;

/// Request body for sign-up.
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    pub username: String,
    pub hashed_password: String,
    pub email: String,
}

impl SignUpRequest {
    pub fn into_user(self) -> User {
        User {
            user_id: self.user_id.unwrap_or_else(User::generate_id),
            username: self.username,
            hashed_password: self.hashed_password,
            email: self.email,
        }
    }
}

/// Request body for sign-in with credentials.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub jwt_token: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub user_id: String,
}
