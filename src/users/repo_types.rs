use serde::Serialize;

/// Account record held by the user store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub user_id: String,         // unique key
    pub username: String,        // display name, may repeat
    #[serde(skip_serializing)]
    pub hashed_password: String, // stored as received
    pub email: String,           // unique
}

impl User {
    /// Random 8-character id for sign-ups that do not bring their own.
    pub fn generate_id() -> String {
        let mut id = uuid::Uuid::new_v4().simple().to_string();
        id.truncate(8);
        id
    }
}
