use serde::{Deserialize, Serialize};

/// JWT payload issued at sign-up. There is no `exp`; age is checked from `iat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub iss: String, // issuer
    pub sub: String, // user ID
    pub nam: String, // username
    pub iat: i64,    // issued at (unix timestamp)
}
