use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use time::OffsetDateTime;
use tracing::{debug, warn};

use super::claims::Claims;
use crate::{config::JwtConfig, state::AppState, users::User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token signature does not match")]
    InvalidSignature,
    #[error("token could not be decoded")]
    InvalidToken,
    #[error("token is older than the allowed age")]
    TokenExpired,
}

/// Signing and verification keys built once from the process secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    max_age_months: i32,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl JwtKeys {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            max_age_months: config.max_age_months,
        }
    }

    pub fn sign(&self, user: &User) -> anyhow::Result<String> {
        self.sign_at(user, OffsetDateTime::now_utc())
    }

    pub fn sign_at(&self, user: &User, now: OffsetDateTime) -> anyhow::Result<String> {
        let claims = Claims {
            iss: self.issuer.clone(),
            sub: user.user_id.clone(),
            nam: user.username.clone(),
            iat: now.unix_timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(user_id = %user.user_id, "jwt signed");
        Ok(token)
    }

    /// Verify a token and return its subject.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        self.verify_at(token, OffsetDateTime::now_utc())
    }

    pub fn verify_at(&self, token: &str, now: OffsetDateTime) -> Result<String, TokenError> {
        let claims = self.decode_claims(token)?;

        let issued = OffsetDateTime::from_unix_timestamp(claims.iat).map_err(|e| {
            warn!(error = %e, "jwt iat out of range");
            TokenError::InvalidToken
        })?;
        let age = months_between(issued, now);
        if age > self.max_age_months {
            warn!(user_id = %claims.sub, age_months = age, "jwt expired");
            return Err(TokenError::TokenExpired);
        }

        debug!(user_id = %claims.sub, "jwt verified");
        Ok(claims.sub)
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["sub", "iss"]);
        validation.set_issuer(std::slice::from_ref(&self.issuer));

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => {
                    warn!("jwt signature mismatch");
                    TokenError::InvalidSignature
                }
                kind => {
                    warn!(error = ?kind, "jwt rejected");
                    TokenError::InvalidToken
                }
            })
    }
}

/// Whole calendar months from `from` to `to`, by UTC year and month only.
pub fn months_between(from: OffsetDateTime, to: OffsetDateTime) -> i32 {
    let from = from.to_offset(time::UtcOffset::UTC);
    let to = to.to_offset(time::UtcOffset::UTC);
    (to.year() - from.year()) * 12 + (u8::from(to.month()) as i32 - u8::from(from.month()) as i32)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::config::{DEFAULT_ISSUER, DEFAULT_MAX_AGE_MONTHS};

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            issuer: DEFAULT_ISSUER.into(),
            max_age_months: DEFAULT_MAX_AGE_MONTHS,
        })
    }

    fn al() -> User {
        User {
            user_id: "u1".into(),
            username: "al".into(),
            hashed_password: "p".into(),
            email: "a@x.com".into(),
        }
    }

    #[test]
    fn sign_and_verify_returns_subject() {
        let keys = make_keys("dev-secret");
        let token = keys.sign(&al()).expect("sign");
        assert_eq!(keys.verify(&token), Ok("u1".to_string()));
    }

    #[test]
    fn token_carries_expected_claims() {
        let keys = make_keys("dev-secret");
        let issued = datetime!(2024-03-10 08:00 UTC);
        let token = keys.sign_at(&al(), issued).expect("sign");

        let claims = keys.decode_claims(&token).expect("decode");
        assert_eq!(
            claims,
            Claims {
                iss: DEFAULT_ISSUER.into(),
                sub: "u1".into(),
                nam: "al".into(),
                iat: issued.unix_timestamp(),
            }
        );
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let keys = make_keys("dev-secret");
        let token = keys.sign(&al()).expect("sign");

        let (unsigned, signature) = token.rsplit_once('.').unwrap();
        let mut sig: Vec<char> = signature.chars().collect();
        let mid = sig.len() / 2;
        sig[mid] = if sig[mid] == 'A' { 'B' } else { 'A' };
        let tampered = format!("{unsigned}.{}", sig.into_iter().collect::<String>());

        assert_eq!(keys.verify(&tampered), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = make_keys("other-secret").sign(&al()).expect("sign");
        assert_eq!(
            make_keys("dev-secret").verify(&token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn garbage_is_invalid_token() {
        let keys = make_keys("dev-secret");
        assert_eq!(keys.verify("not-a-jwt"), Err(TokenError::InvalidToken));
        assert_eq!(keys.verify(""), Err(TokenError::InvalidToken));
    }

    #[test]
    fn wrong_algorithm_is_invalid_token() {
        let claims = Claims {
            iss: DEFAULT_ISSUER.into(),
            sub: "u1".into(),
            nam: "al".into(),
            iat: OffsetDateTime::now_utc().unix_timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"dev-secret"),
        )
        .unwrap();
        assert_eq!(
            make_keys("dev-secret").verify(&token),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn missing_claims_are_invalid_token() {
        let token = encode(
            &Header::new(Algorithm::HS256),
            &serde_json::json!({ "iss": DEFAULT_ISSUER, "sub": "u1" }),
            &EncodingKey::from_secret(b"dev-secret"),
        )
        .unwrap();
        assert_eq!(
            make_keys("dev-secret").verify(&token),
            Err(TokenError::InvalidToken)
        );
    }

    fn sign_raw(payload: serde_json::Value) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(b"dev-secret"),
        )
        .unwrap()
    }

    #[test]
    fn missing_name_alone_is_invalid_token() {
        let token = sign_raw(serde_json::json!({ "iss": DEFAULT_ISSUER, "sub": "u1", "iat": 0 }));
        assert_eq!(
            make_keys("dev-secret").verify(&token),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn mistyped_iat_is_invalid_token() {
        let token = sign_raw(serde_json::json!({
            "iss": DEFAULT_ISSUER, "sub": "u1", "nam": "al", "iat": "x"
        }));
        assert_eq!(
            make_keys("dev-secret").verify(&token),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn out_of_range_iat_is_invalid_token() {
        let token = sign_raw(serde_json::json!({
            "iss": DEFAULT_ISSUER, "sub": "u1", "nam": "al", "iat": i64::MAX
        }));
        assert_eq!(
            make_keys("dev-secret").verify(&token),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn wrong_issuer_is_invalid_token() {
        let other = JwtKeys::new(&JwtConfig {
            secret: "dev-secret".into(),
            issuer: "someone else".into(),
            max_age_months: DEFAULT_MAX_AGE_MONTHS,
        });
        let token = other.sign(&al()).expect("sign");
        assert_eq!(
            make_keys("dev-secret").verify(&token),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn seven_months_old_token_is_expired() {
        let keys = make_keys("dev-secret");
        let token = keys
            .sign_at(&al(), datetime!(2024-01-15 12:00 UTC))
            .expect("sign");
        assert_eq!(
            keys.verify_at(&token, datetime!(2024-08-15 12:00 UTC)),
            Err(TokenError::TokenExpired)
        );
    }

    #[test]
    fn five_and_six_months_old_tokens_are_accepted() {
        let keys = make_keys("dev-secret");
        let token = keys
            .sign_at(&al(), datetime!(2024-01-15 12:00 UTC))
            .expect("sign");
        assert!(keys.verify_at(&token, datetime!(2024-06-15 12:00 UTC)).is_ok());
        assert!(keys.verify_at(&token, datetime!(2024-07-31 23:59 UTC)).is_ok());
    }

    #[test]
    fn month_difference_ignores_days() {
        assert_eq!(
            months_between(datetime!(2023-12-31 23:00 UTC), datetime!(2024-01-01 00:00 UTC)),
            1
        );
        assert_eq!(
            months_between(datetime!(2024-01-01 00:00 UTC), datetime!(2024-01-31 23:00 UTC)),
            0
        );
        assert_eq!(
            months_between(datetime!(2023-06-30 00:00 UTC), datetime!(2024-01-01 00:00 UTC)),
            7
        );
    }
}
