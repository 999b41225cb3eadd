/// ID-token verification
///
/// The add/edit forms submit a bearer ID token alongside the manifest URL.
/// The token is validated against the configured OAuth client credentials:
/// the client secret keys the HS256 signature check and the client id is
/// the required audience. Verification yields the acting user, which is the
/// only identity ever stamped onto a record.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// The verified acting user extracted from an ID token
///
/// Ephemeral: used to stamp a record before saving, never persisted on its
/// own.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    /// The token subject, i.e. the user id
    pub subject: String,
    /// Email claim, when the provider includes one
    pub email: Option<String>,
}

/// The claims this directory reads out of a verified token.
#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
}

/// Token verification failure, surfaced verbatim on the submission form.
#[derive(Debug, Error)]
#[error("token verification failed: {0}")]
pub struct VerifyError(#[from] jsonwebtoken::errors::Error);

/// Verifies ID tokens against the configured client credentials
pub struct IdTokenVerifier {
    client_id: String,
    key: DecodingKey,
}

impl IdTokenVerifier {
    /// Build a verifier from the OAuth client credentials
    pub fn new(client_id: impl Into<String>, client_secret: &str) -> Self {
        Self {
            client_id: client_id.into(),
            key: DecodingKey::from_secret(client_secret.as_bytes()),
        }
    }

    /// Verify an ID token and return the acting user
    ///
    /// Checks signature, expiry, and that the token was minted for this
    /// client (audience must equal the client id).
    pub async fn verify(&self, id_token: &str) -> Result<VerifiedIdentity, VerifyError> {
        let mut validation = Validation::new(ALGORITHM);
        validation.set_audience(&[&self.client_id]);

        let decoded = decode::<Claims>(id_token, &self.key, &validation)?;

        Ok(VerifiedIdentity {
            subject: decoded.claims.sub,
            email: decoded.claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const CLIENT_ID: &str = "test-client";
    const CLIENT_SECRET: &str = "test-secret";

    fn token(aud: &str, secret: &str, exp: i64) -> String {
        let claims = json!({
            "sub": "user-42",
            "aud": aud,
            "email": "user@example.com",
            "exp": exp,
        });
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn fresh_exp() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[tokio::test]
    async fn valid_token_yields_identity() {
        let verifier = IdTokenVerifier::new(CLIENT_ID, CLIENT_SECRET);
        let identity = verifier
            .verify(&token(CLIENT_ID, CLIENT_SECRET, fresh_exp()))
            .await
            .unwrap();
        assert_eq!(identity.subject, "user-42");
        assert_eq!(identity.email.as_deref(), Some("user@example.com"));
    }

    #[tokio::test]
    async fn token_for_another_client_is_rejected() {
        let verifier = IdTokenVerifier::new(CLIENT_ID, CLIENT_SECRET);
        assert!(verifier
            .verify(&token("other-client", CLIENT_SECRET, fresh_exp()))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn wrong_signature_is_rejected() {
        let verifier = IdTokenVerifier::new(CLIENT_ID, CLIENT_SECRET);
        assert!(verifier
            .verify(&token(CLIENT_ID, "wrong-secret", fresh_exp()))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let verifier = IdTokenVerifier::new(CLIENT_ID, CLIENT_SECRET);
        let expired = chrono::Utc::now().timestamp() - 3600;
        assert!(verifier
            .verify(&token(CLIENT_ID, CLIENT_SECRET, expired))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn garbage_is_rejected() {
        let verifier = IdTokenVerifier::new(CLIENT_ID, CLIENT_SECRET);
        assert!(verifier.verify("not-a-token").await.is_err());
    }
}
