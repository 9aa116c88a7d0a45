//! Bearer token verification and the tenant resolver middleware.
//!
//! Tokens are JWTs issued by the identity provider. The signature is always
//! checked against the configured key before any claim is read; the `sub`
//! claim becomes the caller's [`TenantId`].

use std::str::FromStr;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use engine::TenantId;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::Deserialize;
use thiserror::Error;

use crate::{ServerError, server::ServerState};

/// Key material and claim rules of the issuing authority.
#[derive(Clone, Debug, Deserialize)]
pub struct AuthSettings {
    /// `HS256`, `RS256`, `ES256`, `EdDSA`, ...
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    /// Shared secret for the HMAC algorithms.
    pub secret: Option<String>,
    /// PEM encoded public key for the asymmetric algorithms.
    pub public_key_pem: Option<String>,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

fn default_algorithm() -> String {
    "HS256".to_string()
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("unsupported algorithm {0}")]
    UnsupportedAlgorithm(String),
    #[error("missing key material: {0}")]
    MissingKey(&'static str),
    #[error("invalid key: {0}")]
    InvalidKey(jsonwebtoken::errors::Error),
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),
    #[error("token has no subject")]
    MissingSubject,
}

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    sub: String,
}

/// Verifies bearer tokens and extracts the tenant they belong to.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn from_settings(settings: &AuthSettings) -> Result<Self, AuthError> {
        let algorithm = Algorithm::from_str(settings.algorithm.trim())
            .map_err(|_| AuthError::UnsupportedAlgorithm(settings.algorithm.clone()))?;

        let key = match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                let secret = settings
                    .secret
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .ok_or(AuthError::MissingKey("auth.secret"))?;
                DecodingKey::from_secret(secret.as_bytes())
            }
            other => {
                let pem = settings
                    .public_key_pem
                    .as_deref()
                    .ok_or(AuthError::MissingKey("auth.public_key_pem"))?
                    .as_bytes();
                let key = match other {
                    Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(pem),
                    Algorithm::EdDSA => DecodingKey::from_ed_pem(pem),
                    _ => DecodingKey::from_rsa_pem(pem),
                };
                key.map_err(AuthError::InvalidKey)?
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = &settings.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &settings.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Ok(Self { key, validation })
    }

    /// Shared-secret verifier without issuer or audience checks.
    pub fn hs256(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.validate_aud = false;
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<TenantId, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|err| {
            if matches!(err.kind(), ErrorKind::ExpiredSignature) {
                AuthError::Expired
            } else {
                AuthError::InvalidToken(err)
            }
        })?;
        TenantId::new(data.claims.sub).map_err(|_| AuthError::MissingSubject)
    }
}

/// Resolves the tenant of the request or answers 401.
///
/// On success the [`TenantId`] is available to handlers as an `Extension`.
pub(crate) async fn require_tenant(
    State(state): State<ServerState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Ok(TypedHeader(Authorization(bearer))) = bearer else {
        return Err(ServerError::Unauthenticated);
    };

    let tenant = state.verifier.verify(bearer.token()).map_err(|err| {
        tracing::debug!("rejected credential: {err}");
        ServerError::Unauthenticated
    })?;

    request.extensions_mut().insert(tenant);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::Serialize;

    use super::*;

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: &'a str,
        exp: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        iss: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        aud: Option<&'a str>,
    }

    fn token(secret: &str, claims: &TestClaims<'_>) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn in_one_hour() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    fn settings() -> AuthSettings {
        AuthSettings {
            algorithm: "HS256".to_string(),
            secret: Some("s3cret".to_string()),
            public_key_pem: None,
            issuer: None,
            audience: None,
        }
    }

    #[test]
    fn accepts_signed_token_and_reads_subject() {
        let verifier = TokenVerifier::from_settings(&settings()).unwrap();
        let jwt = token(
            "s3cret",
            &TestClaims {
                sub: "tenant-a",
                exp: in_one_hour(),
                iss: None,
                aud: Some("authenticated"),
            },
        );
        assert_eq!(verifier.verify(&jwt).unwrap().as_str(), "tenant-a");
    }

    #[test]
    fn rejects_wrong_signature_expired_and_empty_subject() {
        let verifier = TokenVerifier::hs256("s3cret");

        let forged = token(
            "other",
            &TestClaims {
                sub: "tenant-a",
                exp: in_one_hour(),
                iss: None,
                aud: None,
            },
        );
        assert!(matches!(
            verifier.verify(&forged),
            Err(AuthError::InvalidToken(_))
        ));

        let expired = token(
            "s3cret",
            &TestClaims {
                sub: "tenant-a",
                exp: chrono::Utc::now().timestamp() - 3600,
                iss: None,
                aud: None,
            },
        );
        assert!(matches!(verifier.verify(&expired), Err(AuthError::Expired)));

        let anonymous = token(
            "s3cret",
            &TestClaims {
                sub: "",
                exp: in_one_hour(),
                iss: None,
                aud: None,
            },
        );
        assert!(matches!(
            verifier.verify(&anonymous),
            Err(AuthError::MissingSubject)
        ));

        assert!(verifier.verify("not-a-jwt").is_err());
    }

    #[test]
    fn checks_issuer_and_audience_when_configured() {
        let verifier = TokenVerifier::from_settings(&AuthSettings {
            issuer: Some("https://auth.example.com".to_string()),
            audience: Some("authenticated".to_string()),
            ..settings()
        })
        .unwrap();

        let good = token(
            "s3cret",
            &TestClaims {
                sub: "tenant-a",
                exp: in_one_hour(),
                iss: Some("https://auth.example.com"),
                aud: Some("authenticated"),
            },
        );
        assert!(verifier.verify(&good).is_ok());

        let wrong_issuer = token(
            "s3cret",
            &TestClaims {
                sub: "tenant-a",
                exp: in_one_hour(),
                iss: Some("https://elsewhere.example.com"),
                aud: Some("authenticated"),
            },
        );
        assert!(verifier.verify(&wrong_issuer).is_err());
    }

    #[test]
    fn settings_errors() {
        let missing = AuthSettings {
            secret: None,
            ..settings()
        };
        assert!(matches!(
            TokenVerifier::from_settings(&missing),
            Err(AuthError::MissingKey(_))
        ));

        let unknown = AuthSettings {
            algorithm: "XS999".to_string(),
            ..settings()
        };
        assert!(matches!(
            TokenVerifier::from_settings(&unknown),
            Err(AuthError::UnsupportedAlgorithm(_))
        ));

        let rsa = AuthSettings {
            algorithm: "RS256".to_string(),
            public_key_pem: Some("not a pem".to_string()),
            ..settings()
        };
        assert!(matches!(
            TokenVerifier::from_settings(&rsa),
            Err(AuthError::InvalidKey(_))
        ));
    }
}
