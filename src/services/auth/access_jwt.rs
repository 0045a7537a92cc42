use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::{error::Error as StdError, fmt};
use uuid::Uuid;

// Errors returned by access-token verification + strict claim validation.
#[derive(Debug)]
pub enum AccessJwtError {
    Jwt(jsonwebtoken::errors::Error),
    MissingOrInvalidAud,
    EmptyClaim(&'static str),
    InvalidSubUuid,
}

impl fmt::Display for AccessJwtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jwt(e) => write!(f, "jwt verification failed: {}", e),
            Self::MissingOrInvalidAud => write!(f, "missing or invalid 'aud' claim"),
            Self::EmptyClaim(name) => write!(f, "empty '{}' claim", name),
            Self::InvalidSubUuid => write!(f, "invalid 'sub' (expected UUID)"),
        }
    }
}

impl StdError for AccessJwtError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Jwt(e) => Some(e),
            _ => None,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AccessJwtError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::Jwt(e)
    }
}

fn aud_is_present_and_valid(aud: &serde_json::Value) -> bool {
    match aud {
        // Typical: aud is a string
        serde_json::Value::String(s) => !s.trim().is_empty(),
        // Also valid: aud is an array of strings
        serde_json::Value::Array(arr) => arr.iter().any(|v| match v {
            serde_json::Value::String(s) => !s.trim().is_empty(),
            _ => false,
        }),
        // Missing claim ends up as Null due to #[serde(default)]
        _ => false,
    }
}

/// Access token (JWT) claims.
///
/// NOTE:
/// - `aud` in JWT can be either string or array; jsonwebtoken validates it via
///   `Validation::set_audience`, we only re-check presence here.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenClaims {
    pub iss: String,
    #[serde(default)]
    pub aud: serde_json::Value,

    pub sub: String,
    pub exp: u64,

    #[serde(default)]
    pub nbf: Option<u64>,
    #[serde(default)]
    pub iat: Option<u64>,
}

/// 検証済み・アプリ側で使う型
///
/// - `sub` はプロジェクト規約として UUID なので、ここで `Uuid` に昇格させる
/// - `iss/aud/exp` の整合性は `verify_verified` の中で保証される前提
#[derive(Debug, Clone)]
pub struct VerifiedAccessToken {
    pub user_id: Uuid,
}

/// EdDSA (Ed25519) access-token verifier.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct AuthService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("AuthService")
            .field("validation", &self.validation)
            .finish()
    }
}

impl AuthService {
    pub fn new(
        access_public_key_pem: &str,
        issuer: &str,
        audience: &str,
        leeway_seconds: u64,
    ) -> Result<Self, String> {
        let decoding_key = DecodingKey::from_ed_pem(access_public_key_pem.as_bytes())
            .map_err(|e| format!("invalid ed25519 public key pem: {}", e))?;

        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.leeway = leeway_seconds;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    // Signature / iss / aud / exp checks (jsonwebtoken side).
    fn verify(&self, token: &str) -> Result<AccessTokenClaims, jsonwebtoken::errors::Error> {
        let data =
            jsonwebtoken::decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)?;

        Ok(data.claims)
    }

    /// Verify + strict claim validation, then convert claims into the
    /// application-facing type. Recommended entry point for the middleware.
    ///
    /// `jsonwebtoken::Validation` already checks signature, `exp`, `iss` and
    /// `aud`. This method additionally checks that the required claims are
    /// present *and not empty*, and that `sub` is a UUID.
    pub fn verify_verified(&self, token: &str) -> Result<VerifiedAccessToken, AccessJwtError> {
        let claims = self.verify(token)?;

        if claims.iss.trim().is_empty() {
            return Err(AccessJwtError::EmptyClaim("iss"));
        }
        if claims.sub.trim().is_empty() {
            return Err(AccessJwtError::EmptyClaim("sub"));
        }
        if claims.exp == 0 {
            return Err(AccessJwtError::EmptyClaim("exp"));
        }
        if !aud_is_present_and_valid(&claims.aud) {
            return Err(AccessJwtError::MissingOrInvalidAud);
        }

        // Project convention: subject is a UUID
        let user_id =
            Uuid::parse_str(&claims.sub).map_err(|_| AccessJwtError::InvalidSubUuid)?;

        Ok(VerifiedAccessToken { user_id })
    }
}
