use crate::application_port::{SignError, SignOptions, TokenCodec, VerifyError};
use crate::domain_model::{Claims, SecretKey};
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    #[serde(flatten)]
    claims: Claims,
    iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    jti: Option<String>,
}

fn expiry(
    issued_at: DateTime<Utc>,
    options: &SignOptions,
) -> Result<Option<i64>, SignError> {
    let Some(ttl) = options.expires_in else {
        return Ok(None);
    };
    let ttl = TimeDelta::from_std(ttl).map_err(|e| SignError(e.to_string()))?;
    let exp_dt = issued_at
        .checked_add_signed(ttl)
        .ok_or_else(|| SignError("expiration out of range".to_string()))?;
    Ok(Some(exp_dt.timestamp()))
}

fn encode_token(
    claims: &Claims,
    secret: &SecretKey,
    options: &SignOptions,
    issued_at: DateTime<Utc>,
) -> Result<String, SignError> {
    let payload = TokenClaims {
        claims: claims.clone(),
        iat: issued_at.timestamp(),
        exp: expiry(issued_at, options)?,
        jti: options.token_id.clone(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &payload,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| SignError(e.to_string()))
}

fn decode_token(
    token: &str,
    secret: &SecretKey,
    now: DateTime<Utc>,
) -> Result<TokenClaims, VerifyError> {
    let mut v = Validation::new(Algorithm::HS256);
    // exp is optional and checked below against the caller's clock
    v.required_spec_claims.clear();
    v.validate_exp = false;
    v.validate_aud = false;
    v.leeway = 0;

    let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &v)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => VerifyError::BadSignature,
            ErrorKind::ExpiredSignature => VerifyError::Expired,
            _ => VerifyError::MalformedToken,
        })?;

    if let Some(exp) = data.claims.exp {
        if exp < now.timestamp() {
            return Err(VerifyError::Expired);
        }
    }
    Ok(data.claims)
}

/// HMAC-SHA256 JWT codec.
#[derive(Debug, Default, Clone, Copy)]
pub struct JwtHs256Codec;

impl JwtHs256Codec {
    pub fn new() -> Self {
        JwtHs256Codec
    }
}

impl TokenCodec for JwtHs256Codec {
    fn sign_at(
        &self,
        claims: &Claims,
        secret: &SecretKey,
        options: &SignOptions,
        issued_at: DateTime<Utc>,
    ) -> Result<String, SignError> {
        encode_token(claims, secret, options, issued_at)
    }

    fn verify_at(
        &self,
        token: &str,
        secret: &SecretKey,
        now: DateTime<Utc>,
    ) -> Result<Claims, VerifyError> {
        decode_token(token, secret, now).map(|payload| payload.claims)
    }
}
