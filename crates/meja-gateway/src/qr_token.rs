//! # Table QR Tokens
//!
//! Each table's QR code carries a token naming the store and the table.
//! Two encodings are accepted:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  token                                                                  │
//! │    │                                                                    │
//! │    ├── HS256 JWT { storeCode, tableNumber [, exp] }   ← tried first     │
//! │    │                                                                    │
//! │    └── base64( nonce[12] || AES-256-GCM(json) )       ← fallback        │
//! │           key = SHA-256(secret)                                         │
//! │                                                                         │
//! │  either way ──► UserSession::dine_in(storeCode, tableNumber)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Printed codes usually carry no expiry, so `exp` is checked only when
//! present.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose, Engine as _};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use meja_core::validation::{validate_store_code, validate_table_number};
use meja_core::UserSession;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{GatewayError, GatewayResult};

const NONCE_LEN: usize = 12;

/// What a table token says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableClaims {
    pub store_code: String,
    pub table_number: String,
    /// Expiration (Unix timestamp).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl TableClaims {
    pub fn new(store_code: impl Into<String>, table_number: impl Into<String>) -> Self {
        TableClaims {
            store_code: store_code.into(),
            table_number: table_number.into(),
            exp: None,
        }
    }
}

/// Issues and verifies table tokens for one shared secret.
pub struct QrTokenVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for QrTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QrTokenVerifier").finish_non_exhaustive()
    }
}

impl QrTokenVerifier {
    pub fn new(secret: &str) -> GatewayResult<Self> {
        if secret.is_empty() {
            return Err(GatewayError::InvalidConfig("QR secret is not set".into()));
        }

        let key = Sha256::digest(secret.as_bytes());
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| GatewayError::Internal(format!("Failed to initialize cipher: {}", e)))?;

        Ok(QrTokenVerifier {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            cipher,
        })
    }

    /// Verifies `token` and returns the dine-in session it grants.
    pub fn verify(&self, token: &str) -> GatewayResult<UserSession> {
        let token = token.trim();
        if token.is_empty() {
            return Err(GatewayError::InvalidToken("empty token".into()));
        }

        let claims = match self.decode_jwt(token) {
            Ok(claims) => claims,
            Err(jwt_error) => {
                debug!(error = %jwt_error, "Not a valid JWT, trying encrypted token");
                self.open(token).map_err(|_| jwt_error)?
            }
        };

        validate_store_code(&claims.store_code)
            .map_err(|e| GatewayError::InvalidToken(e.to_string()))?;
        validate_table_number(&claims.table_number)
            .map_err(|e| GatewayError::InvalidToken(e.to_string()))?;

        debug!(store = %claims.store_code, table = %claims.table_number, "QR token verified");
        Ok(UserSession::dine_in(claims.store_code, claims.table_number))
    }

    /// Signs `claims` as an HS256 JWT.
    pub fn issue(&self, claims: &TableClaims) -> GatewayResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| GatewayError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Encrypts `claims` into the fallback format.
    pub fn seal(&self, claims: &TableClaims) -> GatewayResult<String> {
        let plaintext = serde_json::to_vec(claims)?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_ref())
            .map_err(|e| GatewayError::Internal(format!("Encryption failed: {}", e)))?;

        let mut combined = nonce_bytes.to_vec();
        combined.extend_from_slice(&ciphertext);
        Ok(general_purpose::STANDARD.encode(&combined))
    }

    fn decode_jwt(&self, token: &str) -> GatewayResult<TableClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();

        let data = decode::<TableClaims>(token, &self.decoding_key, &validation)?;
        Ok(data.claims)
    }

    fn open(&self, token: &str) -> GatewayResult<TableClaims> {
        let combined = general_purpose::STANDARD
            .decode(token)
            .or_else(|_| general_purpose::URL_SAFE_NO_PAD.decode(token))
            .or_else(|_| general_purpose::URL_SAFE.decode(token))
            .map_err(|e| GatewayError::InvalidToken(format!("Invalid base64: {}", e)))?;

        if combined.len() <= NONCE_LEN {
            return Err(GatewayError::InvalidToken("Invalid ciphertext format".into()));
        }

        let (nonce, ciphertext) = combined.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| GatewayError::InvalidToken("Decryption failed".into()))?;

        serde_json::from_slice(&plaintext)
            .map_err(|e| GatewayError::InvalidToken(format!("Invalid token payload: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meja_core::OrderType;

    fn verifier() -> QrTokenVerifier {
        QrTokenVerifier::new("table-secret").unwrap()
    }

    #[test]
    fn test_jwt_round_trip() {
        let v = verifier();
        let token = v.issue(&TableClaims::new("JKT-01", "7")).unwrap();

        let session = v.verify(&token).unwrap();
        assert_eq!(session.store_location, "JKT-01");
        assert_eq!(session.table_number, "7");
        assert_eq!(session.order_type, OrderType::DineIn);
    }

    #[test]
    fn test_encrypted_fallback() {
        let v = verifier();
        let token = v.seal(&TableClaims::new("BDG-02", "12")).unwrap();
        assert_ne!(token, v.seal(&TableClaims::new("BDG-02", "12")).unwrap());

        let session = v.verify(&token).unwrap();
        assert_eq!(session.store_location, "BDG-02");
        assert_eq!(session.table_number, "12");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let other = QrTokenVerifier::new("other-secret").unwrap();
        let v = verifier();

        assert!(v.verify(&other.issue(&TableClaims::new("JKT-01", "7")).unwrap()).is_err());
        assert!(v.verify(&other.seal(&TableClaims::new("JKT-01", "7")).unwrap()).is_err());
    }

    #[test]
    fn test_expired_jwt_rejected() {
        let v = verifier();
        let mut claims = TableClaims::new("JKT-01", "7");
        claims.exp = Some(chrono::Utc::now().timestamp() - 3_600);

        let err = v.verify(&v.issue(&claims).unwrap()).unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_garbage_and_bad_claims_rejected() {
        let v = verifier();
        assert!(v.verify("").is_err());
        assert!(v.verify("not-a-token").is_err());
        assert!(v.verify("c2hvcnQ=").is_err());

        let token = v.issue(&TableClaims::new("JKT 01!", "7")).unwrap();
        assert!(matches!(v.verify(&token), Err(GatewayError::InvalidToken(_))));
    }

    #[test]
    fn test_empty_secret_is_config_error() {
        assert!(QrTokenVerifier::new("").unwrap_err().is_config_error());
    }
}
