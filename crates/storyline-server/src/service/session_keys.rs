//! Shared-secret keys for HS256 session tokens.

use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::TRACING_TARGET_SERVICE;
use crate::service::{ServiceError, ServiceResult, SessionConfig};

/// Minimum secret length, in bytes.
const MIN_SECRET_LEN: usize = 32;

/// Encoding and decoding keys derived from one secret.
///
/// Cheap to clone. `Debug` never prints key material.
#[derive(Clone)]
pub struct SessionKeys {
    inner: Arc<SessionKeysInner>,
}

struct SessionKeysInner {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
}

impl SessionKeys {
    /// Derives the keys from a raw secret.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`] if the secret is shorter than 32 bytes.
    pub fn from_secret(secret: impl AsRef<[u8]>) -> ServiceResult<Self> {
        let secret = secret.as_ref();
        if secret.len() < MIN_SECRET_LEN {
            return Err(ServiceError::config(format!(
                "session secret must be at least {MIN_SECRET_LEN} bytes long"
            )));
        }

        let inner = SessionKeysInner {
            decoding_key: DecodingKey::from_secret(secret),
            encoding_key: EncodingKey::from_secret(secret),
        };

        tracing::debug!(target: TRACING_TARGET_SERVICE, "Session keys derived");
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    pub fn from_config(config: &SessionConfig) -> ServiceResult<Self> {
        Self::from_secret(config.session_secret.as_bytes())
    }

    #[inline]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.inner.decoding_key
    }

    #[inline]
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.inner.encoding_key
    }
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_secrets_are_rejected() {
        let error = SessionKeys::from_secret("too-short").unwrap_err();
        assert!(matches!(error, ServiceError::Config(_)));
    }

    #[test]
    fn debug_hides_key_material() {
        let secret = "storyline-session-secret-for-tests";
        let keys = SessionKeys::from_secret(secret).unwrap();
        assert!(!format!("{keys:?}").contains(secret));
    }
}
