use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::models::Participant;
use crate::services::backend::{BackendClient, BackendError};

/// Errors raised while resolving a connecting peer's identity
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("User lookup failed: {0}")]
    Lookup(#[from] BackendError),
}

/// Access-token claims issued by the platform backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Resolves a credential token to a participant identity
///
/// Decodes the backend-issued HS256 token locally, then looks the subject up
/// through the user-lookup collaborator for the display name. Falling back to
/// an anonymous identity when resolution fails is the caller's decision, not
/// this resolver's.
pub struct IdentityResolver {
    decoding_key: DecodingKey,
    validation: Validation,
    backend: Arc<BackendClient>,
}

impl IdentityResolver {
    pub fn new(jwt_secret: &str, backend: Arc<BackendClient>) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            backend,
        }
    }

    /// Decode and validate the token, returning its claims
    pub fn decode_claims(&self, token: &str) -> Result<Claims, IdentityError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    /// Resolve a token to a full participant identity
    pub async fn resolve(&self, token: &str) -> Result<Participant, IdentityError> {
        let claims = self.decode_claims(token)?;
        let user = self.backend.get_user(&claims.sub).await?;
        Ok(Participant::new(user.id.to_string(), user.full_name))
    }
}
