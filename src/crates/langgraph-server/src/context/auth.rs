//! Token verification is an external collaborator in spec terms — a real
//! deployment sits behind an IdP this server never talks to directly. What
//! lives here is the seam: [`AuthVerifier`], a permissive default that
//! trusts whatever caller id is presented, and a shared-secret HMAC
//! implementation for deployments that want a real check without standing
//! up an IdP.

use super::RequestContext;
use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;

#[async_trait]
pub trait AuthVerifier: Send + Sync {
    /// Resolve a bearer token into an owner id, or `None` for a caller that
    /// should be treated as anonymous (rejected by the caller's policy, not
    /// here).
    async fn verify(&self, token: &str) -> Option<String>;
}

/// Trusts the bearer token verbatim as the owner id. Fine for local
/// development and for tests; never use against real multi-tenant traffic.
#[derive(Debug, Default)]
pub struct PermissiveVerifier;

#[async_trait]
impl AuthVerifier for PermissiveVerifier {
    async fn verify(&self, token: &str) -> Option<String> {
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }
}

/// Verifies tokens of the form `<owner>.<hex hmac-sha256 of owner>` against
/// a shared secret. No expiry, no claims — a deliberately small step up
/// from [`PermissiveVerifier`] for deployments that want tamper-evidence
/// without standing up a full IdP.
pub struct HmacVerifier {
    secret: Vec<u8>,
}

impl HmacVerifier {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self { secret: secret.into() }
    }

    pub fn sign(&self, owner: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.secret).expect("hmac accepts any key length");
        mac.update(owner.as_bytes());
        let tag = hex::encode(mac.finalize().into_bytes());
        format!("{owner}.{tag}")
    }
}

#[async_trait]
impl AuthVerifier for HmacVerifier {
    async fn verify(&self, token: &str) -> Option<String> {
        let (owner, tag) = token.rsplit_once('.')?;
        let expected = self.sign(owner);
        if expected == token {
            Some(owner.to_string())
        } else {
            let _ = tag;
            None
        }
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Populates [`RequestContext`] from the `Authorization` header and inserts
/// it into the request's extensions for downstream extractors. Requests
/// with no usable token are rejected with 401 rather than silently treated
/// as system — system identity is reserved for internal callers
/// (agent-sync, cron) that never go through HTTP.
pub async fn auth_middleware(
    State(verifier): State<Arc<dyn AuthVerifier>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_bearer(request.headers()).map(str::to_string);
    let owner = match &token {
        Some(t) => verifier.verify(t).await,
        None => None,
    };
    let ctx = match owner {
        Some(owner) => RequestContext::user(owner, token),
        None => return Err(StatusCode::UNAUTHORIZED),
    };
    request.extensions_mut().insert(ctx);
    Ok(next.run(request).await)
}
