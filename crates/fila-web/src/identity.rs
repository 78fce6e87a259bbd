//! Caller identity supplied by the upstream gateway.
//!
//! Login and sessions happen before requests reach this server. The gateway
//! forwards the authenticated tenant and role in headers, and they are taken
//! as given here.

use axum::{extract::FromRequestParts, http::request::Parts};
use fila_core::realtime::Role;
use fila_core::FilaError;

use crate::error::ApiError;

pub const TENANT_HEADER: &str = "x-tenant-id";
pub const ROLE_HEADER: &str = "x-role";

/// Authenticated tenant and role of an HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub tenant_id: String,
    pub role: Role,
}

impl Identity {
    /// Fail with `Forbidden` unless this identity may call tickets.
    pub fn require_caller(&self) -> Result<(), ApiError> {
        if self.role.can_call() {
            Ok(())
        } else {
            Err(FilaError::Forbidden(format!("role '{}' cannot call tickets", self.role)).into())
        }
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let tenant_id = header(TENANT_HEADER)
            .ok_or_else(|| FilaError::Unidentified(format!("missing {} header", TENANT_HEADER)))?
            .to_string();
        let role = match header(ROLE_HEADER) {
            Some(raw) => raw.parse::<Role>()?,
            None => Role::Caller,
        };

        Ok(Self { tenant_id, role })
    }
}
