use std::net::IpAddr;

use poem::Request;

use crate::errors::{InternalError, internal::AuthenticationError};

use super::{principal::Principal, request_id::RequestId, request_source::RequestSource};

/// Request context that flows through all layers
///
/// Carries the request id for log correlation and, once authenticated, the
/// principal whose role and code drive permission and visibility checks.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    /// IP address of the client making the request
    pub ip_address: Option<IpAddr>,

    /// Unique identifier for this request (for tracing across layers)
    pub request_id: RequestId,

    /// Source of the request (API or CLI)
    pub source: RequestSource,

    /// Authenticated user, if any
    pub principal: Option<Principal>,
}

impl RequestContext {
    /// Create an unauthenticated context for an API request
    pub fn from_request(req: &Request) -> Self {
        Self {
            ip_address: Self::extract_ip_address(req),
            request_id: RequestId::new(),
            source: RequestSource::API,
            principal: None,
        }
    }

    /// Create a RequestContext for CLI operations
    ///
    /// # Arguments
    /// * `command_name` - Name of the CLI command being executed
    pub fn for_cli(command_name: &str) -> Self {
        tracing::debug!("CLI context created for {}", command_name);
        Self {
            ip_address: None,
            request_id: RequestId::new(),
            source: RequestSource::CLI,
            principal: None,
        }
    }

    /// Extract IP address from request headers
    ///
    /// Checks X-Forwarded-For, X-Real-IP, and falls back to remote address.
    fn extract_ip_address(req: &Request) -> Option<IpAddr> {
        // Proxy/load balancer
        if let Some(forwarded) = req.header("X-Forwarded-For") {
            if let Some(ip) = forwarded.split(',').next() {
                return ip.trim().parse().ok();
            }
        }

        // nginx
        if let Some(real_ip) = req.header("X-Real-IP") {
            return real_ip.parse().ok();
        }

        req.remote_addr().as_socket_addr().map(|addr| addr.ip())
    }

    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    /// The authenticated principal, or an authentication failure
    pub fn require_principal(&self) -> Result<&Principal, InternalError> {
        self.principal
            .as_ref()
            .ok_or(InternalError::Authentication(AuthenticationError::MissingToken))
    }
}
