//! Remote collaborator calls.
//!
//! Graph and issue-tracker updates go through a [`RemoteExecutor`]. The
//! shipped implementation, [`SimulatedExecutor`], checks whether its service
//! looks reachable, logs the call, and answers with a fixed success payload.
//! Nothing is sent over the wire.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use serde_json::{Map, Value, json};
use tracing::{debug, error, info, warn};

/// Why a remote call was not delivered.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The target service is not reachable or not configured.
    #[error("{service} not available")]
    Unavailable { service: String },

    /// The call could not be prepared or was rejected.
    #[error("remote call failed: {0}")]
    Failed(String),
}

impl From<RemoteError> for codecache_shared::CodeCacheError {
    fn from(err: RemoteError) -> Self {
        Self::Remote(err.to_string())
    }
}

/// Executes a named tool call against a remote collaborator.
pub trait RemoteExecutor {
    fn execute(&self, tool: &str, params: Value) -> Result<Value, RemoteError>;
}

impl<E: RemoteExecutor + ?Sized> RemoteExecutor for &E {
    fn execute(&self, tool: &str, params: Value) -> Result<Value, RemoteError> {
        (**self).execute(tool, params)
    }
}

/// Execute `tool` and report whether it was delivered.
///
/// Every failure degrades to a skipped call: unavailable services are logged
/// as warnings, other failures as errors.
pub fn deliver(executor: &dyn RemoteExecutor, tool: &str, params: Value) -> bool {
    match executor.execute(tool, params) {
        Ok(response) => {
            debug!(tool, %response, "remote call answered");
            true
        }
        Err(RemoteError::Unavailable { service }) => {
            warn!(tool, service = %service, "service not available, skipping remote call");
            false
        }
        Err(RemoteError::Failed(reason)) => {
            error!(tool, reason = %reason, "remote call failed");
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

/// How a [`SimulatedExecutor`] decides whether its service is reachable.
#[derive(Debug, Clone)]
pub enum Availability {
    Always,
    Never,
    /// Reachable when a TCP connection to `addr` succeeds within `timeout`.
    Tcp { addr: String, timeout: Duration },
    /// Reachable when a token and both repository coordinates are known.
    Credentials {
        token: Option<String>,
        owner: Option<String>,
        repo: Option<String>,
    },
}

impl Availability {
    pub fn check(&self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Tcp { addr, timeout } => probe_tcp(addr, *timeout),
            Self::Credentials { token, owner, repo } => {
                token.as_deref().is_some_and(|t| !t.is_empty()) && owner.is_some() && repo.is_some()
            }
        }
    }
}

fn probe_tcp(addr: &str, timeout: Duration) -> bool {
    let addrs = match addr.to_socket_addrs() {
        Ok(addrs) => addrs,
        Err(e) => {
            debug!(addr, error = %e, "could not resolve probe address");
            return false;
        }
    };

    for sock in addrs {
        if TcpStream::connect_timeout(&sock, timeout).is_ok() {
            return true;
        }
    }
    false
}

// ---------------------------------------------------------------------------
// SimulatedExecutor
// ---------------------------------------------------------------------------

/// Logs calls instead of sending them.
#[derive(Debug, Clone)]
pub struct SimulatedExecutor {
    service: String,
    availability: Availability,
    extra_params: Map<String, Value>,
}

impl SimulatedExecutor {
    pub fn new(service: impl Into<String>, availability: Availability) -> Self {
        Self {
            service: service.into(),
            availability,
            extra_params: Map::new(),
        }
    }

    /// Merge `key = value` into every call's parameters.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra_params.insert(key.into(), value.into());
        self
    }
}

impl RemoteExecutor for SimulatedExecutor {
    fn execute(&self, tool: &str, params: Value) -> Result<Value, RemoteError> {
        if !self.availability.check() {
            return Err(RemoteError::Unavailable {
                service: self.service.clone(),
            });
        }

        let Value::Object(mut params) = params else {
            return Err(RemoteError::Failed(format!(
                "parameters for {tool} must be a JSON object"
            )));
        };
        for (key, value) in &self.extra_params {
            params.insert(key.clone(), value.clone());
        }

        let rendered =
            serde_json::to_string(&params).map_err(|e| RemoteError::Failed(e.to_string()))?;
        info!(service = %self.service, tool, params = %rendered, "remote call");

        Ok(json!({ "status": "success", "tool": tool }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_service_is_refused() {
        let exec = SimulatedExecutor::new("graph", Availability::Never);
        let err = exec.execute("mcp__memory__create_entities", json!({})).unwrap_err();
        assert!(matches!(err, RemoteError::Unavailable { .. }));
        assert_eq!(err.to_string(), "graph not available");
    }

    #[test]
    fn converts_into_shared_error() {
        let err: codecache_shared::CodeCacheError = RemoteError::Failed("rejected".into()).into();
        assert_eq!(err.to_string(), "remote call error: remote call failed: rejected");
    }

    #[test]
    fn available_service_answers_success() {
        let exec = SimulatedExecutor::new("graph", Availability::Always);
        let response = exec
            .execute("mcp__memory__create_entities", json!({"entities": []}))
            .unwrap();
        assert_eq!(response["status"], "success");
        assert_eq!(response["tool"], "mcp__memory__create_entities");
    }

    #[test]
    fn non_object_params_fail() {
        let exec = SimulatedExecutor::new("graph", Availability::Always);
        let err = exec.execute("tool", json!([1, 2])).unwrap_err();
        assert!(matches!(err, RemoteError::Failed(_)));
    }

    #[test]
    fn deliver_degrades_on_every_error() {
        let down = SimulatedExecutor::new("graph", Availability::Never);
        assert!(!deliver(&down, "tool", json!({})));

        let up = SimulatedExecutor::new("graph", Availability::Always);
        assert!(!deliver(&up, "tool", json!("scalar")));
        assert!(deliver(&up, "tool", json!({})));
    }

    #[test]
    fn credentials_need_token_owner_and_repo() {
        let full = Availability::Credentials {
            token: Some("ghp_x".into()),
            owner: Some("acme".into()),
            repo: Some("api".into()),
        };
        assert!(full.check());

        let empty_token = Availability::Credentials {
            token: Some(String::new()),
            owner: Some("acme".into()),
            repo: Some("api".into()),
        };
        assert!(!empty_token.check());

        let no_repo = Availability::Credentials {
            token: Some("ghp_x".into()),
            owner: Some("acme".into()),
            repo: None,
        };
        assert!(!no_repo.check());
    }

    #[test]
    fn tcp_probe_against_local_listener() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr").to_string();

        let reachable = Availability::Tcp {
            addr,
            timeout: Duration::from_millis(500),
        };
        assert!(reachable.check());

        let unresolvable = Availability::Tcp {
            addr: "not a socket address".into(),
            timeout: Duration::from_millis(50),
        };
        assert!(!unresolvable.check());
    }
}
