//! Authenticated HTTP session against the cloud API

use std::sync::OnceLock;
use std::time::Duration;

use tracing::debug;

pub const DEFAULT_HOST: &str = "https://api.xplainable.io";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(300);
const WRITE_TIMEOUT: Duration = Duration::from_secs(300);

/// Shared agent so every session reuses one connection pool
fn agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        ureq::AgentBuilder::new()
            .timeout_connect(CONNECT_TIMEOUT)
            .timeout_read(READ_TIMEOUT)
            .timeout_write(WRITE_TIMEOUT)
            .build()
    })
}

/// Host, credentials and the machine requests are pinned to
///
/// Cheap to clone; clones share the underlying connection pool, so a clone
/// can be moved onto a worker thread for the connectivity probe.
#[derive(Clone, Debug)]
pub struct CloudSession {
    host: String,
    api_key: String,
    machine_id: Option<String>,
}

impl CloudSession {
    pub fn new(host: impl Into<String>, api_key: impl Into<String>) -> Self {
        let host: String = host.into();
        Self {
            host: host.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            machine_id: None,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn machine_id(&self) -> Option<&str> {
        self.machine_id.as_deref()
    }

    /// Pin subsequent requests to a machine
    pub fn set_machine(&mut self, machine_id: impl Into<String>) {
        let machine_id = machine_id.into();
        debug!(machine_id = %machine_id, "session machine changed");
        self.machine_id = Some(machine_id);
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.host, path.trim_start_matches('/'))
    }

    pub(crate) fn get(&self, path: &str) -> ureq::Request {
        self.authorize(agent().get(&self.url(path)))
    }

    /// GET against an absolute URL, for probing hosts other than our own
    pub(crate) fn get_url(&self, url: &str) -> ureq::Request {
        self.authorize(agent().get(url))
    }

    pub(crate) fn post(&self, path: &str) -> ureq::Request {
        self.authorize(agent().post(&self.url(path)))
    }

    fn authorize(&self, request: ureq::Request) -> ureq::Request {
        let request = request.set("api_key", &self.api_key);
        match &self.machine_id {
            Some(machine_id) => request.query("machine_id", machine_id),
            None => request,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let session = CloudSession::new("https://example.test/", "key");
        assert_eq!(session.host(), "https://example.test");
        assert_eq!(session.url("/v1/models"), "https://example.test/v1/models");
        assert_eq!(session.url("v1/ping"), "https://example.test/v1/ping");
    }

    #[test]
    fn test_set_machine() {
        let mut session = CloudSession::new("https://example.test", "key");
        assert!(session.machine_id().is_none());
        session.set_machine("m-42");
        assert_eq!(session.machine_id(), Some("m-42"));
    }
}
