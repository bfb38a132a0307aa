//! Server connectivity probe

use tracing::debug;

use super::{CloudError, CloudSession, HealthProbe, ProbeError};

impl HealthProbe for CloudSession {
    /// `Ok(true)` on a 2xx reply, `Ok(false)` on any other status,
    /// `Err` when the host could not be reached at all
    fn probe(&self, host: &str) -> Result<bool, ProbeError> {
        let url = format!("{}/v1/ping", host.trim_end_matches('/'));
        match self.get_url(&url).call() {
            Ok(response) => {
                debug!(status = response.status(), "ping succeeded");
                Ok(true)
            }
            Err(ureq::Error::Status(status, _)) => {
                debug!(status, "ping rejected");
                Ok(false)
            }
            Err(err) => Err(ProbeError(CloudError::from(err))),
        }
    }
}
