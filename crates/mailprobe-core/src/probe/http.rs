//! HTTP prober against the getidp endpoint.
//!
//! One GET per check; a 2xx body containing `Neither` means no identity
//! provider knows the address, i.e. it is available. Timeout and a bounded
//! retry for transient failures are handled here, not in the engine.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::config::MailprobeConfig;
use crate::outcome::Outcome;
use crate::retry::{RetryDecision, RetryPolicy};

use super::{ProbeError, Prober};

pub const DEFAULT_ENDPOINT: &str = "https://odc.officeapps.live.com/odc/emailhrd/getidp";

// The service returns misleading answers without a browser-like header set.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/85.0.4183.83 Safari/537.36";

/// Prober over plain HTTP GET. Cheap per call, so it tolerates high
/// concurrency limits.
pub struct HttpProber {
    endpoint: String,
    timeout: Duration,
    connect_timeout: Duration,
    policy: RetryPolicy,
    canary: Option<String>,
    cookie: Option<String>,
}

impl HttpProber {
    pub fn new(cfg: &MailprobeConfig) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(cfg.probe.timeout_secs.max(1)),
            connect_timeout: Duration::from_secs(cfg.probe.connect_timeout_secs.max(1)),
            policy: RetryPolicy::from_config(cfg.retry.as_ref()),
            canary: cfg.probe.canary.clone(),
            cookie: cfg.probe.cookie.clone(),
        }
    }

    /// Override the endpoint (e.g. a local stub in tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn probe_url(&self, identifier: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(identifier.as_bytes()).collect();
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        format!(
            "{}?hm=0&emailAddress={}&_={}",
            self.endpoint, encoded, millis
        )
    }

    /// Classify a 2xx response body.
    fn classify_body(body: &str) -> Outcome {
        if body.contains("Neither") {
            Outcome::Available
        } else {
            Outcome::Taken
        }
    }

    fn perform(&self, identifier: &str) -> Result<Outcome, ProbeError> {
        let url = self.probe_url(identifier);
        let mut body = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(&url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        easy.useragent(USER_AGENT)?;
        // Lets libcurl decode the body so classification sees plain text.
        easy.accept_encoding("gzip, deflate")?;

        let mut list = curl::easy::List::new();
        list.append("Accept: */*")?;
        list.append("Content-Type: application/x-www-form-urlencoded")?;
        list.append("Connection: keep-alive")?;
        if let Some(canary) = &self.canary {
            list.append(&format!("canary: {}", canary))?;
        }
        easy.http_headers(list)?;
        if let Some(cookie) = &self.cookie {
            easy.cookie(cookie)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(ProbeError::Status(code));
        }
        Ok(Self::classify_body(&String::from_utf8_lossy(&body)))
    }
}

impl Prober for HttpProber {
    fn check(&self, identifier: &str) -> Result<Outcome, ProbeError> {
        let mut attempt = 1u32;
        loop {
            match self.perform(identifier) {
                Ok(outcome) => return Ok(outcome),
                Err(err) => match self.policy.decide(attempt, err.kind()) {
                    RetryDecision::NoRetry => return Err(err),
                    RetryDecision::RetryAfter(delay) => {
                        tracing::debug!(
                            identifier,
                            attempt,
                            error = %err,
                            "probe attempt failed, retrying"
                        );
                        std::thread::sleep(delay);
                        attempt += 1;
                    }
                },
            }
        }
    }
}
