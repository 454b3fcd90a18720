use std::fmt::Display;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Transient,
    Permanent,
}

/// Implemented by errors that know whether retrying can help.
pub trait ClassifyError {
    fn class(&self) -> ErrorClass;
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(cfg: &crate::config::Retry) -> Self {
        Self {
            max_attempts: cfg.max_attempts,
            delay: Duration::from_secs(cfg.delay_seconds),
        }
    }
}

/// Runs `op` up to `max_attempts` times with a fixed sleep between transient
/// failures. Permanent failures are returned on first sight without
/// consuming further attempts; once the budget is exhausted the last
/// observed error is returned.
pub fn with_retry<T, E, F>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T, E>
where
    E: ClassifyError + Display,
    F: FnMut() -> Result<T, E>,
{
    let max = policy.max_attempts.max(1);
    let mut attempt = 1u32;
    loop {
        match op() {
            Ok(v) => return Ok(v),
            Err(err) if err.class() == ErrorClass::Permanent => {
                warn!("{label}: permanent failure: {err}");
                return Err(err);
            }
            Err(err) if attempt >= max => {
                warn!("{label}: giving up after {attempt} attempts: {err}");
                return Err(err);
            }
            Err(err) => {
                warn!(
                    "{label}: attempt {attempt}/{max} failed, retrying in {:?}: {err}",
                    policy.delay
                );
                std::thread::sleep(policy.delay);
                attempt += 1;
            }
        }
    }
}

const TRANSIENT_MARKERS: [&str; 5] = ["timeout", "connection", "network", "io error", "read"];

/// Fallback classifier for opaque errors that carry no structured kind:
/// transient-looking failure messages are worth a retry.
pub fn transient_message(msg: &str) -> bool {
    let msg = msg.to_ascii_lowercase();
    TRANSIENT_MARKERS.iter().any(|m| msg.contains(m))
}
