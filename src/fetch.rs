//! Single-URL fetch with bounded retries and linear backoff.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::DownloadConfig;

/// User agent sent with every image request.
const USER_AGENT: &str = "wallpaper-download";

/// Abstraction over a single HTTP GET attempt, for testability.
///
/// The retry loop lives in [`fetch_with_retry`]; implementations perform
/// exactly one attempt and report any network error, timeout, or non-2xx
/// status as an `Err`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Performs one GET attempt and returns the full response body.
    ///
    /// # Errors
    ///
    /// Returns an error for any network failure, timeout, or non-success
    /// HTTP status.
    async fn fetch(&self, url: &str) -> crate::Result<Bytes>;
}

/// Default fetcher backed by a pooled `reqwest` client.
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Builds a fetcher with connection pooling and the configured
    /// per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &DownloadConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> crate::Result<Bytes> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.bytes().await?)
    }
}

/// Fetches one URL's bytes with up to `config.max_retries` attempts.
///
/// Attempt `i` (starting at 0) is followed by a wait of
/// `base_delay_secs + i` seconds before the next try — linear backoff,
/// deliberately not exponential and not jittered. Success on any attempt
/// returns immediately. Exhausting the ceiling is a per-item soft failure:
/// the terminal failure is logged and `None` returned, never escalated to
/// the caller.
pub async fn fetch_with_retry<F: Fetcher + ?Sized>(
    fetcher: &F,
    url: &str,
    config: &DownloadConfig,
) -> Option<Bytes> {
    for attempt in 0..config.max_retries {
        match fetcher.fetch(url).await {
            Ok(bytes) => return Some(bytes),
            Err(e) => {
                log::warn!("Retry {} for {url}: {e}", attempt + 1);
                if attempt + 1 < config.max_retries {
                    let delay = config.base_delay_secs + u64::from(attempt);
                    tokio::time::sleep(Duration::from_secs(delay)).await;
                }
            }
        }
    }
    log::error!("Failed to download: {url}");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `fail_first` attempts, then succeeds.
    struct FlakyFetcher {
        fail_first: u32,
        attempts: AtomicU32,
    }

    impl FlakyFetcher {
        const fn new(fail_first: u32) -> Self {
            Self {
                fail_first,
                attempts: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl Fetcher for FlakyFetcher {
        async fn fetch(&self, _url: &str) -> crate::Result<Bytes> {
            let n = self.attempts.fetch_add(1, Ordering::SeqCst);
            if n < self.fail_first {
                Err(crate::Error::Io(std::io::Error::other("connection reset")))
            } else {
                Ok(Bytes::from_static(b"imagedata"))
            }
        }
    }

    /// Records the virtual instants at which attempts happen.
    struct TimestampFetcher {
        starts: Mutex<Vec<tokio::time::Instant>>,
    }

    #[async_trait]
    impl Fetcher for TimestampFetcher {
        async fn fetch(&self, _url: &str) -> crate::Result<Bytes> {
            self.starts.lock().unwrap().push(tokio::time::Instant::now());
            Err(crate::Error::Io(std::io::Error::other("boom")))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_attempt_success_returns_immediately() {
        let fetcher = FlakyFetcher::new(0);
        let config = DownloadConfig::default();
        let bytes = fetch_with_retry(&fetcher, "http://x/a.jpg", &config).await;
        assert_eq!(bytes.as_deref(), Some(&b"imagedata"[..]));
        assert_eq!(fetcher.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_are_retried() {
        let fetcher = FlakyFetcher::new(3);
        let config = DownloadConfig::default();
        let bytes = fetch_with_retry(&fetcher, "http://x/a.jpg", &config).await;
        assert!(bytes.is_some());
        assert_eq!(fetcher.attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_failure_exhausts_ceiling_and_returns_none() {
        let fetcher = FlakyFetcher::new(u32::MAX);
        let config = DownloadConfig::default();
        let bytes = fetch_with_retry(&fetcher, "http://x/a.jpg", &config).await;
        assert!(bytes.is_none());
        assert_eq!(fetcher.attempts.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_is_linear() {
        let fetcher = TimestampFetcher {
            starts: Mutex::new(Vec::new()),
        };
        let config = DownloadConfig::default().with_max_retries(4);
        let _ = fetch_with_retry(&fetcher, "http://x/a.jpg", &config).await;

        let starts = fetcher.starts.lock().unwrap();
        assert_eq!(starts.len(), 4);
        // Waits are base + 0, base + 1, base + 2 with base = 1.
        assert_eq!((starts[1] - starts[0]).as_secs(), 1);
        assert_eq!((starts[2] - starts[1]).as_secs(), 2);
        assert_eq!((starts[3] - starts[2]).as_secs(), 3);
    }
}
