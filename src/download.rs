//! Concurrent download manager: filter, cap, fan out, write.

use std::path::Path;

use tokio::sync::Semaphore;

use crate::config::DownloadConfig;
use crate::error::Result;
use crate::fetch::{Fetcher, HttpFetcher, fetch_with_retry};
use crate::skiplist::SkipList;
use crate::url::filename_from_url;

/// One planned download: a URL and the filename derived from it.
///
/// Ephemeral — created per URL for the duration of one download attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// Source URL.
    pub url: String,
    /// Local filename, derived deterministically from the URL.
    pub target_filename: String,
}

/// Why a URL was dropped by the filter pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipCause {
    /// Target filename is in the skip-list store.
    Blacklisted,
    /// Target file already exists on disk.
    Cached,
}

/// Per-task result, consumed immediately to decide file write vs
/// log-and-drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Body fetched and written; holds the byte count.
    Success(usize),
    /// Dropped before any network activity.
    Skipped(SkipCause),
    /// Retry ceiling exhausted, or the disk write failed.
    Failed,
}

/// Result of the filter pass over candidate URLs.
#[derive(Debug, Default)]
pub struct FilteredUrls {
    /// URLs that are neither blacklisted nor already on disk, input order
    /// preserved.
    pub tasks: Vec<DownloadTask>,
    /// Filenames dropped by the filter, with the cause.
    pub skipped: Vec<(String, SkipCause)>,
}

impl FilteredUrls {
    /// Returns `true` if nothing survived the filter.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of URLs dropped for the given cause.
    #[must_use]
    pub fn skipped_count(&self, cause: SkipCause) -> usize {
        self.skipped.iter().filter(|(_, c)| *c == cause).count()
    }
}

/// Counts for one download run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DownloadStats {
    /// Tasks launched after filtering and capping.
    pub attempted: usize,
    /// Files fetched and written.
    pub downloaded: usize,
    /// URLs dropped by the blacklist filter.
    pub skipped_blacklisted: usize,
    /// URLs dropped by the local-presence filter.
    pub skipped_cached: usize,
    /// Tasks that exhausted their retries or failed to write.
    pub failed: usize,
}

/// Filters candidate URLs down to tasks that are neither blacklisted nor
/// already present in `target_dir`.
///
/// Runs synchronously to completion before any download launches, so the
/// whole batch sees one consistent snapshot of the directory and the
/// skip-list at start time.
#[must_use]
pub fn filter_new_urls(urls: &[String], target_dir: &Path, skip_list: &SkipList) -> FilteredUrls {
    let mut filtered = FilteredUrls::default();

    for url in urls {
        let filename = filename_from_url(url);
        if skip_list.is_blacklisted(&filename) {
            log::info!("Skipping blacklisted: {filename}");
            filtered.skipped.push((filename, SkipCause::Blacklisted));
            continue;
        }
        if target_dir.join(&filename).exists() {
            log::info!("Already downloaded: {filename}");
            filtered.skipped.push((filename, SkipCause::Cached));
            continue;
        }
        filtered.tasks.push(DownloadTask {
            url: url.clone(),
            target_filename: filename,
        });
    }

    filtered
}

/// Core download manager: fans a URL sequence out over a bounded worker
/// pool, applying the skip-list and local-presence filters first.
pub struct Downloader<F: Fetcher = HttpFetcher> {
    fetcher: F,
    config: DownloadConfig,
}

impl Downloader<HttpFetcher> {
    /// Creates a downloader with the default HTTP fetcher.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: DownloadConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self { fetcher, config })
    }
}

impl<F: Fetcher> Downloader<F> {
    /// Creates a downloader with a custom fetcher implementation.
    #[must_use]
    pub const fn with_fetcher(fetcher: F, config: DownloadConfig) -> Self {
        Self { fetcher, config }
    }

    /// Returns a reference to the underlying fetcher.
    #[must_use]
    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Returns a reference to the download configuration.
    #[must_use]
    pub const fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Downloads images from `urls` into `target_dir`, producing at most one
    /// local file per URL.
    ///
    /// Blacklisted and already-present URLs are dropped first; if `max_new`
    /// is set, the surviving tasks are truncated to the first `max_new` in
    /// input order. When nothing survives, the function returns without
    /// touching the directory or the network. Otherwise the target directory
    /// is created and tasks run under a counting semaphore of
    /// `config.max_concurrent` permits — the moment a slot frees, the next
    /// task starts. Failure of one task never aborts or blocks siblings; the
    /// call completes only after every launched task has terminated.
    ///
    /// # Errors
    ///
    /// Returns an error only when the target directory cannot be created.
    /// Per-item failures are soft: logged and counted in the returned stats.
    pub async fn download_images(
        &self,
        urls: &[String],
        target_dir: &Path,
        skip_list: &SkipList,
        max_new: Option<usize>,
    ) -> Result<DownloadStats> {
        let mut filtered = filter_new_urls(urls, target_dir, skip_list);

        if let Some(cap) = max_new
            && filtered.tasks.len() > cap
        {
            log::info!(
                "Limiting to {cap} new downloads from {} available",
                filtered.tasks.len()
            );
            filtered.tasks.truncate(cap);
        }

        let mut outcomes: Vec<DownloadOutcome> = filtered
            .skipped
            .iter()
            .map(|(_, cause)| DownloadOutcome::Skipped(*cause))
            .collect();

        if filtered.is_empty() {
            log::info!("No new images to download");
        } else {
            tokio::fs::create_dir_all(target_dir).await?;

            let semaphore = Semaphore::new(self.config.max_concurrent);
            outcomes.extend(
                futures::future::join_all(filtered.tasks.iter().map(|task| {
                    let semaphore = &semaphore;
                    async move {
                        let _permit = semaphore
                            .acquire()
                            .await
                            .expect("semaphore is never closed");
                        self.download_one(task, target_dir).await
                    }
                }))
                .await,
            );
        }

        let mut stats = DownloadStats {
            attempted: filtered.tasks.len(),
            ..DownloadStats::default()
        };
        for outcome in outcomes {
            match outcome {
                DownloadOutcome::Success(_) => stats.downloaded += 1,
                DownloadOutcome::Failed => stats.failed += 1,
                DownloadOutcome::Skipped(SkipCause::Blacklisted) => stats.skipped_blacklisted += 1,
                DownloadOutcome::Skipped(SkipCause::Cached) => stats.skipped_cached += 1,
            }
        }
        Ok(stats)
    }

    /// Fetches one task with retry and writes the body to `target_dir`.
    ///
    /// Per-item errors are folded into the outcome and surfaced only via
    /// logging.
    async fn download_one(&self, task: &DownloadTask, target_dir: &Path) -> DownloadOutcome {
        let Some(bytes) = fetch_with_retry(&self.fetcher, &task.url, &self.config).await else {
            return DownloadOutcome::Failed;
        };

        let path = target_dir.join(&task.target_filename);
        match tokio::fs::write(&path, &bytes).await {
            Ok(()) => {
                log::info!("Downloaded: {}", task.url);
                DownloadOutcome::Success(bytes.len())
            }
            Err(e) => {
                log::error!("Failed to save {}: {e}", task.url);
                DownloadOutcome::Failed
            }
        }
    }
}
