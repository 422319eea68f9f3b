//! walldl - wallpaper downloading, filtering, and skip-list management.
//!
//! This library fetches candidate image URLs from a paginated listing API,
//! downloads them concurrently with retry logic under a bounded worker pool,
//! and purges the local collection by resolution and border-color quality
//! heuristics. A durable skip-list keeps known-bad files from ever being
//! downloaded again.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use walldl::{DownloadConfig, Downloader, ListingClient, PurgeConfig, SkipList, purge};
//!
//! # async fn example() -> walldl::Result<()> {
//! let folder = Path::new("/home/me/Downloads/Wallpapers/sfw");
//! let mut skip_list = SkipList::open(&folder.join(".blacklist.csv"))?;
//!
//! // Collect candidate URLs from the listing API
//! let listing = ListingClient::new()?;
//! let urls = listing.fetch_urls("wallpaper", 200).await;
//!
//! // Download under a bounded worker pool, skipping blacklisted and cached files
//! let downloader = Downloader::new(DownloadConfig::default())?;
//! let stats = downloader.download_images(&urls, folder, &skip_list, None).await?;
//! println!("Downloaded {} files", stats.downloaded);
//!
//! // Blacklist and remove anything below the width threshold
//! purge::purge_small_images(folder, &mut skip_list, &PurgeConfig::default())?;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod analysis;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fetch;
pub mod listing;
pub mod purge;
pub mod skiplist;
pub mod url;

// Re-export main types for convenience
pub use config::{AppConfig, Channel, DownloadConfig, PathConfig, PurgeConfig};
pub use download::{
    DownloadOutcome, DownloadStats, DownloadTask, Downloader, FilteredUrls, SkipCause,
    filter_new_urls,
};
pub use error::{Error, Result};
pub use fetch::{Fetcher, HttpFetcher, fetch_with_retry};
pub use listing::ListingClient;
pub use skiplist::{SkipEntry, SkipList, SkipReason};
pub use url::filename_from_url;
