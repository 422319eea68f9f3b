//! Command-line interface for walldl.

use crate::config::{AppConfig, Channel};
use crate::download::Downloader;
use crate::listing::ListingClient;
use crate::purge::{purge_boring_images, purge_small_images, visible_files};
use crate::skiplist::{SkipList, SkipReason};

/// Arguments for the `reddit` subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedditArgs {
    /// Subreddit to fetch from.
    pub subreddit: String,
    /// Number of posts to fetch from the listing.
    pub count: usize,
    /// Optional cap on new downloads.
    pub max_new: Option<usize>,
    /// Clear existing wallpapers (and the channel skip-list) first.
    pub clear: bool,
    /// Use the NSFW channel.
    pub nsfw: bool,
    /// Purge images with boring backgrounds after downloading.
    pub filter_boring: bool,
}

impl Default for RedditArgs {
    fn default() -> Self {
        Self {
            subreddit: "wallpaper".to_string(),
            count: 200,
            max_new: None,
            clear: false,
            nsfw: false,
            filter_boring: false,
        }
    }
}

/// Parsed top-level command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch, download, and purge wallpapers from a subreddit.
    Reddit(RedditArgs),
    /// Print the skip-list, most recent first.
    Blacklist { nsfw: bool },
    /// Delete a wallpaper and blacklist it so it never comes back.
    Delete { filename: String, nsfw: bool },
    /// Show usage.
    Help,
}

/// Parses command-line arguments (without the program name).
///
/// # Errors
///
/// Returns a usage message when an option is unknown or a value is missing
/// or malformed.
pub fn parse_args(args: &[String]) -> Result<Command, String> {
    let Some((command, rest)) = args.split_first() else {
        return Ok(Command::Help);
    };

    match command.as_str() {
        "-h" | "--help" => Ok(Command::Help),
        "reddit" => parse_reddit_args(rest).map(Command::Reddit),
        "blacklist" => {
            let mut nsfw = false;
            for arg in rest {
                match arg.as_str() {
                    "--nsfw" => nsfw = true,
                    other => return Err(format!("unknown option for blacklist: {other}")),
                }
            }
            Ok(Command::Blacklist { nsfw })
        }
        "delete" => {
            let mut nsfw = false;
            let mut filename = None;
            for arg in rest {
                match arg.as_str() {
                    "--nsfw" => nsfw = true,
                    other if !other.starts_with('-') && filename.is_none() => {
                        filename = Some(other.to_string());
                    }
                    other => return Err(format!("unknown option for delete: {other}")),
                }
            }
            let filename = filename.ok_or_else(|| "delete requires a filename".to_string())?;
            Ok(Command::Delete { filename, nsfw })
        }
        other => Err(format!("unknown command: {other}")),
    }
}

fn parse_reddit_args(args: &[String]) -> Result<RedditArgs, String> {
    let mut parsed = RedditArgs::default();
    let mut subreddit_set = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--count" | "-n" => parsed.count = parse_value(iter.next(), arg)?,
            "--new" => parsed.max_new = Some(parse_value(iter.next(), arg)?),
            "--clear" => parsed.clear = true,
            "--nsfw" => parsed.nsfw = true,
            "--filter-boring" => parsed.filter_boring = true,
            other if !other.starts_with('-') && !subreddit_set => {
                parsed.subreddit = other.to_string();
                subreddit_set = true;
            }
            other => return Err(format!("unknown option for reddit: {other}")),
        }
    }
    Ok(parsed)
}

fn parse_value(value: Option<&String>, flag: &str) -> Result<usize, String> {
    let value = value.ok_or_else(|| format!("{flag} requires a value"))?;
    value
        .parse()
        .map_err(|_| format!("{flag} requires a number, got: {value}"))
}

/// Prints usage to stderr.
pub fn print_usage() {
    eprintln!("Usage: walldl <COMMAND> [OPTIONS]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  reddit [SUBREDDIT]   Download wallpapers from a subreddit (default: wallpaper)");
    eprintln!("    --count, -n <N>    Number of posts to fetch (default: 200)");
    eprintln!("    --new <N>          Download at most N new wallpapers");
    eprintln!("    --clear            Clear existing wallpapers before downloading");
    eprintln!("    --nsfw             Use the NSFW channel (separate folder and skip-list)");
    eprintln!("    --filter-boring    Remove images with boring (white/black) backgrounds");
    eprintln!("  blacklist [--nsfw]   List blacklisted wallpapers, most recent first");
    eprintln!("  delete <FILE> [--nsfw]");
    eprintln!("                       Delete a wallpaper and blacklist it");
    eprintln!();
    eprintln!("  -h, --help           Show this help");
}

/// Parses the process arguments and runs the selected command.
///
/// Returns the process exit code: 0 on success, 1 when the listing yielded
/// no candidate URLs, 2 on a usage error.
///
/// # Errors
///
/// Returns an error on storage or filesystem-setup failures; per-item
/// download and purge failures are logged, not escalated.
pub async fn run() -> crate::Result<u8> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("Error: {message}");
            eprintln!();
            print_usage();
            return Ok(2);
        }
    };

    let config = AppConfig::load()?;
    match command {
        Command::Reddit(reddit_args) => run_reddit(&reddit_args, &config).await,
        Command::Blacklist { nsfw } => run_blacklist(nsfw, &config),
        Command::Delete { filename, nsfw } => run_delete(&filename, nsfw, &config),
        Command::Help => {
            print_usage();
            Ok(0)
        }
    }
}

const fn channel_for(nsfw: bool) -> Channel {
    if nsfw { Channel::Nsfw } else { Channel::Sfw }
}

/// Fetch + download + purge for one subreddit.
async fn run_reddit(args: &RedditArgs, config: &AppConfig) -> crate::Result<u8> {
    let channel = channel_for(args.nsfw);
    let folder = config.paths.channel_dir(channel);
    log::info!("Using {channel} channel: {}", folder.display());
    std::fs::create_dir_all(&folder)?;

    if args.clear {
        log::info!("Clearing: {}", folder.display());
        std::fs::remove_dir_all(&folder)?;
        std::fs::create_dir_all(&folder)?;
    }
    let mut skip_list = SkipList::open(&config.paths.skip_list_path(channel))?;

    let listing = ListingClient::new()?;
    let urls = listing.fetch_urls(&args.subreddit, args.count).await;
    if urls.is_empty() {
        log::error!("No image URLs found");
        return Ok(1);
    }
    log::info!("Found {} image URLs from r/{}", urls.len(), args.subreddit);

    let before = visible_files(&folder)?.len();

    let downloader = Downloader::new(config.download.clone())?;
    let stats = downloader
        .download_images(&urls, &folder, &skip_list, args.max_new)
        .await?;
    log::info!(
        "Downloaded {} ({} blacklisted, {} cached, {} failed)",
        stats.downloaded,
        stats.skipped_blacklisted,
        stats.skipped_cached,
        stats.failed
    );

    let removed = purge_small_images(&folder, &mut skip_list, &config.purge)?;
    let boring = if args.filter_boring {
        log::info!("Filtering images with boring backgrounds...");
        purge_boring_images(&folder, &mut skip_list, &config.purge)?
    } else {
        0
    };
    log::info!("Purged {} wallpapers", removed + boring);

    let after = visible_files(&folder)?.len();
    log::info!(
        "<< There are {} new files in the {channel} channel >>",
        after.saturating_sub(before)
    );
    Ok(0)
}

/// Prints the skip-list to stdout, most recent first.
fn run_blacklist(nsfw: bool, config: &AppConfig) -> crate::Result<u8> {
    let channel = channel_for(nsfw);
    let skip_list = SkipList::open(&config.paths.skip_list_path(channel))?;

    for entry in skip_list.list_all() {
        println!("{}\t{}\t{}", entry.filename, entry.reason, entry.timestamp);
    }
    Ok(0)
}

/// Blacklists a wallpaper as user-deleted, then removes the file. The
/// blacklist write comes first so the file stays gone even if the unlink
/// is interrupted.
fn run_delete(filename: &str, nsfw: bool, config: &AppConfig) -> crate::Result<u8> {
    let channel = channel_for(nsfw);
    let mut skip_list = SkipList::open(&config.paths.skip_list_path(channel))?;
    skip_list.add(filename, SkipReason::Deleted)?;

    let path = config.paths.channel_dir(channel).join(filename);
    match std::fs::remove_file(&path) {
        Ok(()) => log::info!("Deleted and blacklisted: {filename}"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("Blacklisted (file was not present): {filename}");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(0)
}
