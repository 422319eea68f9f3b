//! Reddit listing client: the paginated source of candidate image URLs.

use std::time::Duration;

use serde_json::Value;

/// User agent sent with listing requests.
const USER_AGENT: &str = "wallpaper-download";

/// Posts requested per listing page, the API maximum.
const PAGE_LIMIT: &str = "100";

/// Timeout for a single listing page request.
const PAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the paginated subreddit listing API.
pub struct ListingClient {
    client: reqwest::Client,
}

impl ListingClient {
    /// Builds a listing client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(PAGE_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// Fetches image URLs from `subreddit`, paginating until `count` URLs
    /// are collected or the listing is exhausted.
    ///
    /// A page-fetch failure ends the sequence — whatever was collected so
    /// far is returned; per-page errors never abort the run.
    pub async fn fetch_urls(&self, subreddit: &str, count: usize) -> Vec<String> {
        let mut urls = Vec::new();
        if count == 0 {
            return urls;
        }
        let mut after: Option<String> = None;

        loop {
            let Some(page) = self.fetch_page(subreddit, after.as_deref()).await else {
                break;
            };

            for url in extract_urls_from_page(&page) {
                urls.push(url);
                if urls.len() >= count {
                    return urls;
                }
            }

            after = page["data"]["after"].as_str().map(str::to_string);
            if after.is_none() {
                break;
            }
        }
        urls
    }

    /// Fetches a single listing page, or `None` on any request failure.
    async fn fetch_page(&self, subreddit: &str, after: Option<&str>) -> Option<Value> {
        log::info!("Fetching posts from r/{subreddit} (after={after:?})");

        let mut query: Vec<(&str, &str)> = vec![("limit", PAGE_LIMIT)];
        if let Some(cursor) = after {
            query.push(("after", cursor));
        }

        let result = self
            .client
            .get(format!("https://www.reddit.com/r/{subreddit}/.json"))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&query)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);

        match result {
            Ok(response) => match response.json::<Value>().await {
                Ok(page) => Some(page),
                Err(e) => {
                    log::warn!("Error parsing listing page: {e}");
                    None
                }
            },
            Err(e) => {
                log::warn!("Error fetching from r/{subreddit}: {e}");
                None
            }
        }
    }
}

/// Extracts all image URLs from one listing page: direct image links plus
/// expanded gallery posts.
#[must_use]
pub fn extract_urls_from_page(page: &Value) -> Vec<String> {
    let mut urls = Vec::new();
    let Some(children) = page.pointer("/data/children").and_then(Value::as_array) else {
        return urls;
    };

    for child in children {
        let post = &child["data"];
        let url = post["url"].as_str().unwrap_or("");
        if url.starts_with("https://www.reddit.com/gallery/") {
            extract_gallery_urls(post, &mut urls);
        } else if has_image_extension(url) {
            urls.push(url.to_string());
        }
    }
    urls
}

/// Expands a gallery post into one `i.redd.it` URL per media item, using the
/// item's mime type for the extension.
fn extract_gallery_urls(post: &Value, urls: &mut Vec<String>) {
    let Some(items) = post.pointer("/gallery_data/items").and_then(Value::as_array) else {
        return;
    };
    let metadata = &post["media_metadata"];

    for item in items {
        let Some(media_id) = item["media_id"].as_str() else {
            continue;
        };
        let Some(mime) = metadata[media_id]["m"].as_str() else {
            continue;
        };
        if let Some((_, ext)) = mime.rsplit_once('/') {
            urls.push(format!("https://i.redd.it/{media_id}.{ext}"));
        }
    }
}

fn has_image_extension(url: &str) -> bool {
    [".jpg", ".jpeg", ".png"]
        .iter()
        .any(|ext| url.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page_with_posts(posts: Vec<Value>) -> Value {
        json!({ "data": { "children": posts, "after": null } })
    }

    fn direct_post(url: &str) -> Value {
        json!({ "data": { "url": url } })
    }

    #[test]
    fn direct_image_links_are_collected() {
        let page = page_with_posts(vec![
            direct_post("https://i.redd.it/aaa.jpg"),
            direct_post("https://i.redd.it/bbb.png"),
            direct_post("https://i.redd.it/ccc.jpeg"),
        ]);
        assert_eq!(
            extract_urls_from_page(&page),
            vec![
                "https://i.redd.it/aaa.jpg",
                "https://i.redd.it/bbb.png",
                "https://i.redd.it/ccc.jpeg",
            ]
        );
    }

    #[test]
    fn non_image_links_are_ignored() {
        let page = page_with_posts(vec![
            direct_post("https://v.redd.it/video123"),
            direct_post("https://i.redd.it/animated.gif"),
            direct_post("https://example.com/page.html"),
        ]);
        assert!(extract_urls_from_page(&page).is_empty());
    }

    #[test]
    fn gallery_posts_are_expanded() {
        let page = page_with_posts(vec![json!({
            "data": {
                "url": "https://www.reddit.com/gallery/xyz",
                "gallery_data": {
                    "items": [
                        { "media_id": "m1" },
                        { "media_id": "m2" },
                    ]
                },
                "media_metadata": {
                    "m1": { "m": "image/jpg" },
                    "m2": { "m": "image/png" },
                }
            }
        })]);
        assert_eq!(
            extract_urls_from_page(&page),
            vec!["https://i.redd.it/m1.jpg", "https://i.redd.it/m2.png"]
        );
    }

    #[test]
    fn gallery_item_without_metadata_is_skipped() {
        let page = page_with_posts(vec![json!({
            "data": {
                "url": "https://www.reddit.com/gallery/xyz",
                "gallery_data": { "items": [ { "media_id": "orphan" } ] },
                "media_metadata": {}
            }
        })]);
        assert!(extract_urls_from_page(&page).is_empty());
    }

    #[test]
    fn malformed_page_yields_nothing() {
        assert!(extract_urls_from_page(&json!({})).is_empty());
        assert!(extract_urls_from_page(&json!({ "data": {} })).is_empty());
        assert!(extract_urls_from_page(&json!({ "data": { "children": "nope" } })).is_empty());
    }

    #[tokio::test]
    async fn zero_count_issues_no_requests() {
        // Must return empty without touching the network, so no listing
        // page is ever fetched for a zero cap.
        let client = ListingClient::new().unwrap();
        assert!(client.fetch_urls("wallpaper", 0).await.is_empty());
    }

    #[test]
    fn mixed_page() {
        let page = page_with_posts(vec![
            direct_post("https://i.redd.it/keep.jpg"),
            direct_post("https://v.redd.it/skip"),
            json!({
                "data": {
                    "url": "https://www.reddit.com/gallery/g",
                    "gallery_data": { "items": [ { "media_id": "g1" } ] },
                    "media_metadata": { "g1": { "m": "image/png" } }
                }
            }),
        ]);
        assert_eq!(
            extract_urls_from_page(&page),
            vec!["https://i.redd.it/keep.jpg", "https://i.redd.it/g1.png"]
        );
    }
}
