// Twitter API v2 client
// Reads use the app bearer token; writes use the user access token.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{MagpieError, MagpieResult};
use crate::platform::{AccountMetrics, PlatformClient, Post, PostTotals};

const API_BASE: &str = "https://api.twitter.com/2";

/// Metric scans over the account's own posts always request at least this
/// many results; the endpoint rejects smaller page sizes.
const MIN_RESULTS: i64 = 5;
const MAX_RESULTS: i64 = 100;

#[derive(Debug, Clone)]
pub struct TwitterClient {
    http: Client,
    /// App bearer token for read endpoints
    bearer_token: String,
    /// User-context token for write endpoints
    access_token: String,
    /// The account the agent acts as
    username: String,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    data: UserData,
}

#[derive(Debug, Deserialize)]
struct UserData {
    id: String,
    public_metrics: UserPublicMetrics,
}

#[derive(Debug, Deserialize)]
struct UserPublicMetrics {
    followers_count: i64,
    tweet_count: i64,
}

#[derive(Debug, Deserialize)]
struct TweetsResponse {
    /// Absent entirely when nothing matched
    data: Option<Vec<TweetData>>,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
    #[serde(default)]
    author_id: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    public_metrics: Option<TweetPublicMetrics>,
}

#[derive(Debug, Deserialize, Default)]
struct TweetPublicMetrics {
    like_count: i64,
    retweet_count: i64,
}

#[derive(Debug, Deserialize)]
struct CreatedTweetResponse {
    data: CreatedTweet,
}

#[derive(Debug, Deserialize)]
struct CreatedTweet {
    id: String,
}

impl TwitterClient {
    pub fn new(
        bearer_token: impl Into<String>,
        access_token: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            bearer_token: bearer_token.into(),
            access_token: access_token.into(),
            username: username.into(),
        }
    }

    fn read(&self, url: &str) -> RequestBuilder {
        self.http.get(url).bearer_auth(&self.bearer_token)
    }

    fn write(&self, url: &str) -> RequestBuilder {
        self.http.post(url).bearer_auth(&self.access_token)
    }

    /// Send a request and deserialize the body, mapping any non-2xx status
    /// into a platform error carrying the response body.
    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
        endpoint: &str,
    ) -> MagpieResult<T> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MagpieError::platform_error(format!(
                "{} returned {}: {}",
                endpoint, status, body
            )));
        }

        Ok(response.json::<T>().await?)
    }

    /// Fetch a user record (id + public metrics) by username
    async fn user_by_name(&self, username: &str) -> MagpieResult<UserData> {
        let url = format!(
            "{}/users/by/username/{}?user.fields=public_metrics",
            API_BASE, username
        );
        let response: UserResponse = self.send(self.read(&url), "get user").await?;
        Ok(response.data)
    }

    /// The agent's own user record, needed for the id in write endpoints
    async fn own_user(&self) -> MagpieResult<UserData> {
        self.user_by_name(&self.username).await
    }
}

#[async_trait]
impl PlatformClient for TwitterClient {
    async fn post(&self, text: &str) -> MagpieResult<String> {
        let url = format!("{}/tweets", API_BASE);
        let response: CreatedTweetResponse = self
            .send(self.write(&url).json(&json!({ "text": text })), "create tweet")
            .await?;

        debug!("Posted tweet {}", response.data.id);
        Ok(response.data.id)
    }

    async fn search(&self, query: &str) -> MagpieResult<Vec<Post>> {
        let url = format!("{}/tweets/search/recent", API_BASE);
        let request = self.read(&url).query(&[
            ("query", query),
            ("tweet.fields", "author_id,public_metrics"),
        ]);
        let response: TweetsResponse = self.send(request, "search recent tweets").await?;

        let posts = response
            .data
            .unwrap_or_default()
            .into_iter()
            .map(|tweet| Post {
                id: tweet.id,
                author_id: tweet.author_id.unwrap_or_default(),
                text: tweet.text.unwrap_or_default(),
            })
            .collect::<Vec<_>>();

        debug!("Search for '{}' matched {} posts", query, posts.len());
        Ok(posts)
    }

    async fn like(&self, post_id: &str) -> MagpieResult<()> {
        let user = self.own_user().await?;
        let url = format!("{}/users/{}/likes", API_BASE, user.id);
        let _: serde_json::Value = self
            .send(self.write(&url).json(&json!({ "tweet_id": post_id })), "like")
            .await?;
        Ok(())
    }

    async fn repost(&self, post_id: &str) -> MagpieResult<()> {
        let user = self.own_user().await?;
        let url = format!("{}/users/{}/retweets", API_BASE, user.id);
        let _: serde_json::Value = self
            .send(
                self.write(&url).json(&json!({ "tweet_id": post_id })),
                "retweet",
            )
            .await?;
        Ok(())
    }

    async fn follow(&self, user_id: &str) -> MagpieResult<()> {
        let user = self.own_user().await?;
        let url = format!("{}/users/{}/following", API_BASE, user.id);
        let _: serde_json::Value = self
            .send(
                self.write(&url).json(&json!({ "target_user_id": user_id })),
                "follow",
            )
            .await?;
        Ok(())
    }

    async fn account_metrics(&self, username: &str) -> MagpieResult<AccountMetrics> {
        let user = self.user_by_name(username).await?;
        Ok(AccountMetrics {
            followers: user.public_metrics.followers_count,
        })
    }

    async fn recent_post_metrics(&self, username: &str) -> MagpieResult<PostTotals> {
        let user = self.user_by_name(username).await?;
        let max_results = page_size(user.public_metrics.tweet_count);

        let url = format!("{}/users/{}/tweets", API_BASE, user.id);
        let request = self.read(&url).query(&[
            ("max_results", max_results.to_string().as_str()),
            ("tweet.fields", "public_metrics"),
            ("exclude", "retweets"),
        ]);
        let response: TweetsResponse = self.send(request, "get user tweets").await?;

        let mut totals = PostTotals {
            likes: 0,
            reposts: 0,
        };
        for tweet in response.data.unwrap_or_default() {
            let metrics = tweet.public_metrics.unwrap_or_default();
            totals.likes += metrics.like_count;
            totals.reposts += metrics.retweet_count;
        }

        Ok(totals)
    }
}

/// Page size for own-post metric scans, clamped to the endpoint's bounds
fn page_size(tweet_count: i64) -> i64 {
    tweet_count.clamp(MIN_RESULTS, MAX_RESULTS)
}
