// Platform client abstraction
// The agent talks to the social platform only through this boundary,
// which keeps the learning loop testable against mock implementations.

pub mod twitter;

pub use twitter::TwitterClient;

use async_trait::async_trait;

use crate::error::MagpieResult;

/// A post surfaced by a platform search
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub text: String,
}

/// Account-level metrics for a user
#[derive(Debug, Clone, Copy)]
pub struct AccountMetrics {
    pub followers: i64,
}

/// Engagement totals across an account's recent posts
#[derive(Debug, Clone, Copy)]
pub struct PostTotals {
    pub likes: i64,
    pub reposts: i64,
}

/// Trait for social platform clients
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Publish a post, returning its id
    async fn post(&self, text: &str) -> MagpieResult<String>;

    /// Search recent posts. An empty result set is a valid return value;
    /// callers decide whether that is an error.
    async fn search(&self, query: &str) -> MagpieResult<Vec<Post>>;

    /// Like a post
    async fn like(&self, post_id: &str) -> MagpieResult<()>;

    /// Repost a post
    async fn repost(&self, post_id: &str) -> MagpieResult<()>;

    /// Follow a user
    async fn follow(&self, user_id: &str) -> MagpieResult<()>;

    /// Account-level metrics for a username
    async fn account_metrics(&self, username: &str) -> MagpieResult<AccountMetrics>;

    /// Like/repost totals across the account's recent posts
    async fn recent_post_metrics(&self, username: &str) -> MagpieResult<PostTotals>;
}
