// Engagement measurement
// A single scalar proxy for how much attention the account is getting

use std::sync::Arc;

use tracing::debug;

use crate::error::MagpieResult;
use crate::platform::PlatformClient;

/// Computes the interaction count: likes and reposts received across the
/// account's recent posts, plus the current follower count. Measured fresh
/// on every call; never cached.
#[derive(Clone)]
pub struct EngagementMeter {
    platform: Arc<dyn PlatformClient>,
    username: String,
}

impl EngagementMeter {
    pub fn new(platform: Arc<dyn PlatformClient>, username: impl Into<String>) -> Self {
        Self {
            platform,
            username: username.into(),
        }
    }

    pub async fn interaction_count(&self) -> MagpieResult<i64> {
        let totals = self.platform.recent_post_metrics(&self.username).await?;
        let account = self.platform.account_metrics(&self.username).await?;

        let count = totals.likes + totals.reposts + account.followers;
        debug!(
            "Interaction count for {}: {} ({} likes, {} reposts, {} followers)",
            self.username, count, totals.likes, totals.reposts, account.followers
        );

        Ok(count)
    }
}
