// The engagement agent's orchestration loop
// One invocation = settle the previous action's reward, then take a new action

use std::sync::Arc;

use chrono::{FixedOffset, Utc};
use rand::Rng;
use tracing::{debug, info};

use crate::config::LearningConfig;
use crate::engagement::EngagementMeter;
use crate::error::{MagpieError, MagpieResult};
use crate::integrations::ContentGenerator;
use crate::platform::{PlatformClient, Post};
use crate::reinforcement::{engagement_delta, EngagementAction, QLearning, TimeBucket};
use crate::store::{ActionLog, ActionRecord, Store, ValueTable};

/// Prompt used to generate post text
pub const TWEET_PROMPT: &str = "Write a motivational tweet";

/// Query used to find posts to like, repost, or follow the author of
pub const SEARCH_QUERY: &str = "motivation -is:retweet lang:en";

/// The engagement agent. All collaborators are injected once at startup.
pub struct Agent {
    values: ValueTable,
    log: ActionLog,
    meter: EngagementMeter,
    platform: Arc<dyn PlatformClient>,
    generator: Arc<dyn ContentGenerator>,
    q_learning: QLearning,
    timezone: FixedOffset,
}

impl Agent {
    pub fn new(
        store: Store,
        platform: Arc<dyn PlatformClient>,
        generator: Arc<dyn ContentGenerator>,
        username: impl Into<String>,
        learning: &LearningConfig,
        timezone: FixedOffset,
    ) -> Self {
        Self {
            values: ValueTable::new(store.clone()),
            log: ActionLog::new(store),
            meter: EngagementMeter::new(platform.clone(), username),
            platform,
            generator,
            q_learning: QLearning::from_config(learning),
            timezone,
        }
    }

    /// Run one full invocation: feedback first, so the value table reflects
    /// the previous action's outcome before a new action is chosen.
    pub async fn run_once(&self) -> MagpieResult<()> {
        self.apply_feedback().await?;
        self.take_action().await
    }

    /// Settle the reward for the most recent logged action and fold it into
    /// the value table. A no-op when nothing has been logged yet.
    pub async fn apply_feedback(&self) -> MagpieResult<()> {
        let Some(prev) = self.log.latest()? else {
            debug!("Action log is empty; nothing to settle");
            return Ok(());
        };

        let current = self.meter.interaction_count().await?;
        let reward = engagement_delta(prev.interactions, current);

        let q_prev = self.values.get_value(prev.bucket, prev.action)?;
        let q_new = self.q_learning.next_value(q_prev, reward);
        self.values.set_value(prev.bucket, prev.action, q_new)?;

        info!(
            "Settled {} in bucket {}: reward {}, value {} -> {}",
            prev.action, prev.bucket, reward, q_prev, q_new
        );
        Ok(())
    }

    /// Choose an action for the current time bucket, perform it on the
    /// platform, and log it with the engagement snapshot measured beforehand.
    pub async fn take_action(&self) -> MagpieResult<()> {
        let bucket = TimeBucket::current(&self.timezone);

        // Measured once per invocation; this snapshot is what the next
        // invocation's reward is computed against.
        let snapshot = self.meter.interaction_count().await?;

        let row = self.values.get_row(bucket)?;
        let action = self.q_learning.select_action(&row)?;
        info!(
            "Selected {} for bucket {} ({} interactions)",
            action, bucket, snapshot
        );

        match action {
            EngagementAction::Tweet => {
                let text = self.generator.generate(TWEET_PROMPT).await?;
                self.platform.post(&text).await?;
            }
            EngagementAction::Like => {
                let post = self.pick_candidate().await?;
                self.platform.like(&post.id).await?;
            }
            EngagementAction::Retweet => {
                let post = self.pick_candidate().await?;
                self.platform.repost(&post.id).await?;
            }
            EngagementAction::Follow => {
                let post = self.pick_candidate().await?;
                self.platform.follow(&post.author_id).await?;
            }
        }

        self.log.append(&ActionRecord {
            recorded_at: Utc::now().with_timezone(&self.timezone),
            bucket,
            action,
            interactions: snapshot,
        })
    }

    /// Search for candidate posts and pick one uniformly at random
    async fn pick_candidate(&self) -> MagpieResult<Post> {
        let mut posts = self.platform.search(SEARCH_QUERY).await?;

        if posts.is_empty() {
            return Err(MagpieError::empty_search(SEARCH_QUERY));
        }

        let index = {
            let mut rng = rand::rng();
            rng.random_range(0..posts.len())
        };
        Ok(posts.swap_remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{AccountMetrics, PostTotals};
    use crate::reinforcement::ValueRow;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPlatform {
        followers: i64,
        search_results: Vec<Post>,
        posted: Mutex<Vec<String>>,
        liked: Mutex<Vec<String>>,
        reposted: Mutex<Vec<String>>,
        followed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PlatformClient for RecordingPlatform {
        async fn post(&self, text: &str) -> MagpieResult<String> {
            self.posted.lock().unwrap().push(text.to_string());
            Ok("tweet-1".to_string())
        }

        async fn search(&self, _query: &str) -> MagpieResult<Vec<Post>> {
            Ok(self.search_results.clone())
        }

        async fn like(&self, post_id: &str) -> MagpieResult<()> {
            self.liked.lock().unwrap().push(post_id.to_string());
            Ok(())
        }

        async fn repost(&self, post_id: &str) -> MagpieResult<()> {
            self.reposted.lock().unwrap().push(post_id.to_string());
            Ok(())
        }

        async fn follow(&self, user_id: &str) -> MagpieResult<()> {
            self.followed.lock().unwrap().push(user_id.to_string());
            Ok(())
        }

        async fn account_metrics(&self, _username: &str) -> MagpieResult<AccountMetrics> {
            Ok(AccountMetrics {
                followers: self.followers,
            })
        }

        async fn recent_post_metrics(&self, _username: &str) -> MagpieResult<PostTotals> {
            Ok(PostTotals {
                likes: 0,
                reposts: 0,
            })
        }
    }

    struct CannedGenerator;

    #[async_trait]
    impl ContentGenerator for CannedGenerator {
        async fn generate(&self, _prompt: &str) -> MagpieResult<String> {
            Ok("You can do hard things.".to_string())
        }
    }

    fn uniform_row(value: f64) -> ValueRow {
        EngagementAction::ALL.iter().map(|a| (*a, value)).collect()
    }

    /// Row that makes exploitation always pick `preferred`
    fn row_preferring(preferred: EngagementAction) -> ValueRow {
        EngagementAction::ALL
            .iter()
            .map(|a| (*a, if *a == preferred { 10.0 } else { 0.0 }))
            .collect()
    }

    fn seeded_store(row: &ValueRow) -> Store {
        let store = Store::open(None::<&str>).unwrap();
        let values = ValueTable::new(store.clone());
        for bucket in TimeBucket::ALL {
            values.insert_row(bucket, row).unwrap();
        }
        store
    }

    fn greedy_learning() -> LearningConfig {
        LearningConfig {
            exploration_rate: 0.0,
            ..LearningConfig::default()
        }
    }

    fn agent_with(store: Store, platform: Arc<RecordingPlatform>, learning: LearningConfig) -> Agent {
        Agent::new(
            store,
            platform,
            Arc::new(CannedGenerator),
            "motivater247",
            &learning,
            FixedOffset::west_opt(5 * 3600).unwrap(),
        )
    }

    fn candidate_posts() -> Vec<Post> {
        vec![Post {
            id: "p-77".to_string(),
            author_id: "u-9".to_string(),
            text: "never give up".to_string(),
        }]
    }

    #[tokio::test]
    async fn test_feedback_on_empty_log_is_noop() {
        let store = seeded_store(&uniform_row(1.25));
        let platform = Arc::new(RecordingPlatform {
            followers: 500,
            ..Default::default()
        });
        let agent = agent_with(store.clone(), platform, greedy_learning());

        agent.apply_feedback().await.unwrap();

        // Every value is exactly as seeded
        let values = ValueTable::new(store);
        for bucket in TimeBucket::ALL {
            for (_, value) in values.get_row(bucket).unwrap() {
                assert_eq!(value, 1.25);
            }
        }
    }

    #[tokio::test]
    async fn test_feedback_applies_td_update() {
        let store = seeded_store(&uniform_row(0.0));
        // Snapshot was 100, current measurement will be 130
        let platform = Arc::new(RecordingPlatform {
            followers: 130,
            ..Default::default()
        });
        ActionLog::new(store.clone())
            .append(&ActionRecord {
                recorded_at: Utc::now().with_timezone(&FixedOffset::west_opt(5 * 3600).unwrap()),
                bucket: TimeBucket::Morning,
                action: EngagementAction::Like,
                interactions: 100,
            })
            .unwrap();

        let agent = agent_with(store.clone(), platform, greedy_learning());
        agent.apply_feedback().await.unwrap();

        // reward 30: (1 - 0.1)·0 + 0.1·(30 + 0.9·50) = 7.5
        let values = ValueTable::new(store);
        assert_eq!(
            values
                .get_value(TimeBucket::Morning, EngagementAction::Like)
                .unwrap(),
            7.5
        );
        // Other cells in the row are untouched
        assert_eq!(
            values
                .get_value(TimeBucket::Morning, EngagementAction::Tweet)
                .unwrap(),
            0.0
        );
    }

    #[tokio::test]
    async fn test_take_action_posts_and_logs_snapshot() {
        let store = seeded_store(&row_preferring(EngagementAction::Tweet));
        let platform = Arc::new(RecordingPlatform {
            followers: 42,
            ..Default::default()
        });
        let agent = agent_with(store.clone(), platform.clone(), greedy_learning());

        agent.take_action().await.unwrap();

        let posted = platform.posted.lock().unwrap();
        assert_eq!(posted.as_slice(), ["You can do hard things."]);

        let record = ActionLog::new(store).latest().unwrap().unwrap();
        assert_eq!(record.action, EngagementAction::Tweet);
        assert_eq!(record.interactions, 42);
    }

    #[tokio::test]
    async fn test_take_action_follow_targets_author() {
        let store = seeded_store(&row_preferring(EngagementAction::Follow));
        let platform = Arc::new(RecordingPlatform {
            search_results: candidate_posts(),
            ..Default::default()
        });
        let agent = agent_with(store.clone(), platform.clone(), greedy_learning());

        agent.take_action().await.unwrap();

        // The follow acts on the post's author, not the post
        assert_eq!(platform.followed.lock().unwrap().as_slice(), ["u-9"]);
        assert_eq!(
            ActionLog::new(store).latest().unwrap().unwrap().action,
            EngagementAction::Follow
        );
    }

    #[tokio::test]
    async fn test_take_action_like_uses_post_id() {
        let store = seeded_store(&row_preferring(EngagementAction::Like));
        let platform = Arc::new(RecordingPlatform {
            search_results: candidate_posts(),
            ..Default::default()
        });
        let agent = agent_with(store, platform.clone(), greedy_learning());

        agent.take_action().await.unwrap();

        assert_eq!(platform.liked.lock().unwrap().as_slice(), ["p-77"]);
    }

    #[tokio::test]
    async fn test_empty_search_is_fatal_and_logs_nothing() {
        let store = seeded_store(&row_preferring(EngagementAction::Retweet));
        let platform = Arc::new(RecordingPlatform::default());
        let agent = agent_with(store.clone(), platform, greedy_learning());

        let err = agent.take_action().await.unwrap_err();
        assert!(matches!(err, MagpieError::EmptySearch { .. }));

        // The failed invocation must not leave a log entry behind
        assert_eq!(ActionLog::new(store).latest().unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_row_is_fatal() {
        // Schema exists but no rows were seeded
        let store = Store::open(None::<&str>).unwrap();
        let platform = Arc::new(RecordingPlatform::default());
        let agent = agent_with(store, platform, greedy_learning());

        let err = agent.take_action().await.unwrap_err();
        assert!(matches!(err, MagpieError::RowNotFound { .. }));
    }

    #[tokio::test]
    async fn test_run_once_settles_then_acts() {
        let store = seeded_store(&row_preferring(EngagementAction::Tweet));
        let platform = Arc::new(RecordingPlatform {
            followers: 150,
            ..Default::default()
        });
        ActionLog::new(store.clone())
            .append(&ActionRecord {
                recorded_at: Utc::now().with_timezone(&FixedOffset::west_opt(5 * 3600).unwrap()),
                bucket: TimeBucket::Night,
                action: EngagementAction::Follow,
                interactions: 100,
            })
            .unwrap();

        let agent = agent_with(store.clone(), platform.clone(), greedy_learning());
        agent.run_once().await.unwrap();

        // Feedback settled: (1 - 0.1)·0 + 0.1·(50 + 45) = 9.5
        let values = ValueTable::new(store.clone());
        assert_eq!(
            values
                .get_value(TimeBucket::Night, EngagementAction::Follow)
                .unwrap(),
            9.5
        );

        // And a fresh action was taken and logged
        assert_eq!(platform.posted.lock().unwrap().len(), 1);
        let record = ActionLog::new(store).latest().unwrap().unwrap();
        assert_eq!(record.action, EngagementAction::Tweet);
        assert_eq!(record.interactions, 150);
    }
}
