// Actions available to the engagement agent
// Each action maps directly to one platform operation

use std::fmt;

/// Defines all possible actions the agent can take on the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngagementAction {
    /// Post a freshly generated tweet
    Tweet,

    /// Like a post matching the search query
    Like,

    /// Repost a post matching the search query
    Retweet,

    /// Follow the author of a post matching the search query
    Follow,
}

impl EngagementAction {
    /// The full action space, in declaration order
    pub const ALL: [EngagementAction; 4] = [
        EngagementAction::Tweet,
        EngagementAction::Like,
        EngagementAction::Retweet,
        EngagementAction::Follow,
    ];

    /// The string key used for persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            EngagementAction::Tweet => "tweet",
            EngagementAction::Like => "like",
            EngagementAction::Retweet => "retweet",
            EngagementAction::Follow => "follow",
        }
    }

    /// Parse a persisted string key back into an action
    pub fn parse(s: &str) -> Option<EngagementAction> {
        match s {
            "tweet" => Some(EngagementAction::Tweet),
            "like" => Some(EngagementAction::Like),
            "retweet" => Some(EngagementAction::Retweet),
            "follow" => Some(EngagementAction::Follow),
            _ => None,
        }
    }
}

impl fmt::Display for EngagementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
