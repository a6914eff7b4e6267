// Q-Learning implementation for the engagement agent
// This implements epsilon-greedy action selection and the one-step value update

use std::collections::HashMap;

use rand::Rng;

use crate::config::LearningConfig;
use crate::error::{MagpieError, MagpieResult};
use crate::reinforcement::action::EngagementAction;

/// The per-bucket slice of the value table: one value estimate per action
pub type ValueRow = HashMap<EngagementAction, f64>;

/// Q-Learning system for action selection and learning
#[derive(Debug, Clone)]
pub struct QLearning {
    /// Learning rate (α) - how quickly new information overrides old
    learning_rate: f64,
    /// Discount factor (γ) - importance of future rewards
    discount_factor: f64,
    /// Exploration rate (ε) - probability of taking a random action
    exploration_rate: f64,
    /// Fixed stand-in for the value of the next state. The agent never looks
    /// ahead to the successor bucket's row, so the update bootstraps against
    /// this constant instead of a max over next-state values.
    terminal_reward_estimate: f64,
}

impl QLearning {
    /// Create a new Q-Learning system
    pub fn new(
        learning_rate: f64,
        discount_factor: f64,
        exploration_rate: f64,
        terminal_reward_estimate: f64,
    ) -> Self {
        Self {
            learning_rate,
            discount_factor,
            exploration_rate,
            terminal_reward_estimate,
        }
    }

    pub fn from_config(config: &LearningConfig) -> Self {
        Self::new(
            config.learning_rate,
            config.discount_factor,
            config.exploration_rate,
            config.terminal_reward_estimate,
        )
    }

    /// Select an action for the given value row using an epsilon-greedy policy.
    ///
    /// With probability ε the choice is uniform over the whole action space.
    /// Otherwise the highest-valued action wins, with ties broken uniformly at
    /// random so equal-valued rows (all-zero at cold start) carry no bias
    /// toward the first-declared action.
    pub fn select_action(&self, row: &ValueRow) -> MagpieResult<EngagementAction> {
        let mut rng = rand::rng();

        // Exploration: with probability ε, choose a random action
        if rng.random::<f64>() < self.exploration_rate {
            let index = rng.random_range(0..EngagementAction::ALL.len());
            return Ok(EngagementAction::ALL[index]);
        }

        // Exploitation: choose among the actions tied for the best value
        let max_value = row
            .values()
            .copied()
            .max_by(|a, b| a.total_cmp(b))
            .ok_or_else(|| MagpieError::other("value row is empty"))?;

        let tied: Vec<EngagementAction> = row
            .iter()
            .filter(|(_, value)| **value == max_value)
            .map(|(action, _)| *action)
            .collect();

        let index = rng.random_range(0..tied.len());
        Ok(tied[index])
    }

    /// One-step temporal-difference update:
    /// Q(s,a) ← (1-α)·Q(s,a) + α·[r + γ·terminal_reward_estimate]
    pub fn next_value(&self, current: f64, reward: f64) -> f64 {
        (1.0 - self.learning_rate) * current
            + self.learning_rate * (reward + self.discount_factor * self.terminal_reward_estimate)
    }
}

impl Default for QLearning {
    fn default() -> Self {
        Self::from_config(&LearningConfig::default())
    }
}
