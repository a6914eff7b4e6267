// Reward signal for the engagement agent
// The reward for an action is the change in engagement observed after it

/// Reward for the previous action: the interaction count measured now minus
/// the snapshot taken when the action was performed. Negative when engagement
/// dropped or the platform's counts lag.
pub fn engagement_delta(snapshot: i64, current: i64) -> f64 {
    (current - snapshot) as f64
}
