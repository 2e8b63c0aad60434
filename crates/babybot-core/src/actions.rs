//! Comma-separated action sequence text, e.g. `"left, forward, pickup"`.

use babybot_types::Action;
use tracing::warn;

/// Parse a comma-separated list of action names.
///
/// Names are matched case-insensitively. Unknown names and empty entries
/// are skipped with a warning rather than failing the whole sequence.
pub fn parse_action_sequence(text: &str) -> Vec<Action> {
    text.split(',')
        .filter_map(|name| {
            let name = name.trim();
            let action = Action::from_name(name);
            if action.is_none() && !name.is_empty() {
                warn!(name, "skipping unknown action");
            }
            action
        })
        .collect()
}

/// Format actions as lowercase names joined by `", "`.
pub fn format_action_sequence(actions: &[Action]) -> String {
    actions
        .iter()
        .copied()
        .map(Action::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
