use crate::types::Discussion;

/// Keep only discussions with an accepted answer, preserving API order.
pub fn filter_answered(discussions: Vec<Discussion>) -> Vec<Discussion> {
    discussions
        .into_iter()
        .filter(|d| d.answer.is_some())
        .collect()
}
