//! List-view search

use crate::model::Discipline;

/// Records whose code, name or description contains `query`, ignoring case.
/// A blank query matches everything.
pub fn filter_disciplines<'a>(list: &'a [Discipline], query: &str) -> Vec<&'a Discipline> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return list.iter().collect();
    }

    list.iter()
        .filter(|d| {
            d.code.to_lowercase().contains(&needle)
                || d.name.to_lowercase().contains(&needle)
                || d.description.to_lowercase().contains(&needle)
        })
        .collect()
}
