//! Code allocation
//!
//! Computes the next `DISC` code from a snapshot of existing records and
//! rejects names that collide with one already in the snapshot.
//!
//! The snapshot is only as fresh as the list fetch that produced it. Two
//! writers working from the same snapshot will compute the same code.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::{Discipline, DisciplineDraft};

/// Literal prefix of every allocated code
pub const CODE_PREFIX: &str = "DISC";

/// Candidate name already exists in the snapshot
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("A discipline named '{name}' already exists, choose another name")]
pub struct DuplicateNameError {
    pub name: String,
}

/// A draft paired with the code it will be created under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatedDiscipline {
    pub code: String,
    pub draft: DisciplineDraft,
}

fn code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // ASCII digits only; `\d` would admit other Unicode digit classes
    PATTERN.get_or_init(|| Regex::new(r"^DISC([0-9]+)$").expect("static pattern"))
}

/// Trimmed, case-folded form used for duplicate detection
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Sequence number of a well-formed code, `None` for anything else
pub fn parse_code_number(code: &str) -> Option<u64> {
    let digits = code_pattern().captures(code)?.get(1)?.as_str();
    match digits.parse::<u64>() {
        Ok(n) => Some(n),
        Err(_) => {
            tracing::debug!(code, "ignoring code with out-of-range sequence");
            None
        }
    }
}

/// Next code after the highest well-formed code in `existing`
pub fn next_code(existing: &[Discipline]) -> String {
    // A sequence with no successor is skipped like any other unusable code
    let next = existing
        .iter()
        .filter_map(|d| parse_code_number(&d.code)?.checked_add(1))
        .max()
        .unwrap_or(1);

    format!("{CODE_PREFIX}{next:02}")
}

/// Check the draft's name against the snapshot and assign the next code.
pub fn allocate_code(
    existing: &[Discipline],
    draft: DisciplineDraft,
) -> Result<AllocatedDiscipline, DuplicateNameError> {
    let candidate = normalize_name(&draft.name);

    if existing.iter().any(|d| normalize_name(&d.name) == candidate) {
        return Err(DuplicateNameError {
            name: draft.name.trim().to_string(),
        });
    }

    Ok(AllocatedDiscipline {
        code: next_code(existing),
        draft,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, name: &str) -> Discipline {
        Discipline {
            id: format!("id-{code}"),
            code: code.to_string(),
            name: name.to_string(),
            description: String::new(),
            is_active: true,
            project: None,
            sort_order: None,
        }
    }

    fn with_codes(codes: &[&str]) -> Vec<Discipline> {
        codes
            .iter()
            .enumerate()
            .map(|(i, c)| record(c, &format!("name-{i}")))
            .collect()
    }

    #[test]
    fn test_empty_snapshot_starts_at_one() {
        let allocated = allocate_code(&[], DisciplineDraft::named("Civil")).unwrap();
        assert_eq!(allocated.code, "DISC01");
    }

    #[test]
    fn test_next_after_max_not_after_count() {
        let existing = with_codes(&["DISC01", "DISC02", "DISC07"]);
        assert_eq!(next_code(&existing), "DISC08");
    }

    #[test]
    fn test_malformed_codes_ignored() {
        assert_eq!(next_code(&with_codes(&["DISC01", "LEGACY-9"])), "DISC02");
        assert_eq!(next_code(&with_codes(&["disc03", "DISC1"])), "DISC02");
        assert_eq!(next_code(&with_codes(&["DISC", "DISC-4", "DISC05 ", "XDISC09"])), "DISC01");
    }

    #[test]
    fn test_padding_never_truncates() {
        assert_eq!(next_code(&with_codes(&["DISC99"])), "DISC100");
        assert_eq!(next_code(&with_codes(&["DISC122"])), "DISC123");
        assert_eq!(next_code(&with_codes(&["DISC08"])), "DISC09");
    }

    #[test]
    fn test_leading_zeros_parse_as_plain_integer() {
        assert_eq!(parse_code_number("DISC07"), Some(7));
        assert_eq!(parse_code_number("DISC0010"), Some(10));
        assert_eq!(parse_code_number("DISC٣"), None);
    }

    #[test]
    fn test_overflowing_sequence_ignored() {
        let existing = with_codes(&["DISC04", "DISC99999999999999999999999"]);
        assert_eq!(next_code(&existing), "DISC05");
    }

    #[test]
    fn test_sequence_at_u64_max_never_reissued() {
        let existing = with_codes(&["DISC04", "DISC18446744073709551615"]);
        let code = next_code(&existing);
        assert_eq!(code, "DISC05");
        assert!(existing.iter().all(|d| d.code != code));
    }

    #[test]
    fn test_duplicate_name_is_trimmed_and_case_folded() {
        let existing = vec![record("DISC01", "Structural")];
        let err = allocate_code(&existing, DisciplineDraft::named("  structural ")).unwrap_err();
        assert_eq!(err.name, "structural");
    }

    #[test]
    fn test_similar_name_is_not_duplicate() {
        let existing = vec![record("DISC01", "Structural")];
        let allocated = allocate_code(&existing, DisciplineDraft::named("Structural Steel")).unwrap();
        assert_eq!(allocated.code, "DISC02");
    }

    #[test]
    fn test_duplicate_check_covers_malformed_codes() {
        let existing = vec![record("LEGACY-9", "Plumbing")];
        assert!(allocate_code(&existing, DisciplineDraft::named("PLUMBING")).is_err());
    }

    #[test]
    fn test_draft_is_carried_through() {
        let draft = DisciplineDraft::named("Mechanical")
            .with_description("HVAC")
            .with_project("p-2")
            .inactive();
        let allocated = allocate_code(&with_codes(&["DISC03"]), draft.clone()).unwrap();
        assert_eq!(allocated.code, "DISC04");
        assert_eq!(allocated.draft, draft);
    }
}
