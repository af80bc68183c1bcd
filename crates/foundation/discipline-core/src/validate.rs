//! Form rules checked before a create or update is submitted

use crate::model::{Discipline, DisciplineDraft};
use crate::{Error, Result};

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn check_project(project_id: Option<&str>, require_project: bool) -> Result<()> {
    if require_project && project_id.map_or(true, blank) {
        return Err(Error::Validation("a project must be selected".into()));
    }
    Ok(())
}

/// Rules for the create form
pub fn validate_draft(draft: &DisciplineDraft, require_project: bool) -> Result<()> {
    if blank(&draft.name) {
        return Err(Error::Validation("name is required".into()));
    }
    check_project(draft.project_id.as_deref(), require_project)
}

/// Rules for the edit form. The code is checked for presence only.
pub fn validate_record(record: &Discipline, require_project: bool) -> Result<()> {
    if blank(&record.code) {
        return Err(Error::Validation("code is required".into()));
    }
    if blank(&record.name) {
        return Err(Error::Validation("name is required".into()));
    }
    check_project(record.project_id(), require_project)
}
