//! JSON shapes exchanged with the server
//!
//! Everything is optional on the way in. Missing text becomes `""` and a
//! missing active flag becomes `true`.

use discipline_core::{AllocatedDiscipline, Discipline, Error, Project, ProjectRef, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Discipline as it travels over the wire, in both directions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisciplineDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    /// Older servers label the project by code instead of name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
}

impl DisciplineDto {
    /// Create body: the draft's fields plus the allocated code
    pub fn for_create(allocated: &AllocatedDiscipline) -> Self {
        let draft = &allocated.draft;
        Self {
            code: Some(allocated.code.clone()),
            name: Some(draft.name.trim().to_string()),
            description: Some(draft.description.clone()),
            is_active: Some(draft.is_active),
            project_id: draft.project_id.clone().filter(|p| !p.trim().is_empty()),
            ..Self::default()
        }
    }

    pub fn into_discipline(self) -> Discipline {
        let project = self.project_id.filter(|id| !id.is_empty()).map(|id| ProjectRef {
            id,
            name: self.project_name.or(self.project_code),
        });

        Discipline {
            id: self.id.unwrap_or_default(),
            code: self.code.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            is_active: self.is_active.unwrap_or(true),
            project,
            sort_order: self.sort_order,
        }
    }
}

impl From<&Discipline> for DisciplineDto {
    fn from(d: &Discipline) -> Self {
        Self {
            id: Some(d.id.clone()),
            code: Some(d.code.clone()),
            name: Some(d.name.clone()),
            description: Some(d.description.clone()),
            is_active: Some(d.is_active),
            project_id: d.project.as_ref().map(|p| p.id.clone()),
            project_name: d.project.as_ref().and_then(|p| p.name.clone()),
            project_code: None,
            sort_order: d.sort_order,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectDto {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl ProjectDto {
    pub fn into_project(self) -> Project {
        Project {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
        }
    }
}

/// Paged envelope (`{items, totalCount}`) or a bare array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Paged {
        // Option fields already default to None; a `default` here would
        // demand `T: Default`
        items: Option<Vec<T>>,
        #[serde(rename = "totalCount")]
        #[allow(dead_code)]
        total_count: Option<u64>,
    },
}

/// Paged response body, as the server sends it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
}

/// Password-grant token response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
}

fn is_absent(body: &str) -> bool {
    let body = body.trim();
    body.is_empty() || body == "null"
}

/// Flatten either listing shape. An empty body is an empty list.
pub fn parse_listing<T: DeserializeOwned>(body: &str) -> Result<Vec<T>> {
    if is_absent(body) {
        return Ok(Vec::new());
    }

    let listing: Listing<T> =
        serde_json::from_str(body).map_err(|e| Error::Decode(format!("listing: {e}")))?;

    Ok(match listing {
        Listing::Bare(items) => items,
        Listing::Paged { items, .. } => items.unwrap_or_default(),
    })
}

/// Single record, or `None` for an empty or `null` body
pub fn parse_optional<T: DeserializeOwned>(body: &str) -> Result<Option<T>> {
    if is_absent(body) {
        return Ok(None);
    }
    serde_json::from_str(body)
        .map(Some)
        .map_err(|e| Error::Decode(format!("record: {e}")))
}

pub fn parse_disciplines(body: &str) -> Result<Vec<Discipline>> {
    Ok(parse_listing::<DisciplineDto>(body)?
        .into_iter()
        .map(DisciplineDto::into_discipline)
        .collect())
}

pub fn parse_projects(body: &str) -> Result<Vec<Project>> {
    Ok(parse_listing::<ProjectDto>(body)?
        .into_iter()
        .map(ProjectDto::into_project)
        .collect())
}
