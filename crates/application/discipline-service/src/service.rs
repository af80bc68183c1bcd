//! Discipline workflows over a [`DisciplineApi`]

use std::sync::Arc;

use discipline_api::DisciplineApi;
use discipline_config::ApiConfig;
use discipline_core::{
    allocate_code, filter_disciplines, validate_draft, validate_record, Discipline,
    DisciplineDraft, Project, Result,
};

/// Request policy taken from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServicePolicy {
    /// Records requested for a snapshot; must cover the whole collection
    pub page_size: u32,
    pub require_project: bool,
}

impl Default for ServicePolicy {
    fn default() -> Self {
        Self {
            page_size: 500,
            require_project: true,
        }
    }
}

impl From<&ApiConfig> for ServicePolicy {
    fn from(config: &ApiConfig) -> Self {
        Self {
            page_size: config.page_size,
            require_project: config.require_project,
        }
    }
}

/// CRUD and project lookup for the discipline views
pub struct DisciplineService<A> {
    api: Arc<A>,
    policy: ServicePolicy,
}

impl<A> Clone for DisciplineService<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            policy: self.policy,
        }
    }
}

impl<A: DisciplineApi> DisciplineService<A> {
    pub fn new(api: A, policy: ServicePolicy) -> Self {
        Self::shared(Arc::new(api), policy)
    }

    pub fn shared(api: Arc<A>, policy: ServicePolicy) -> Self {
        Self { api, policy }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn policy(&self) -> ServicePolicy {
        self.policy
    }

    /// Full snapshot of the collection
    pub async fn list(&self) -> Result<Vec<Discipline>> {
        self.api.list_disciplines(self.policy.page_size).await
    }

    /// `Ok(None)` when the record does not exist
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Discipline>> {
        self.api.get_discipline(id).await
    }

    /// Allocate a code against a fresh snapshot, then create.
    ///
    /// A duplicate name fails before the create endpoint is called.
    pub async fn create(&self, draft: DisciplineDraft) -> Result<Discipline> {
        validate_draft(&draft, self.policy.require_project)?;

        let snapshot = self.list().await?;
        let allocated = allocate_code(&snapshot, draft)?;

        let created = self.api.create_discipline(&allocated).await?;
        tracing::info!(id = %created.id, code = %created.code, "discipline created");
        Ok(created)
    }

    /// Submit the full record, code included. The server decides whether a
    /// changed code is acceptable.
    pub async fn update(&self, id: &str, record: &Discipline) -> Result<Discipline> {
        validate_record(record, self.policy.require_project)?;

        let updated = self.api.update_discipline(id, record).await?;
        tracing::info!(%id, code = %updated.code, "discipline updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.api.delete_discipline(id).await?;
        tracing::info!(%id, "discipline deleted");
        Ok(())
    }

    /// Projects for the selection control. Any failure, including the token
    /// exchange, yields an empty list.
    pub async fn get_projects(&self) -> Vec<Project> {
        let token = match self.api.fetch_token().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "token exchange failed, no projects");
                return Vec::new();
            }
        };

        match self.api.list_projects(&token).await {
            Ok(projects) => projects,
            Err(e) => {
                tracing::warn!(error = %e, "project fetch failed, no projects");
                Vec::new()
            }
        }
    }

    /// List-view filter over code, name and description
    pub fn search<'a>(list: &'a [Discipline], query: &str) -> Vec<&'a Discipline> {
        filter_disciplines(list, query)
    }
}
