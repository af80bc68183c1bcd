//! Remote API seam
//!
//! The service layer talks to this trait, so tests can swap the HTTP
//! client for an in-memory double.

use async_trait::async_trait;
use discipline_core::{AllocatedDiscipline, Discipline, Project, Result};

/// Operations the remote discipline API offers
#[async_trait]
pub trait DisciplineApi: Send + Sync {
    /// Up to `max_results` records, flattened from whichever shape the
    /// server returns
    async fn list_disciplines(&self, max_results: u32) -> Result<Vec<Discipline>>;

    /// `None` when the server has nothing for `id`
    async fn get_discipline(&self, id: &str) -> Result<Option<Discipline>>;

    async fn create_discipline(&self, allocated: &AllocatedDiscipline) -> Result<Discipline>;

    async fn update_discipline(&self, id: &str, record: &Discipline) -> Result<Discipline>;

    async fn delete_discipline(&self, id: &str) -> Result<()>;

    /// Password-grant exchange, returning the bearer token
    async fn fetch_token(&self) -> Result<String>;

    async fn list_projects(&self, token: &str) -> Result<Vec<Project>>;
}
