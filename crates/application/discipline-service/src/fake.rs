//! In-memory [`DisciplineApi`] double for unit tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use discipline_api::DisciplineApi;
use discipline_core::{AllocatedDiscipline, Discipline, Error, Project, ProjectRef, Result};
use tokio::sync::Notify;

pub fn record(code: &str, name: &str) -> Discipline {
    Discipline {
        id: format!("id-{code}"),
        code: code.into(),
        name: name.into(),
        description: String::new(),
        is_active: true,
        project: None,
        sort_order: None,
    }
}

#[derive(Default)]
pub struct FakeApi {
    pub records: Mutex<Vec<Discipline>>,
    pub projects: Vec<Project>,
    pub fail_list: bool,
    pub fail_token: bool,
    /// When set, list calls wait for a notification before answering
    pub gate: Option<Arc<Notify>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn with_records(records: Vec<Discipline>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DisciplineApi for FakeApi {
    async fn list_disciplines(&self, max_results: u32) -> Result<Vec<Discipline>> {
        self.log(format!("list:{max_results}"));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail_list {
            return Err(Error::Transport("HTTP 503 Service Unavailable".into()));
        }
        Ok(self.records.lock().unwrap().clone())
    }

    async fn get_discipline(&self, id: &str) -> Result<Option<Discipline>> {
        self.log(format!("get:{id}"));
        Ok(self.records.lock().unwrap().iter().find(|d| d.id == id).cloned())
    }

    async fn create_discipline(&self, allocated: &AllocatedDiscipline) -> Result<Discipline> {
        self.log(format!("create:{}", allocated.code));
        let draft = &allocated.draft;
        let created = Discipline {
            id: format!("id-{}", allocated.code),
            code: allocated.code.clone(),
            name: draft.name.clone(),
            description: draft.description.clone(),
            is_active: draft.is_active,
            project: draft.project_id.clone().map(ProjectRef::new),
            sort_order: None,
        };
        self.records.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_discipline(&self, id: &str, record: &Discipline) -> Result<Discipline> {
        self.log(format!("update:{id}"));
        let mut records = self.records.lock().unwrap();
        let existing = records
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| Error::Transport("HTTP 404 Not Found".into()))?;
        *existing = record.clone();
        Ok(record.clone())
    }

    async fn delete_discipline(&self, id: &str) -> Result<()> {
        self.log(format!("delete:{id}"));
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|d| d.id != id);
        if records.len() == before {
            return Err(Error::Transport("HTTP 404 Not Found".into()));
        }
        Ok(())
    }

    async fn fetch_token(&self) -> Result<String> {
        self.log("token".into());
        if self.fail_token {
            return Err(Error::Auth("HTTP 400 Bad Request: invalid_grant".into()));
        }
        Ok("fake-token".into())
    }

    async fn list_projects(&self, token: &str) -> Result<Vec<Project>> {
        self.log(format!("projects:{token}"));
        Ok(self.projects.clone())
    }
}
