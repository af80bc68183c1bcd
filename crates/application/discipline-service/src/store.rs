//! View state container
//!
//! One writer, many readers. Every dispatch replaces the current state with
//! a new immutable snapshot and bumps its version; readers hold `Arc`s to
//! whichever snapshot they last saw.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use discipline_core::Discipline;
use tokio::sync::watch;

/// State shared by the discipline views
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    /// Incremented once per dispatch
    pub version: u64,
    pub list: Vec<Discipline>,
    pub selected: Option<Discipline>,
    pub loading: bool,
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// State transitions
#[derive(Debug, Clone)]
pub enum Action {
    SetList(Vec<Discipline>),
    SetSelected(Option<Discipline>),
    SetLoading(bool),
    SetError(Option<String>),
    /// Insert or replace one record in the list, matched by id
    Upsert(Discipline),
}

impl StoreState {
    /// The reducer. The only place state changes.
    fn apply(&mut self, action: Action) {
        match action {
            Action::SetList(list) => self.list = list,
            Action::SetSelected(selected) => self.selected = selected,
            Action::SetLoading(loading) => self.loading = loading,
            Action::SetError(error) => self.error = error,
            Action::Upsert(record) => {
                if let Some(selected) = self.selected.as_mut().filter(|s| s.id == record.id) {
                    *selected = record.clone();
                }
                match self.list.iter_mut().find(|d| d.id == record.id) {
                    Some(existing) => *existing = record,
                    None => self.list.push(record),
                }
            }
        }
    }

    pub fn find(&self, id: &str) -> Option<&Discipline> {
        self.list.iter().find(|d| d.id == id)
    }
}

/// Owner of the view state
pub struct DisciplineStore {
    tx: watch::Sender<Arc<StoreState>>,
}

impl Default for DisciplineStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DisciplineStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::new(StoreState::default()));
        Self { tx }
    }

    pub fn dispatch(&self, action: Action) -> u64 {
        self.dispatch_all([action])
    }

    /// Apply several actions as one new snapshot. Returns its version.
    pub fn dispatch_all<I>(&self, actions: I) -> u64
    where
        I: IntoIterator<Item = Action>,
    {
        let mut version = 0;
        self.tx.send_modify(|current| {
            let mut next = StoreState::clone(current);
            for action in actions {
                next.apply(action);
            }
            next.version += 1;
            next.updated_at = Some(Utc::now());
            version = next.version;
            *current = Arc::new(next);
        });
        version
    }

    pub fn snapshot(&self) -> Arc<StoreState> {
        self.tx.borrow().clone()
    }

    /// Receiver that wakes on every dispatch
    pub fn subscribe(&self) -> watch::Receiver<Arc<StoreState>> {
        self.tx.subscribe()
    }
}
