//! View-scoped operations
//!
//! A controller lives as long as the view that created it. Closing (or
//! dropping) it cancels in-flight calls; anything that resolves afterwards is
//! discarded before it can touch the store.

use std::future::Future;
use std::sync::Arc;

use discipline_api::DisciplineApi;
use discipline_core::{Discipline, DisciplineDraft, Error, Project, Result};
use tokio_util::sync::CancellationToken;

use crate::service::DisciplineService;
use crate::store::{Action, DisciplineStore};

pub struct DisciplineController<A> {
    service: DisciplineService<A>,
    store: Arc<DisciplineStore>,
    token: CancellationToken,
}

impl<A: DisciplineApi> DisciplineController<A> {
    pub fn new(service: DisciplineService<A>, store: Arc<DisciplineStore>) -> Self {
        Self {
            service,
            store,
            token: CancellationToken::new(),
        }
    }

    pub fn store(&self) -> &Arc<DisciplineStore> {
        &self.store
    }

    pub fn service(&self) -> &DisciplineService<A> {
        &self.service
    }

    /// Handle for tearing the view down from elsewhere
    pub fn cancellation(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_live(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn close(&self) {
        self.token.cancel();
    }

    /// Race `fut` against cancellation
    async fn guarded<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Error::Cancelled),
            result = fut => {
                if self.is_live() { result } else { Err(Error::Cancelled) }
            }
        }
    }

    /// Dispatch only while the view is alive
    fn commit<I>(&self, actions: I) -> bool
    where
        I: IntoIterator<Item = Action>,
    {
        if !self.is_live() {
            tracing::debug!("view closed, dropping state update");
            return false;
        }
        self.store.dispatch_all(actions);
        true
    }

    /// Record a failure in the store and hand it back
    fn fail<T>(&self, error: Error) -> Result<T> {
        if !matches!(error, Error::Cancelled) {
            self.commit([Action::SetError(Some(error.to_string())), Action::SetLoading(false)]);
        }
        Err(error)
    }

    pub async fn load_list(&self) -> Result<Vec<Discipline>> {
        self.commit([Action::SetLoading(true)]);

        match self.guarded(self.service.list()).await {
            Ok(list) => {
                self.commit([
                    Action::SetList(list.clone()),
                    Action::SetError(None),
                    Action::SetLoading(false),
                ]);
                Ok(list)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Load one record into `selected`. `Ok(None)` clears the selection.
    pub async fn load_selected(&self, id: &str) -> Result<Option<Discipline>> {
        self.commit([Action::SetLoading(true)]);

        match self.guarded(self.service.get_by_id(id)).await {
            Ok(found) => {
                self.commit([
                    Action::SetSelected(found.clone()),
                    Action::SetError(None),
                    Action::SetLoading(false),
                ]);
                Ok(found)
            }
            Err(e) => self.fail(e),
        }
    }

    pub async fn create(&self, draft: DisciplineDraft) -> Result<Discipline> {
        self.commit([Action::SetLoading(true)]);

        match self.guarded(self.service.create(draft)).await {
            Ok(created) => {
                self.commit([
                    Action::Upsert(created.clone()),
                    Action::SetError(None),
                    Action::SetLoading(false),
                ]);
                Ok(created)
            }
            Err(e) => self.fail(e),
        }
    }

    pub async fn update(&self, id: &str, record: &Discipline) -> Result<Discipline> {
        self.commit([Action::SetLoading(true)]);

        match self.guarded(self.service.update(id, record)).await {
            Ok(updated) => {
                self.commit([
                    Action::Upsert(updated.clone()),
                    Action::SetError(None),
                    Action::SetLoading(false),
                ]);
                Ok(updated)
            }
            Err(e) => self.fail(e),
        }
    }

    /// Delete, then reload the list.
    ///
    /// Once the delete itself succeeds the call is `Ok`. A failed reload
    /// only shows up in the store's `error`.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.commit([Action::SetLoading(true)]);

        if let Err(e) = self.guarded(self.service.delete(id)).await {
            return self.fail(e);
        }
        if let Err(e) = self.load_list().await {
            tracing::warn!(%id, error = %e, "deleted, but reloading the list failed");
        }
        Ok(())
    }

    /// Projects for the selection control; empty on any remote failure.
    /// Drives `loading` only, since project failures are not errors.
    pub async fn load_projects(&self) -> Result<Vec<Project>> {
        self.commit([Action::SetLoading(true)]);

        let projects = self
            .guarded(async { Ok(self.service.get_projects().await) })
            .await?;
        self.commit([Action::SetLoading(false)]);
        Ok(projects)
    }
}

impl<A> Drop for DisciplineController<A> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
