//! # Discipline Service
//!
//! Workflows over the remote API:
//!
//! ```text
//!   create:   list snapshot ──> allocate code ──> POST
//!   projects: password grant ──> GET /project (bearer)
//! ```
//!
//! [`DisciplineService`] sequences the calls. [`DisciplineStore`] holds the
//! view state as versioned snapshots. [`DisciplineController`] ties the two
//! to a view's lifetime, so results that arrive after the view is gone
//! never reach the store.

pub mod controller;
pub mod service;
pub mod store;

#[cfg(test)]
mod fake;

pub use controller::DisciplineController;
pub use service::{DisciplineService, ServicePolicy};
pub use store::{Action, DisciplineStore, StoreState};
