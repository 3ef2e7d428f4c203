//! Grocery List Client
//!
//! Layered architecture:
//! - domain: Entities, identifiers and input validation
//! - repository: Owner-scoped data access (hosted REST store, in-memory)
//! - context: Session guard and explicit session lifecycle
//! - auth: Sign-up, sign-in and token management
//! - store: List view-model with optimistic updates

pub mod auth;
pub mod config;
pub mod context;
pub mod domain;
mod remote;
pub mod repository;
pub mod session_file;
pub mod store;

pub use auth::{Authenticator, RestAuthClient, SignUpOutcome};
pub use config::StoreConfig;
pub use context::{SessionContext, SessionGuard};
pub use domain::{DomainError, DomainResult};
pub use session_file::SessionFile;
pub use store::{GroceryList, ListSummary};
