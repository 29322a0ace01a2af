//! Persistence for users, animals and training logs.
//!
//! Backed by libsql, which covers three deployments with one client:
//! - **Memory**: `:memory:` database, used by tests and throwaway runs
//! - **SQLite**: a local database file (default `./data/trainlog.db`)
//! - **Turso**: a remote libsql database, selected through environment variables
//!
//! Handlers only see the [`DatabaseClient`] trait.

#![allow(missing_docs)]

pub mod traits;
pub mod turso;

pub use traits::{DatabaseClient, DatabaseProvider};
pub use turso::TursoClient;
