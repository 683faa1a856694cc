//! SQL safety gate for generated farm queries.
//!
//! Two validation policies over the same concerns (read-only, single
//! statement, bounded result):
//! - **AST** (`ast`): parses the statement and proves a user ownership filter
//!   is present.
//! - **Screen** (`screen`): cheap text screen for callers whose query builder
//!   already scopes by user.
//!
//! `SafeExecutor` re-validates every statement before handing it to a
//! `DataStore` and normalizes whatever the store returns into rows.

pub mod ast;
pub mod error;
pub mod executor;
pub mod mock;
pub mod screen;
pub mod store;
pub mod validator;

pub use error::{ExecutionError, StoreError};
pub use executor::SafeExecutor;
pub use mock::MockStore;
pub use store::{DataStore, PgStore, normalize_rows};
pub use validator::{DEFAULT_OWNERSHIP_COLUMNS, PolicyKind, QueryValidator, ScreenMode};
