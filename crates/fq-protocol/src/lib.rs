pub mod entities;
pub mod execution;
pub mod intent;
pub mod response;
pub mod validation;

pub use entities::*;
pub use execution::*;
pub use intent::*;
pub use response::*;
pub use validation::*;
