//! Command implementations.

pub mod aggregate;
pub mod deniability;
pub mod detect;
pub mod extract;
pub mod query;
pub mod verify;

pub use self::aggregate::execute_aggregate;
pub use self::deniability::execute_deniability;
pub use self::detect::execute_detect;
pub use self::extract::execute_extract;
pub use self::query::execute_query;
pub use self::verify::execute_verify;
