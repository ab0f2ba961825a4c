//! Wire types and endpoint methods, one module per API area

pub mod blob_store;
pub mod capability;
pub mod repository;
pub mod routing_rule;
pub mod security;
pub mod task;

pub use blob_store::*;
pub use capability::*;
pub use repository::*;
pub use routing_rule::*;
pub use security::*;
pub use task::*;
