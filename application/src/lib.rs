pub mod dto;
pub mod error;
pub mod profile_store;
pub mod usecase;

pub use dto::*;
pub use error::ApplicationError;
pub use profile_store::ProfileStore;
pub use usecase::*;
