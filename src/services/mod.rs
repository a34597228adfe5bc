pub mod chat_service;
pub mod insights_service;
pub mod suggestions;

pub use chat_service::*;
pub use insights_service::*;
pub use suggestions::*;
