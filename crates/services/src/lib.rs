pub mod auth;
pub mod authz;
pub mod dao;
pub mod google;
pub mod storage;

pub use auth::AuthService;
pub use dao::*;
pub use google::GoogleVerifier;
pub use storage::BlobStorage;
