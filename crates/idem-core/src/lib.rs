//! # idem-core
//!
//! Shared foundation for the idem identity engine:
//! - error taxonomy (`ErrorCode`, `HttpStatus`, `ApiError`, `IdemError`)
//! - the `User` model and the `UserStore` trait
//! - configuration (`IdemOptions`)
//! - the console logger and environment helpers

pub mod db;
pub mod env;
pub mod error;
pub mod logger;
pub mod options;

pub use db::models::{canonical_email, User, PLACEHOLDER_NAME};
pub use db::store::{StoreError, UserStore};
pub use error::{ApiError, ErrorCode, HttpStatus, IdemError, Result};
pub use logger::{AuthLogger, LogHandler, LogLevel, LoggerConfig};
pub use options::IdemOptions;
