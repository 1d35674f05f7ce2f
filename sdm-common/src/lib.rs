//! # SDM Common Library
//!
//! Record/grade consistency engine for the student data manager:
//! - Entity model (students, subjects, grades)
//! - In-memory repository with pagination
//! - Persistence adapter for the students/subjects/grades relations
//! - Session operations that keep memory and storage in step
//! - Configuration loading

pub mod config;
pub mod error;
pub mod id;
pub mod model;
pub mod pagination;
pub mod repository;
pub mod session;
pub mod storage;
pub mod time;

pub use error::{Error, Result};
pub use model::{Course, Gender, Grade, PersonalDetails, Student, Subject};
pub use repository::Repository;
pub use session::Session;
pub use storage::RecordStore;
