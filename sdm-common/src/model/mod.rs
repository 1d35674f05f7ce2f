//! In-memory entity model
//!
//! Strict ownership tree: a [`Student`] owns its [`Subject`]s, and each
//! subject owns at most one [`Grade`].

mod grade;
mod student;
mod subject;

pub use grade::Grade;
pub use student::{Course, Gender, PersonalDetails, Student};
pub use subject::Subject;

#[cfg(test)]
pub(crate) use student::tests::details as test_details;
