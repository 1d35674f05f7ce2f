//! In-memory student repository
//!
//! The single source of truth for which students exist. Nothing here touches
//! storage; see [`crate::storage`] for that.

use tracing::debug;

use crate::model::Student;
use crate::pagination::{self, calculate_pagination};
use crate::{Error, Result};

/// Students in insertion order, unique by ID
#[derive(Debug, Clone, Default)]
pub struct Repository {
    students: Vec<Student>,
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn iter(&self) -> impl Iterator<Item = &Student> {
        self.students.iter()
    }

    /// Insert a student
    ///
    /// # Errors
    ///
    /// `DuplicateKey` if a student with the same ID already exists.
    pub fn add(&mut self, student: Student) -> Result<()> {
        if self.contains(student.id()) {
            return Err(Error::DuplicateKey {
                student_id: student.id().to_string(),
                subject: "student record".to_string(),
            });
        }
        debug!("Adding student {}", student.id());
        self.students.push(student);
        Ok(())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find_by_id(id).is_some()
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id() == id)
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Student> {
        self.students.iter_mut().find(|s| s.id() == id)
    }

    /// Exact, case-sensitive last name match
    pub fn find_by_last_name(&self, last_name: &str) -> Vec<&Student> {
        self.students
            .iter()
            .filter(|s| s.last_name() == last_name)
            .collect()
    }

    /// Case-insensitive first name match
    pub fn find_by_first_name(&self, first_name: &str) -> Vec<&Student> {
        let wanted = first_name.to_lowercase();
        self.students
            .iter()
            .filter(|s| s.first_name().to_lowercase() == wanted)
            .collect()
    }

    /// Remove a student from memory, returning it with its former index
    pub fn remove(&mut self, id: &str) -> Option<(usize, Student)> {
        let index = self.students.iter().position(|s| s.id() == id)?;
        Some((index, self.students.remove(index)))
    }

    /// Put a previously removed student back at its old position
    pub fn insert_at(&mut self, index: usize, student: Student) {
        let index = index.min(self.students.len());
        self.students.insert(index, student);
    }

    pub(crate) fn pop(&mut self) -> Option<Student> {
        self.students.pop()
    }

    pub fn total_pages(&self, page_size: usize) -> usize {
        pagination::total_pages(self.students.len(), page_size)
    }

    /// Students on 1-indexed `page`, or `None` if the page does not exist
    pub fn page(&self, page_size: usize, page: usize) -> Option<&[Student]> {
        let p = calculate_pagination(self.students.len(), page_size, page)?;
        Some(&self.students[p.offset..p.end])
    }
}
