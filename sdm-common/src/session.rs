//! Caller-facing operations over a loaded repository
//!
//! Every mutating operation changes memory first, then persists the affected
//! relations. If persistence fails the memory change is undone before the
//! error is returned, so the repository always matches what the caller saw
//! succeed.

use tracing::{error, info, warn};

use crate::model::{Grade, PersonalDetails, Student, Subject};
use crate::repository::Repository;
use crate::storage::{codec, FlushReport, LoadReport, RecordStore};
use crate::{id, Error, Result};

/// A repository paired with the store it was loaded from
#[derive(Debug)]
pub struct Session {
    store: RecordStore,
    repository: Repository,
    closed: bool,
}

impl Session {
    /// Load all relations from `store`
    pub fn open(store: RecordStore) -> Result<(Self, LoadReport)> {
        let (repository, report) = store.load_all()?;
        Ok((
            Self {
                store,
                repository,
                closed: false,
            },
            report,
        ))
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    fn student_mut(&mut self, id: &str) -> Result<&mut Student> {
        self.repository
            .find_by_id_mut(id)
            .ok_or_else(|| Error::NotFound(format!("student {}", id)))
    }

    /// Create a student with a fresh ID and persist the students relation
    pub fn add_student(&mut self, details: PersonalDetails) -> Result<String> {
        check_details(&details)?;
        let id = id::generate(&self.repository)?;
        self.repository.add(Student::new(id.clone(), details))?;

        if let Err(e) = self.store.save_students(&self.repository) {
            self.repository.pop();
            return Err(e);
        }
        info!("Added student {}", id);
        Ok(id)
    }

    /// Replace a student's personal details and persist the students relation
    pub fn update_student(&mut self, id: &str, details: PersonalDetails) -> Result<()> {
        check_details(&details)?;
        let student = self.student_mut(id)?;
        let previous = student.details().clone();
        student.set_details(details);

        if let Err(e) = self.store.save_students(&self.repository) {
            if let Some(student) = self.repository.find_by_id_mut(id) {
                student.set_details(previous);
            }
            return Err(e);
        }
        info!("Updated student {}", id);
        Ok(())
    }

    /// Delete a student and cascade to its subject and grade rows
    pub fn delete_student(&mut self, id: &str) -> Result<Student> {
        let (index, student) = self
            .repository
            .remove(id)
            .ok_or_else(|| Error::NotFound(format!("student {}", id)))?;

        let persisted = self
            .store
            .save_students(&self.repository)
            .and_then(|_| self.store.save_subjects(&self.repository))
            .and_then(|_| self.store.remove_grade_rows(id, None));

        match persisted {
            Ok(removed_grades) => {
                info!(
                    "Deleted student {} ({} subjects, {} grade rows)",
                    id,
                    student.subjects().len(),
                    removed_grades
                );
                Ok(student)
            }
            Err(e) => {
                self.repository.insert_at(index, student);
                self.resync_after_failure();
                Err(e)
            }
        }
    }

    /// Enroll a student in a subject and persist the subjects relation
    ///
    /// # Errors
    ///
    /// `DuplicateKey` if the student already has a subject with this name or
    /// course number.
    pub fn add_subject(
        &mut self,
        id: &str,
        name: &str,
        course_number: &str,
        instructor_name: &str,
    ) -> Result<()> {
        codec::check_field("subject name", name)?;
        codec::check_field("course number", course_number)?;
        codec::check_field("instructor name", instructor_name)?;
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("subject name is empty".to_string()));
        }

        let student = self.student_mut(id)?;
        if student.subject_by_name(name).is_some() {
            return Err(Error::DuplicateKey {
                student_id: id.to_string(),
                subject: name.to_string(),
            });
        }
        if let Some(existing) = student.subject_by_course_number(course_number) {
            return Err(Error::DuplicateKey {
                student_id: id.to_string(),
                subject: format!("course number {} ({})", course_number, existing.name),
            });
        }
        student.add_subject(Subject::new(name, course_number, instructor_name));

        if let Err(e) = self.store.save_subjects(&self.repository) {
            if let Some(student) = self.repository.find_by_id_mut(id) {
                student.pop_subject();
            }
            return Err(e);
        }
        info!("Added subject '{}' to student {}", name, id);
        Ok(())
    }

    /// Record scores for a subject and merge them into the grades relation
    pub fn record_grade(
        &mut self,
        id: &str,
        subject_name: &str,
        prelim: u32,
        midterm: u32,
        final_exam: u32,
    ) -> Result<Grade> {
        let student = self.student_mut(id)?;
        let previous = student
            .subject_by_name(subject_name)
            .and_then(|s| s.grade().copied());
        let grade = student.record_grade(subject_name, prelim, midterm, final_exam)?;

        if let Err(e) = self.store.flush_grades(&self.repository) {
            if let Some(subject) = self
                .repository
                .find_by_id_mut(id)
                .and_then(|s| s.subject_by_name_mut(subject_name))
            {
                subject.restore_grade(previous);
            }
            return Err(e);
        }
        Ok(grade)
    }

    /// Remove a subject, drop its grade row, then save everything
    pub fn delete_subject(&mut self, id: &str, subject_name: &str) -> Result<Subject> {
        let student = self.student_mut(id)?;
        let index = student
            .subjects()
            .iter()
            .position(|s| s.name == subject_name)
            .ok_or_else(|| Error::NotFound(format!("subject '{}' for student {}", subject_name, id)))?;
        let subject = student
            .remove_subject(subject_name)
            .ok_or_else(|| Error::NotFound(format!("subject '{}'", subject_name)))?;

        let persisted = self
            .store
            .remove_grade_rows(id, Some(subject_name))
            .and_then(|_| self.store.save_all(&self.repository));

        match persisted {
            Ok(_) => {
                info!("Deleted subject '{}' of student {}", subject_name, id);
                Ok(subject)
            }
            Err(e) => {
                if let Some(student) = self.repository.find_by_id_mut(id) {
                    student.insert_subject(index, subject);
                }
                self.resync_after_failure();
                Err(e)
            }
        }
    }

    /// Merge pending grade changes into the grades relation
    pub fn flush_grades(&self) -> Result<FlushReport> {
        self.store.flush_grades(&self.repository)
    }

    /// Write all three relations
    pub fn save_all(&self) -> Result<FlushReport> {
        self.store.save_all(&self.repository)
    }

    /// Final save, run once on every exit path. Later calls do nothing.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        match self.store.save_all(&self.repository) {
            Ok(_) => {
                info!("Session closed, {} students saved", self.repository.len());
                Ok(())
            }
            Err(e) => {
                error!("Final save failed: {}", e);
                Err(e)
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // A multi-file operation may have rewritten some relations before
    // failing. Put them back in line with the restored memory state.
    fn resync_after_failure(&self) {
        if let Err(e) = self.store.save_all(&self.repository) {
            warn!("Could not resync relations after failed write: {}", e);
        }
    }
}

fn check_details(details: &PersonalDetails) -> Result<()> {
    for (label, value) in details.text_fields() {
        codec::check_field(label, value)?;
    }
    Ok(())
}
