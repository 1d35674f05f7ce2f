//! Persistence adapter for the three relations
//!
//! Maps between the flat students/subjects/grades files and the
//! [`Repository`] object graph. There is no transaction across files; each
//! relation is written on its own, and every rewrite is atomic per file.
//!
//! Load order matters: students first, then subjects joined on student ID,
//! then grades joined on `(student ID, subject name)`. Rows that fail to join
//! are dropped; rows that fail to parse are logged and skipped.

pub mod atomic;
pub mod codec;

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::FileNames;
use crate::repository::Repository;
use crate::{Error, Result};

/// Counters from one [`RecordStore::load_all`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub students: usize,
    pub subjects: usize,
    pub grades: usize,
    /// Rows skipped because they did not parse or duplicated a student ID
    pub skipped_rows: usize,
    /// Subject rows whose student does not exist
    pub orphaned_subjects: usize,
    /// Grade rows whose student or subject does not exist
    pub orphaned_grades: usize,
}

/// Counters from one grades merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Existing rows overwritten with different values
    pub updated: usize,
    /// New rows added at the end
    pub appended: usize,
    /// Extra rows dropped because their key was already present
    pub duplicates_removed: usize,
}

impl FlushReport {
    pub fn changed(&self) -> bool {
        self.updated + self.appended + self.duplicates_removed > 0
    }
}

/// File-backed store for the students, subjects and grades relations
#[derive(Debug, Clone)]
pub struct RecordStore {
    students_path: PathBuf,
    subjects_path: PathBuf,
    grades_path: PathBuf,
}

impl RecordStore {
    /// Store using the default file names inside `data_folder`
    pub fn new(data_folder: impl AsRef<Path>) -> Self {
        Self::with_file_names(data_folder, &FileNames::default())
    }

    pub fn with_file_names(data_folder: impl AsRef<Path>, files: &FileNames) -> Self {
        let folder = data_folder.as_ref();
        Self {
            students_path: folder.join(&files.students),
            subjects_path: folder.join(&files.subjects),
            grades_path: folder.join(&files.grades),
        }
    }

    pub fn students_path(&self) -> &Path {
        &self.students_path
    }

    pub fn subjects_path(&self) -> &Path {
        &self.subjects_path
    }

    pub fn grades_path(&self) -> &Path {
        &self.grades_path
    }

    /// Load all three relations into a new repository
    ///
    /// # Errors
    ///
    /// Only I/O failures. A missing file counts as an empty relation.
    pub fn load_all(&self) -> Result<(Repository, LoadReport)> {
        let student_lines = atomic::read_lines(&self.students_path)?;
        let subject_lines = atomic::read_lines(&self.subjects_path)?;
        let grade_lines = atomic::read_lines(&self.grades_path)?;

        let mut repository = Repository::new();
        let mut report = LoadReport::default();

        load_students(&student_lines, &mut repository, &mut report);
        load_subjects(&subject_lines, &mut repository, &mut report);
        load_grades(&grade_lines, &mut repository, &mut report);

        info!(
            "Loaded {} students, {} subjects, {} grades ({} skipped, {} orphaned subjects, {} orphaned grades)",
            report.students,
            report.subjects,
            report.grades,
            report.skipped_rows,
            report.orphaned_subjects,
            report.orphaned_grades
        );
        Ok((repository, report))
    }

    /// Rewrite the students relation: header plus one row per student
    pub fn save_students(&self, repository: &Repository) -> Result<()> {
        let rows = repository.iter().map(codec::encode_student);
        let lines = std::iter::once(codec::STUDENTS_HEADER.to_string()).chain(rows);
        atomic::write_lines(&self.students_path, lines)?;
        debug!("Wrote {} students to {}", repository.len(), self.students_path.display());
        Ok(())
    }

    /// Rewrite the subjects relation from the object graph
    pub fn save_subjects(&self, repository: &Repository) -> Result<()> {
        let lines: Vec<String> = repository
            .iter()
            .flat_map(|student| {
                student
                    .subjects()
                    .iter()
                    .map(move |subject| codec::encode_subject(student.id(), subject))
            })
            .collect();
        atomic::write_lines(&self.subjects_path, &lines)?;
        debug!("Wrote {} subjects to {}", lines.len(), self.subjects_path.display());
        Ok(())
    }

    /// Merge graded subjects into the grades relation
    ///
    /// The first row with a matching `(student ID, subject name)` is
    /// overwritten in place, later rows with that key are dropped, and
    /// unmatched grades are appended. Rows for keys not in memory are kept
    /// verbatim. The file is only rewritten when something changed.
    pub fn flush_grades(&self, repository: &Repository) -> Result<FlushReport> {
        let mut lines = atomic::read_lines(&self.grades_path)?;
        let mut appended = Vec::new();
        let mut report = FlushReport::default();

        for student in repository.iter() {
            for subject in student.subjects() {
                let Some(grade) = subject.grade() else {
                    continue;
                };
                let row = codec::encode_grade(student.id(), &subject.name, grade);

                let positions: Vec<usize> = lines
                    .iter()
                    .enumerate()
                    .filter(|(_, line)| {
                        codec::grade_row_key(line) == Some((student.id(), subject.name.as_str()))
                    })
                    .map(|(i, _)| i)
                    .collect();

                match positions.split_first() {
                    None => appended.push(row),
                    Some((&first, rest)) => {
                        for &i in rest.iter().rev() {
                            lines.remove(i);
                            report.duplicates_removed += 1;
                        }
                        if lines[first] != row {
                            lines[first] = row;
                            report.updated += 1;
                        }
                    }
                }
            }
        }

        report.appended = appended.len();
        lines.extend(appended);

        if report.changed() {
            atomic::write_lines(&self.grades_path, &lines)?;
            info!(
                "Grades merged: {} updated, {} appended, {} duplicates removed",
                report.updated, report.appended, report.duplicates_removed
            );
        } else {
            debug!("Grades relation already up to date");
        }
        Ok(report)
    }

    /// Drop grade rows of a student, or of one of its subjects
    ///
    /// Returns the number of rows removed.
    pub fn remove_grade_rows(&self, student_id: &str, subject_name: Option<&str>) -> Result<usize> {
        let mut lines = atomic::read_lines(&self.grades_path)?;
        let before = lines.len();
        lines.retain(|line| match codec::grade_row_key(line) {
            Some((id, name)) => id != student_id || subject_name.is_some_and(|s| s != name),
            None => true,
        });

        let removed = before - lines.len();
        if removed > 0 {
            atomic::write_lines(&self.grades_path, &lines)?;
            debug!("Removed {} grade rows for student {}", removed, student_id);
        }
        Ok(removed)
    }

    /// Write everything: students, subjects, then the grades merge
    pub fn save_all(&self, repository: &Repository) -> Result<FlushReport> {
        self.save_students(repository)?;
        self.save_subjects(repository)?;
        self.flush_grades(repository)
    }
}

fn load_students(lines: &[String], repository: &mut Repository, report: &mut LoadReport) {
    // First line is the header
    for (number, line) in lines.iter().enumerate().skip(1) {
        let student = match codec::decode_student(line) {
            Ok(student) => student,
            Err(e) => {
                warn!("Skipping students line {}: {}", number + 1, e);
                report.skipped_rows += 1;
                continue;
            }
        };
        match repository.add(student) {
            Ok(()) => report.students += 1,
            Err(e @ Error::DuplicateKey { .. }) => {
                warn!("Skipping students line {}: {}", number + 1, e);
                report.skipped_rows += 1;
            }
            Err(e) => warn!("Skipping students line {}: {}", number + 1, e),
        }
    }
}

fn load_subjects(lines: &[String], repository: &mut Repository, report: &mut LoadReport) {
    for (number, line) in lines.iter().enumerate() {
        let row = match codec::decode_subject(line) {
            Ok(row) => row,
            Err(e) => {
                warn!("Skipping subjects line {}: {}", number + 1, e);
                report.skipped_rows += 1;
                continue;
            }
        };
        match repository.find_by_id_mut(&row.student_id) {
            Some(student) => {
                student.add_subject(row.subject);
                report.subjects += 1;
            }
            None => {
                debug!(
                    "Dropping subject '{}' of unknown student {}",
                    row.subject.name, row.student_id
                );
                report.orphaned_subjects += 1;
            }
        }
    }
}

fn load_grades(lines: &[String], repository: &mut Repository, report: &mut LoadReport) {
    for (number, line) in lines.iter().enumerate() {
        let row = match codec::decode_grade(line) {
            Ok(row) => row,
            Err(e) => {
                warn!("Skipping grades line {}: {}", number + 1, e);
                report.skipped_rows += 1;
                continue;
            }
        };
        let subject = repository
            .find_by_id_mut(&row.student_id)
            .and_then(|student| student.subject_by_name_mut(&row.subject_name));
        match subject {
            Some(subject) => {
                subject.set_grade(row.grade);
                report.grades += 1;
            }
            None => {
                debug!(
                    "Dropping grade for unknown subject '{}' of student {}",
                    row.subject_name, row.student_id
                );
                report.orphaned_grades += 1;
            }
        }
    }
}
