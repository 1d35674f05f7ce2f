//! Interactive console menus
//!
//! The session lock is taken per operation and never held while waiting for
//! input, so the exit path can always reach the session to finalize it.

use std::io::{self, BufRead, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use sdm_common::{Error, PersonalDetails, Session, Student};
use tracing::{info, warn};

use crate::prompt::Prompt;
use crate::validate::{normalize_date, parse_course, parse_gender, Rules};

const GENDER_MESSAGE: &str = "Gender must be either 'M', 'F', 'male' or 'female'.";
const COURSE_MESSAGE: &str = "Course must be one of: BSCS, BSIT, BSCoE.";

fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

fn is_eof(e: &anyhow::Error) -> bool {
    e.downcast_ref::<io::Error>()
        .is_some_and(|e| e.kind() == io::ErrorKind::UnexpectedEof)
}

/// Print a failed engine operation and carry on
fn report<T, W: Write>(out: &mut W, result: sdm_common::Result<T>) -> io::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!("Operation failed: {}", e);
            let message = match &e {
                Error::DuplicateKey { .. } => {
                    "A subject with that name or course number already exists for this student."
                        .to_string()
                }
                Error::Io(io) => format!("Could not write records ({}). Changes were not saved.", io),
                other => other.to_string(),
            };
            writeln!(out, "{}", message)?;
            Ok(None)
        }
    }
}

/// Bordered table with columns sized to their widest cell
fn write_table<W: Write>(out: &mut W, headers: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let border: String = widths
        .iter()
        .map(|w| format!("+{}", "-".repeat(w + 2)))
        .collect::<String>()
        + "+";
    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("| {:<width$} ", c, width = w))
            .collect::<String>()
            + "|"
    };

    writeln!(out, "{}", border)?;
    writeln!(out, "{}", line(headers.to_vec()))?;
    writeln!(out, "{}", border)?;
    for row in rows {
        writeln!(out, "{}", line(row.iter().map(String::as_str).collect()))?;
    }
    writeln!(out, "{}", border)
}

fn write_students<W: Write>(out: &mut W, students: &[Student]) -> io::Result<()> {
    let headers = [
        "ID", "Last Name", "First Name", "Middle Name", "Address", "Gender", "Phone", "Email",
        "Birth Date", "Course", "Enrolled",
    ];
    let rows: Vec<Vec<String>> = students
        .iter()
        .map(|s| {
            let d = s.details();
            vec![
                s.id().to_string(),
                d.last_name.clone(),
                d.first_name.clone(),
                d.middle_name.clone(),
                d.address.clone(),
                d.gender.to_string(),
                d.phone_number.clone(),
                d.email.clone(),
                d.date_of_birth.clone(),
                d.course.to_string(),
                d.date_of_enrollment.clone(),
            ]
        })
        .collect();
    write_table(out, &headers, &rows)
}

fn write_subjects<W: Write>(out: &mut W, student: &Student) -> io::Result<()> {
    if student.subjects().is_empty() {
        return writeln!(out, "No subjects enrolled.");
    }
    let headers = [
        "Subject", "Course No.", "Instructor", "Prelim", "Midterm", "Final", "Rating",
    ];
    let rows: Vec<Vec<String>> = student
        .subjects()
        .iter()
        .map(|s| {
            let scores = match s.grade() {
                Some(g) => [
                    g.prelim().to_string(),
                    g.midterm().to_string(),
                    g.final_exam().to_string(),
                    format!("{:.2}", g.final_rating()),
                ],
                None => ["-".to_string(), "-".to_string(), "-".to_string(), "-".to_string()],
            };
            let mut row = vec![
                s.name.clone(),
                s.course_number.clone(),
                s.instructor_name.clone(),
            ];
            row.extend(scores);
            row
        })
        .collect();
    write_table(out, &headers, &rows)
}

fn write_matches<W: Write>(out: &mut W, matches: &[&Student]) -> Result<()> {
    if matches.is_empty() {
        writeln!(out, "No students found.")?;
        return Ok(());
    }
    for student in matches {
        writeln!(out, "{}", student)?;
        write_subjects(out, student)?;
    }
    Ok(())
}

/// Menu driver over a shared session
pub struct Menu<'a, R, W> {
    prompt: Prompt<R, W>,
    session: &'a Mutex<Session>,
    rules: Rules,
    page_size: usize,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(prompt: Prompt<R, W>, session: &'a Mutex<Session>, rules: Rules, page_size: usize) -> Self {
        Self {
            prompt,
            session,
            rules,
            page_size,
        }
    }

    /// Run until the user exits or input closes
    pub fn run(&mut self) -> Result<()> {
        match self.main_menu() {
            Err(e) if is_eof(&e) => {
                info!("Input closed, leaving menu");
                Ok(())
            }
            other => other,
        }
    }

    fn main_menu(&mut self) -> Result<()> {
        loop {
            let out = self.prompt.out();
            writeln!(out, "Select an option:")?;
            writeln!(out, "[1] Show Students")?;
            writeln!(out, "[2] Add Student")?;
            writeln!(out, "[3] Search Students")?;
            writeln!(out, "[4] Exit")?;
            match self.prompt.choice()? {
                1 => self.show_students()?,
                2 => self.add_student()?,
                3 => self.search_students()?,
                4 => {
                    writeln!(self.prompt.out(), "Thanks for using the program!")?;
                    return Ok(());
                }
                _ => writeln!(self.prompt.out(), "Invalid choice. Try again.")?,
            }
        }
    }

    fn show_students(&mut self) -> Result<()> {
        let total = lock(self.session).repository().total_pages(self.page_size);
        if total == 0 {
            writeln!(self.prompt.out(), "No students found.")?;
            return Ok(());
        }
        let label = format!("Enter page no (1-{}): ", total);
        let mut page = self.prompt.number(&label, 1..=total as u32)? as usize;

        loop {
            let total = {
                let session = lock(self.session);
                let repository = session.repository();
                let total = repository.total_pages(self.page_size);
                if total == 0 {
                    writeln!(self.prompt.out(), "No students found.")?;
                    return Ok(());
                }
                page = page.min(total);
                let students = repository.page(self.page_size, page).unwrap_or_default();
                let out = self.prompt.out();
                write_students(out, students)?;
                writeln!(out, "Page {} of {}", page, total)?;
                total
            };

            let out = self.prompt.out();
            writeln!(out, "[1] Next page")?;
            writeln!(out, "[2] Previous page")?;
            writeln!(out, "[3] Select student by ID")?;
            writeln!(out, "[4] Back")?;
            match self.prompt.choice()? {
                1 if page < total => page += 1,
                1 => writeln!(self.prompt.out(), "Already on the last page.")?,
                2 if page > 1 => page -= 1,
                2 => writeln!(self.prompt.out(), "Already on the first page.")?,
                3 => {
                    let id = self.prompt.line("Enter student ID: ")?;
                    self.open_student(&id)?;
                }
                4 => return Ok(()),
                _ => writeln!(self.prompt.out(), "Invalid choice. Try again.")?,
            }
        }
    }

    fn open_student(&mut self, id: &str) -> Result<()> {
        if lock(self.session).repository().contains(id) {
            self.student_menu(id)
        } else {
            writeln!(self.prompt.out(), "Student not found.")?;
            Ok(())
        }
    }

    fn student_menu(&mut self, id: &str) -> Result<()> {
        loop {
            {
                let session = lock(self.session);
                let Some(student) = session.repository().find_by_id(id) else {
                    return Ok(());
                };
                let out = self.prompt.out();
                writeln!(out, "{}", student)?;
                write_subjects(out, student)?;
            }

            let out = self.prompt.out();
            writeln!(out, "Select an option:")?;
            writeln!(out, "[1] Edit Student")?;
            writeln!(out, "[2] Delete Student")?;
            writeln!(out, "[3] Subjects")?;
            writeln!(out, "[4] Back")?;
            match self.prompt.choice()? {
                1 => self.edit_student(id)?,
                2 => {
                    if self.delete_student(id)? {
                        return Ok(());
                    }
                }
                3 => self.subjects_menu(id)?,
                4 => return Ok(()),
                _ => writeln!(self.prompt.out(), "Invalid choice. Try again.")?,
            }
        }
    }

    fn add_student(&mut self) -> Result<()> {
        writeln!(self.prompt.out(), "Enter student details:")?;
        let rules = &self.rules;
        let prompt = &mut self.prompt;

        let details = PersonalDetails {
            last_name: prompt.matching("Last name: ", &rules.name)?,
            first_name: prompt.matching("First name: ", &rules.name)?,
            middle_name: prompt.matching("Middle name: ", &rules.name)?,
            address: prompt.matching("Address: ", &rules.address)?,
            gender: prompt.parsed("Gender: ", GENDER_MESSAGE, parse_gender)?,
            phone_number: prompt.matching("Phone number: ", &rules.phone)?,
            email: prompt.matching("Email: ", &rules.email)?,
            date_of_birth: normalize_date(&prompt.matching("Date of Birth (MM/DD/YYYY): ", &rules.date)?),
            course: prompt.parsed("Course: ", COURSE_MESSAGE, parse_course)?,
            date_of_enrollment: normalize_date(
                &prompt.matching("Date of Enrollment (MM/DD/YYYY): ", &rules.date)?,
            ),
        };

        let result = lock(self.session).add_student(details);
        if let Some(id) = report(self.prompt.out(), result)? {
            writeln!(self.prompt.out(), "Student created with ID {}.", id)?;
        }
        Ok(())
    }

    fn edit_student(&mut self, id: &str) -> Result<()> {
        let Some(current) = lock(self.session)
            .repository()
            .find_by_id(id)
            .map(|s| s.details().clone())
        else {
            return Ok(());
        };

        let rules = &self.rules;
        let prompt = &mut self.prompt;
        let keep = |input: Option<String>, old: &str| input.unwrap_or_else(|| old.to_string());

        let details = PersonalDetails {
            last_name: keep(
                prompt.matching_or_skip(&format!("Last name [{}]: ", current.last_name), &rules.name)?,
                &current.last_name,
            ),
            first_name: keep(
                prompt.matching_or_skip(&format!("First name [{}]: ", current.first_name), &rules.name)?,
                &current.first_name,
            ),
            middle_name: keep(
                prompt.matching_or_skip(&format!("Middle name [{}]: ", current.middle_name), &rules.name)?,
                &current.middle_name,
            ),
            address: keep(
                prompt.matching_or_skip(&format!("Address [{}]: ", current.address), &rules.address)?,
                &current.address,
            ),
            gender: prompt
                .parsed_or_skip(&format!("Gender [{}]: ", current.gender), GENDER_MESSAGE, parse_gender)?
                .unwrap_or(current.gender),
            phone_number: keep(
                prompt.matching_or_skip(&format!("Phone number [{}]: ", current.phone_number), &rules.phone)?,
                &current.phone_number,
            ),
            email: keep(
                prompt.matching_or_skip(&format!("Email [{}]: ", current.email), &rules.email)?,
                &current.email,
            ),
            date_of_birth: keep(
                prompt
                    .matching_or_skip(&format!("Date of Birth [{}]: ", current.date_of_birth), &rules.date)?
                    .map(|d| normalize_date(&d)),
                &current.date_of_birth,
            ),
            course: prompt
                .parsed_or_skip(&format!("Course [{}]: ", current.course), COURSE_MESSAGE, parse_course)?
                .unwrap_or(current.course),
            date_of_enrollment: keep(
                prompt
                    .matching_or_skip(
                        &format!("Date of Enrollment [{}]: ", current.date_of_enrollment),
                        &rules.date,
                    )?
                    .map(|d| normalize_date(&d)),
                &current.date_of_enrollment,
            ),
        };

        if details == current {
            writeln!(self.prompt.out(), "No changes.")?;
            return Ok(());
        }
        let result = lock(self.session).update_student(id, details);
        if report(self.prompt.out(), result)?.is_some() {
            writeln!(self.prompt.out(), "Personal details updated.")?;
        }
        Ok(())
    }

    /// Returns true when the student was deleted
    fn delete_student(&mut self, id: &str) -> Result<bool> {
        let label = format!("Are you sure you want to delete student {}? (y/n): ", id);
        if !self.prompt.confirm(&label)? {
            writeln!(self.prompt.out(), "Student not deleted.")?;
            return Ok(false);
        }
        let result = lock(self.session).delete_student(id);
        let deleted = report(self.prompt.out(), result)?.is_some();
        if deleted {
            writeln!(self.prompt.out(), "Student deleted.")?;
        }
        Ok(deleted)
    }

    fn subjects_menu(&mut self, id: &str) -> Result<()> {
        loop {
            let out = self.prompt.out();
            writeln!(out, "Select an option:")?;
            writeln!(out, "[1] Add subject")?;
            writeln!(out, "[2] Enter grades")?;
            writeln!(out, "[3] Delete subject")?;
            writeln!(out, "[4] Back")?;
            match self.prompt.choice()? {
                1 => self.add_subject(id)?,
                2 => self.enter_grades(id)?,
                3 => self.delete_subject(id)?,
                4 => return Ok(()),
                _ => writeln!(self.prompt.out(), "Invalid choice. Try again.")?,
            }
        }
    }

    fn add_subject(&mut self, id: &str) -> Result<()> {
        let name = self.prompt.required("Enter subject name: ")?;
        let course_number = self
            .prompt
            .matching("Enter course number (6 digits): ", &self.rules.course_number)?;
        let instructor = self.prompt.matching(
            "Enter instructor name (2 or more words, capitalized): ",
            &self.rules.instructor,
        )?;

        let result = lock(self.session).add_subject(id, &name, &course_number, &instructor);
        if report(self.prompt.out(), result)?.is_some() {
            writeln!(self.prompt.out(), "Subject {} added.", name)?;
        }
        Ok(())
    }

    fn subject_names(&self, id: &str) -> Vec<String> {
        lock(self.session)
            .repository()
            .find_by_id(id)
            .map(|s| s.subjects().iter().map(|s| s.name.clone()).collect())
            .unwrap_or_default()
    }

    fn enter_grades(&mut self, id: &str) -> Result<()> {
        let names = self.subject_names(id);
        if names.is_empty() {
            writeln!(self.prompt.out(), "No subjects to grade.")?;
            return Ok(());
        }

        writeln!(self.prompt.out(), "Enter grades for each subject:")?;
        for name in names {
            writeln!(self.prompt.out(), "{}:", name)?;
            if self.prompt.line("Enter 1 to edit grades or any key to skip: ")? != "1" {
                continue;
            }
            let prelim = self.prompt.number("Prelims: ", 0..=100)?;
            let midterm = self.prompt.number("Midterms: ", 0..=100)?;
            let final_exam = self.prompt.number("Finals: ", 0..=100)?;

            let result = lock(self.session).record_grade(id, &name, prelim, midterm, final_exam);
            if let Some(grade) = report(self.prompt.out(), result)? {
                writeln!(self.prompt.out(), "Final rating: {:.2}", grade.final_rating())?;
            }
        }
        writeln!(self.prompt.out(), "Grades entered.")?;
        Ok(())
    }

    fn delete_subject(&mut self, id: &str) -> Result<()> {
        let names = self.subject_names(id);
        if names.is_empty() {
            writeln!(self.prompt.out(), "No subjects to delete.")?;
            return Ok(());
        }

        let out = self.prompt.out();
        writeln!(out, "Select subject to delete:")?;
        for (i, name) in names.iter().enumerate() {
            writeln!(out, "[{}] {}", i + 1, name)?;
        }
        let choice = self.prompt.number("Enter choice: ", 1..=names.len() as u32)?;
        let name = &names[choice as usize - 1];

        let result = lock(self.session).delete_subject(id, name);
        if report(self.prompt.out(), result)?.is_some() {
            writeln!(self.prompt.out(), "{} has been deleted.", name)?;
        }
        Ok(())
    }

    fn search_students(&mut self) -> Result<()> {
        let out = self.prompt.out();
        writeln!(out, "[1] Search by ID")?;
        writeln!(out, "[2] Search by Last Name")?;
        writeln!(out, "[3] Search by First Name")?;
        writeln!(out, "[4] Back")?;
        match self.prompt.choice()? {
            1 => {
                let id = self.prompt.line("Enter student ID: ")?;
                self.open_student(&id)
            }
            2 => {
                let last_name = self.prompt.line("Enter student last name: ")?;
                let session = lock(self.session);
                let matches = session.repository().find_by_last_name(&last_name);
                write_matches(self.prompt.out(), &matches)
            }
            3 => {
                let first_name = self.prompt.line("Enter student first name: ")?;
                let session = lock(self.session);
                let matches = session.repository().find_by_first_name(&first_name);
                write_matches(self.prompt.out(), &matches)
            }
            4 => Ok(()),
            _ => {
                writeln!(self.prompt.out(), "Invalid choice. Try again.")?;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdm_common::RecordStore;
    use std::io::Cursor;
    use tempfile::TempDir;

    const DOE_ROW: &str = "1000001,Doe,John,Q,12 Main Street Springfield,M,0917123456,john.doe@example.com,1/2/2001,BSCS,8/15/2023";

    fn seeded() -> (TempDir, Mutex<Session>) {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("students.csv"),
            format!("{}\n{}\n", sdm_common::storage::codec::STUDENTS_HEADER, DOE_ROW),
        )
        .unwrap();
        let (session, _) = Session::open(RecordStore::new(dir.path())).unwrap();
        (dir, Mutex::new(session))
    }

    fn run_script(session: &Mutex<Session>, script: &str) -> String {
        let prompt = Prompt::new(Cursor::new(script.as_bytes().to_vec()), Vec::new());
        let mut menu = Menu::new(prompt, session, Rules::new().unwrap(), 10);
        menu.run().unwrap();
        String::from_utf8(menu.prompt.into_output()).unwrap()
    }

    #[test]
    fn test_exit_and_closed_input_both_return() {
        let (_dir, session) = seeded();
        assert!(run_script(&session, "4\n").contains("Thanks for using the program!"));
        assert!(run_script(&session, "").contains("Select an option:"));
    }

    #[test]
    fn test_add_subject_and_grade_through_menus() {
        let (dir, session) = seeded();
        // search by ID -> subjects -> add -> grades -> back -> back -> exit
        let script = "3\n1\n1000001\n3\n\
                      1\nMath\n123456\nJane Roe\n\
                      2\n1\n90\n85\n95\n\
                      4\n4\n4\n";
        let output = run_script(&session, script);

        assert!(output.contains("Subject Math added."));
        assert!(output.contains("Final rating: 90.50"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("grades.csv")).unwrap(),
            "1000001,Math,90,85,95,90.50\n"
        );
    }

    #[test]
    fn test_paginated_listing() {
        let (_dir, session) = seeded();
        let output = run_script(&session, "1\n1\n4\n4\n");
        assert!(output.contains("| 1000001 "));
        assert!(output.contains("Page 1 of 1"));
    }

    #[test]
    fn test_search_by_first_name_ignores_case() {
        let (_dir, session) = seeded();
        let output = run_script(&session, "3\n3\njohn\n4\n");
        assert!(output.contains("ID: 1000001"));
    }

    #[test]
    fn test_delete_student_requires_confirmation() {
        let (_dir, session) = seeded();
        run_script(&session, "3\n1\n1000001\n2\nn\n4\n4\n");
        assert_eq!(lock(&session).repository().len(), 1);

        run_script(&session, "3\n1\n1000001\n2\ny\n4\n");
        assert!(lock(&session).repository().is_empty());
    }
}
