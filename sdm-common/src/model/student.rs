//! Student personal record and its subject list

use std::fmt;
use std::str::FromStr;

use super::{Grade, Subject};
use crate::{Error, Result};

/// Gender as stored in the students relation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "M" => Ok(Gender::Male),
            "F" => Ok(Gender::Female),
            other => Err(Error::InvalidInput(format!("unknown gender '{}'", other))),
        }
    }
}

/// Degree program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Course {
    Bscs,
    Bsit,
    Bscoe,
}

impl Course {
    pub const ALL: [Course; 3] = [Course::Bscs, Course::Bsit, Course::Bscoe];

    pub fn as_str(&self) -> &'static str {
        match self {
            Course::Bscs => "BSCS",
            Course::Bsit => "BSIT",
            Course::Bscoe => "BSCoE",
        }
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Course {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Course::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown course '{}'", s)))
    }
}

/// Mutable personal fields of a student
///
/// Everything except `gender` and `course` is an opaque string here; format
/// checks belong to whoever collects the input.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonalDetails {
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub address: String,
    pub gender: Gender,
    pub phone_number: String,
    pub email: String,
    pub date_of_birth: String,
    pub course: Course,
    pub date_of_enrollment: String,
}

impl PersonalDetails {
    /// Free-text fields in storage order, for delimiter checks
    pub fn text_fields(&self) -> [(&'static str, &str); 8] {
        [
            ("last name", &self.last_name),
            ("first name", &self.first_name),
            ("middle name", &self.middle_name),
            ("address", &self.address),
            ("phone number", &self.phone_number),
            ("email", &self.email),
            ("date of birth", &self.date_of_birth),
            ("date of enrollment", &self.date_of_enrollment),
        ]
    }
}

/// A student record. The ID is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    id: String,
    details: PersonalDetails,
    subjects: Vec<Subject>,
}

impl Student {
    pub fn new(id: impl Into<String>, details: PersonalDetails) -> Self {
        Self {
            id: id.into(),
            details,
            subjects: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn details(&self) -> &PersonalDetails {
        &self.details
    }

    pub fn set_details(&mut self, details: PersonalDetails) {
        self.details = details;
    }

    pub fn last_name(&self) -> &str {
        &self.details.last_name
    }

    pub fn first_name(&self) -> &str {
        &self.details.first_name
    }

    pub fn set_last_name(&mut self, value: impl Into<String>) {
        self.details.last_name = value.into();
    }

    pub fn set_first_name(&mut self, value: impl Into<String>) {
        self.details.first_name = value.into();
    }

    pub fn set_middle_name(&mut self, value: impl Into<String>) {
        self.details.middle_name = value.into();
    }

    pub fn set_address(&mut self, value: impl Into<String>) {
        self.details.address = value.into();
    }

    pub fn set_gender(&mut self, value: Gender) {
        self.details.gender = value;
    }

    pub fn set_phone_number(&mut self, value: impl Into<String>) {
        self.details.phone_number = value.into();
    }

    pub fn set_email(&mut self, value: impl Into<String>) {
        self.details.email = value.into();
    }

    pub fn set_date_of_birth(&mut self, value: impl Into<String>) {
        self.details.date_of_birth = value.into();
    }

    pub fn set_course(&mut self, value: Course) {
        self.details.course = value;
    }

    pub fn set_date_of_enrollment(&mut self, value: impl Into<String>) {
        self.details.date_of_enrollment = value.into();
    }

    /// Subjects in insertion order
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    /// Append a subject. Name and course number uniqueness is the caller's job.
    pub fn add_subject(&mut self, subject: Subject) {
        self.subjects.push(subject);
    }

    /// Remove the first subject with this name
    pub fn remove_subject(&mut self, name: &str) -> Option<Subject> {
        let index = self.subjects.iter().position(|s| s.name == name)?;
        Some(self.subjects.remove(index))
    }

    pub(crate) fn insert_subject(&mut self, index: usize, subject: Subject) {
        let index = index.min(self.subjects.len());
        self.subjects.insert(index, subject);
    }

    pub(crate) fn pop_subject(&mut self) -> Option<Subject> {
        self.subjects.pop()
    }

    pub fn subject_by_name(&self, name: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.name == name)
    }

    pub fn subject_by_name_mut(&mut self, name: &str) -> Option<&mut Subject> {
        self.subjects.iter_mut().find(|s| s.name == name)
    }

    pub fn subject_by_course_number(&self, course_number: &str) -> Option<&Subject> {
        self.subjects
            .iter()
            .find(|s| s.course_number == course_number)
    }

    /// Set the three scores of a subject and recompute its rating
    ///
    /// Memory only. The grades relation is updated by a separate flush.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no subject has this name
    /// - `DuplicateKey` if more than one subject has this name
    pub fn record_grade(
        &mut self,
        subject_name: &str,
        prelim: u32,
        midterm: u32,
        final_exam: u32,
    ) -> Result<Grade> {
        let matches = self
            .subjects
            .iter()
            .filter(|s| s.name == subject_name)
            .count();
        if matches > 1 {
            return Err(Error::DuplicateKey {
                student_id: self.id.clone(),
                subject: subject_name.to_string(),
            });
        }

        let subject = self
            .subjects
            .iter_mut()
            .find(|s| s.name == subject_name)
            .ok_or_else(|| {
                Error::NotFound(format!("subject '{}' for student {}", subject_name, self.id))
            })?;
        Ok(subject.record_scores(prelim, midterm, final_exam))
    }
}

impl fmt::Display for Student {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.details;
        writeln!(f, "ID: {}", self.id)?;
        writeln!(f, "Last Name: {}", d.last_name)?;
        writeln!(f, "First Name: {}", d.first_name)?;
        writeln!(f, "Middle Name: {}", d.middle_name)?;
        writeln!(f, "Address: {}", d.address)?;
        writeln!(f, "Gender: {}", d.gender)?;
        writeln!(f, "Phone Number: {}", d.phone_number)?;
        writeln!(f, "Email Address: {}", d.email)?;
        writeln!(f, "Date of Birth: {}", d.date_of_birth)?;
        writeln!(f, "Course: {}", d.course)?;
        write!(f, "Date of Enrollment: {}", d.date_of_enrollment)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn details(last: &str, first: &str) -> PersonalDetails {
        PersonalDetails {
            last_name: last.to_string(),
            first_name: first.to_string(),
            middle_name: "Q".to_string(),
            address: "12 Main Street Springfield".to_string(),
            gender: Gender::Male,
            phone_number: "0917123456".to_string(),
            email: "john.doe@example.com".to_string(),
            date_of_birth: "1/2/2001".to_string(),
            course: Course::Bscs,
            date_of_enrollment: "8/15/2023".to_string(),
        }
    }

    fn student_with_math() -> Student {
        let mut student = Student::new("1000001", details("Doe", "John"));
        student.add_subject(Subject::new("Math", "123456", "Jane Roe"));
        student
    }

    #[test]
    fn test_gender_and_course_round_trip_strings() {
        assert_eq!("M".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("F".parse::<Gender>().unwrap(), Gender::Female);
        assert!("X".parse::<Gender>().is_err());

        assert_eq!("BSCoE".parse::<Course>().unwrap(), Course::Bscoe);
        assert_eq!(Course::Bsit.to_string(), "BSIT");
        assert!("bscs".parse::<Course>().is_err());
    }

    #[test]
    fn test_subject_lookup_by_name_and_course_number() {
        let student = student_with_math();
        assert!(student.subject_by_name("Math").is_some());
        assert!(student.subject_by_name("math").is_none());
        assert_eq!(
            student.subject_by_course_number("123456").map(|s| s.name.as_str()),
            Some("Math")
        );
        assert!(student.subject_by_course_number("654321").is_none());
    }

    #[test]
    fn test_record_grade_sets_rating() {
        let mut student = student_with_math();
        let grade = student.record_grade("Math", 90, 85, 95).unwrap();
        assert_eq!(grade.final_rating(), 90.5);
        assert_eq!(
            student.subject_by_name("Math").and_then(|s| s.grade()),
            Some(&grade)
        );
    }

    #[test]
    fn test_record_grade_unknown_subject() {
        let mut student = student_with_math();
        let result = student.record_grade("History", 90, 85, 95);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_record_grade_ambiguous_subject() {
        let mut student = student_with_math();
        student.add_subject(Subject::new("Math", "222222", "Other Person"));
        let result = student.record_grade("Math", 90, 85, 95);
        assert!(matches!(result, Err(Error::DuplicateKey { .. })));
        assert!(student.subjects().iter().all(|s| s.grade().is_none()));
    }

    #[test]
    fn test_remove_subject_keeps_order() {
        let mut student = student_with_math();
        student.add_subject(Subject::new("Physics", "222222", "Ada Byron"));
        student.add_subject(Subject::new("History", "333333", "Ada Byron"));

        let removed = student.remove_subject("Physics").unwrap();
        assert_eq!(removed.name, "Physics");

        let names: Vec<_> = student.subjects().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Math", "History"]);
        assert!(student.remove_subject("Physics").is_none());
    }

    #[test]
    fn test_setters_leave_id_untouched() {
        let mut student = student_with_math();
        student.set_last_name("Smith");
        student.set_course(Course::Bsit);
        assert_eq!(student.id(), "1000001");
        assert_eq!(student.last_name(), "Smith");
        assert_eq!(student.details().course, Course::Bsit);
    }
}
