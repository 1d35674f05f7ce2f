//! Row formats of the three comma-delimited relations
//!
//! - students: `id,last_name,first_name,middle_name,address,gender,phone_number,email_address,date_of_birth,course,date_of_enrollment`
//! - subjects: `student_id,subject_name,course_number,instructor_name`
//! - grades: `student_id,subject_name,prelim,midterm,final,final_rating`

use crate::model::{Course, Gender, Grade, PersonalDetails, Student, Subject};
use crate::{Error, Result};

pub const STUDENTS: &str = "students";
pub const SUBJECTS: &str = "subjects";
pub const GRADES: &str = "grades";

pub const DELIMITER: char = ',';

/// Header line of the students relation
pub const STUDENTS_HEADER: &str = "id,last_name,first_name,middle_name,address,gender,phone_number,email_address,date_of_birth,course,date_of_enrollment";

const STUDENT_FIELDS: usize = 11;
const SUBJECT_FIELDS: usize = 4;
const GRADE_FIELDS: usize = 6;

/// Reject values that would split into extra fields or rows
pub fn check_field(label: &str, value: &str) -> Result<()> {
    if value.contains(|c: char| matches!(c, DELIMITER | '\n' | '\r')) {
        return Err(Error::InvalidInput(format!(
            "{} must not contain commas or line breaks: {:?}",
            label, value
        )));
    }
    Ok(())
}

/// Split a row and keep its leading `expected` fields
///
/// Rows with fewer fields are malformed. Extra trailing fields, including the
/// empty one left by a trailing delimiter, are ignored.
fn split_min<'a>(relation: &'static str, line: &'a str, expected: usize) -> Result<Vec<&'a str>> {
    let mut parts: Vec<&str> = line
        .trim_end_matches(|c: char| c == '\r' || c == '\n')
        .split(DELIMITER)
        .collect();
    if parts.len() < expected {
        return Err(Error::parse(
            relation,
            line,
            format!("expected at least {} fields, found {}", expected, parts.len()),
        ));
    }
    parts.truncate(expected);
    Ok(parts)
}

pub fn encode_student(student: &Student) -> String {
    let d = student.details();
    [
        student.id(),
        d.last_name.as_str(),
        d.first_name.as_str(),
        d.middle_name.as_str(),
        d.address.as_str(),
        d.gender.as_str(),
        d.phone_number.as_str(),
        d.email.as_str(),
        d.date_of_birth.as_str(),
        d.course.as_str(),
        d.date_of_enrollment.as_str(),
    ]
    .join(DELIMITER.to_string().as_str())
}

pub fn decode_student(line: &str) -> Result<Student> {
    let f = split_min(STUDENTS, line, STUDENT_FIELDS)?;
    if f[0].is_empty() {
        return Err(Error::parse(STUDENTS, line, "empty student id"));
    }
    let gender = f[5]
        .parse::<Gender>()
        .map_err(|e: Error| Error::parse(STUDENTS, line, e.to_string()))?;
    let course = f[9]
        .parse::<Course>()
        .map_err(|e: Error| Error::parse(STUDENTS, line, e.to_string()))?;

    let details = PersonalDetails {
        last_name: f[1].to_string(),
        first_name: f[2].to_string(),
        middle_name: f[3].to_string(),
        address: f[4].to_string(),
        gender,
        phone_number: f[6].to_string(),
        email: f[7].to_string(),
        date_of_birth: f[8].to_string(),
        course,
        date_of_enrollment: f[10].to_string(),
    };
    Ok(Student::new(f[0], details))
}

/// One row of the subjects relation
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectRow {
    pub student_id: String,
    pub subject: Subject,
}

pub fn encode_subject(student_id: &str, subject: &Subject) -> String {
    [
        student_id,
        subject.name.as_str(),
        subject.course_number.as_str(),
        subject.instructor_name.as_str(),
    ]
    .join(DELIMITER.to_string().as_str())
}

pub fn decode_subject(line: &str) -> Result<SubjectRow> {
    let f = split_min(SUBJECTS, line, SUBJECT_FIELDS)?;
    Ok(SubjectRow {
        student_id: f[0].to_string(),
        subject: Subject::new(f[1], f[2], f[3]),
    })
}

/// One row of the grades relation
#[derive(Debug, Clone, PartialEq)]
pub struct GradeRow {
    pub student_id: String,
    pub subject_name: String,
    pub grade: Grade,
}

pub fn encode_grade(student_id: &str, subject_name: &str, grade: &Grade) -> String {
    [
        student_id.to_string(),
        subject_name.to_string(),
        grade.prelim().to_string(),
        grade.midterm().to_string(),
        grade.final_exam().to_string(),
        format!("{:.2}", grade.final_rating()),
    ]
    .join(DELIMITER.to_string().as_str())
}

pub fn decode_grade(line: &str) -> Result<GradeRow> {
    let f = split_min(GRADES, line.trim(), GRADE_FIELDS)?;
    let score = |name: &str, value: &str| {
        value
            .trim()
            .parse::<u32>()
            .map_err(|e| Error::parse(GRADES, line, format!("{} '{}': {}", name, value, e)))
    };
    let prelim = score("prelim", f[2])?;
    let midterm = score("midterm", f[3])?;
    let final_exam = score("final", f[4])?;
    let final_rating = f[5]
        .trim()
        .parse::<f64>()
        .map_err(|e| Error::parse(GRADES, line, format!("final rating '{}': {}", f[5], e)))?;
    if !final_rating.is_finite() {
        return Err(Error::parse(
            GRADES,
            line,
            format!("final rating '{}' is not a finite number", f[5]),
        ));
    }

    Ok(GradeRow {
        student_id: f[0].to_string(),
        subject_name: f[1].to_string(),
        grade: Grade::from_stored(prelim, midterm, final_exam, final_rating),
    })
}

/// `(student_id, subject_name)` of a grades row, without parsing the scores
pub fn grade_row_key(line: &str) -> Option<(&str, &str)> {
    let mut parts = line.trim().split(DELIMITER);
    Some((parts.next()?, parts.next()?))
}
