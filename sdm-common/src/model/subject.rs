//! Subject enrollment owned by a student

use super::Grade;

/// A course enrollment. `name` is the join key into the grades relation.
#[derive(Debug, Clone, PartialEq)]
pub struct Subject {
    pub name: String,
    pub course_number: String,
    pub instructor_name: String,
    grade: Option<Grade>,
}

impl Subject {
    /// New subject with no grade recorded yet
    pub fn new(
        name: impl Into<String>,
        course_number: impl Into<String>,
        instructor_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            course_number: course_number.into(),
            instructor_name: instructor_name.into(),
            grade: None,
        }
    }

    pub fn grade(&self) -> Option<&Grade> {
        self.grade.as_ref()
    }

    pub fn set_grade(&mut self, grade: Grade) {
        self.grade = Some(grade);
    }

    /// Create the grade on first entry, otherwise update it in place
    pub fn record_scores(&mut self, prelim: u32, midterm: u32, final_exam: u32) -> Grade {
        match self.grade.as_mut() {
            Some(grade) => {
                grade.set_scores(prelim, midterm, final_exam);
                *grade
            }
            None => *self.grade.insert(Grade::new(prelim, midterm, final_exam)),
        }
    }

    pub(crate) fn restore_grade(&mut self, grade: Option<Grade>) {
        self.grade = grade;
    }
}
