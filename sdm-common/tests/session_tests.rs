//! Integration tests for session operations
//!
//! Each test drives a session against a temporary data folder and then
//! checks both the in-memory repository and the relation files.

use std::fs;

use sdm_common::model::{Course, Gender, PersonalDetails};
use sdm_common::storage::codec::STUDENTS_HEADER;
use sdm_common::{Error, RecordStore, Session};
use tempfile::TempDir;

fn details(last: &str, first: &str) -> PersonalDetails {
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

fn open(dir: &TempDir) -> Session {
    Session::open(RecordStore::new(dir.path())).unwrap().0
}

fn read(dir: &TempDir, name: &str) -> String {
    fs::read_to_string(dir.path().join(name)).unwrap_or_default()
}

/// Folder seeded with student 1000001 (John Doe) and no subjects
fn seeded() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("students.csv"),
        format!(
            "{}\n1000001,Doe,John,Q,12 Main Street Springfield,M,0917123456,john.doe@example.com,1/2/2001,BSCS,8/15/2023\n",
            STUDENTS_HEADER
        ),
    )
    .unwrap();
    dir
}

#[test]
fn test_grade_scenario_survives_reload() {
    let dir = seeded();
    let mut session = open(&dir);

    session.add_subject("1000001", "Math", "123456", "Jane Roe").unwrap();
    let grade = session.record_grade("1000001", "Math", 90, 85, 95).unwrap();
    assert_eq!(grade.final_rating(), 90.5);
    session.save_all().unwrap();
    drop(session);

    let reloaded = open(&dir);
    let math = reloaded
        .repository()
        .find_by_id("1000001")
        .and_then(|s| s.subject_by_name("Math"))
        .unwrap();
    let grade = math.grade().unwrap();
    assert_eq!(
        (grade.prelim(), grade.midterm(), grade.final_exam()),
        (90, 85, 95)
    );
    assert_eq!(grade.final_rating(), 90.5);
    assert_eq!(read(&dir, "grades.csv"), "1000001,Math,90,85,95,90.50\n");
}

#[test]
fn test_add_student_persists_with_fresh_id() {
    let dir = seeded();
    let mut session = open(&dir);

    let id = session.add_student(details("Roe", "Jane")).unwrap();

    assert_ne!(id, "1000001");
    assert_eq!(id.len(), 7);
    assert!(read(&dir, "students.csv").contains(&format!("{},Roe,Jane,", id)));
    assert_eq!(open(&dir).repository().len(), 2);
}

#[test]
fn test_add_student_rejects_delimiter_in_field() {
    let dir = seeded();
    let mut session = open(&dir);

    let mut bad = details("Roe", "Jane");
    bad.address = "7 Elm Road, Shelbyville".to_string();

    assert!(matches!(session.add_student(bad), Err(Error::InvalidInput(_))));
    assert_eq!(session.repository().len(), 1);
}

#[test]
fn test_update_student_rewrites_row() {
    let dir = seeded();
    let mut session = open(&dir);

    let mut changed = details("Doe", "Johnny");
    changed.course = Course::Bsit;
    session.update_student("1000001", changed).unwrap();

    let content = read(&dir, "students.csv");
    assert!(content.contains("1000001,Doe,Johnny,"));
    assert!(content.contains(",BSIT,"));
    assert_eq!(content.lines().count(), 2);
}

#[test]
fn test_add_subject_rejects_duplicates() {
    let dir = seeded();
    let mut session = open(&dir);
    session.add_subject("1000001", "Math", "123456", "Jane Roe").unwrap();

    let same_name = session.add_subject("1000001", "Math", "654321", "Ada Byron");
    assert!(matches!(same_name, Err(Error::DuplicateKey { .. })));

    let same_code = session.add_subject("1000001", "Physics", "123456", "Ada Byron");
    assert!(matches!(same_code, Err(Error::DuplicateKey { .. })));

    assert_eq!(read(&dir, "subjects.csv"), "1000001,Math,123456,Jane Roe\n");
}

#[test]
fn test_unknown_targets_are_not_found() {
    let dir = seeded();
    let mut session = open(&dir);

    assert!(matches!(
        session.add_subject("7777777", "Math", "123456", "Jane Roe"),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        session.record_grade("1000001", "Math", 90, 85, 95),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(session.delete_student("7777777"), Err(Error::NotFound(_))));
    assert!(matches!(
        session.delete_subject("1000001", "Math"),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_recording_twice_keeps_one_row() {
    let dir = seeded();
    let mut session = open(&dir);
    session.add_subject("1000001", "Math", "123456", "Jane Roe").unwrap();

    session.record_grade("1000001", "Math", 70, 70, 70).unwrap();
    session.record_grade("1000001", "Math", 90, 85, 95).unwrap();
    session.flush_grades().unwrap();

    assert_eq!(read(&dir, "grades.csv"), "1000001,Math,90,85,95,90.50\n");
}

#[test]
fn test_delete_only_subject_cascades() {
    let dir = seeded();
    let mut session = open(&dir);
    session.add_subject("1000001", "Math", "123456", "Jane Roe").unwrap();
    session.record_grade("1000001", "Math", 90, 85, 95).unwrap();

    let removed = session.delete_subject("1000001", "Math").unwrap();

    assert_eq!(removed.name, "Math");
    assert!(session.repository().find_by_id("1000001").unwrap().subjects().is_empty());
    assert_eq!(read(&dir, "subjects.csv"), "");
    assert_eq!(read(&dir, "grades.csv"), "");
}

#[test]
fn test_delete_student_cascades_to_subjects_and_grades() {
    let dir = seeded();
    let mut session = open(&dir);
    let other = session.add_student(details("Roe", "Jane")).unwrap();
    session.add_subject("1000001", "Math", "123456", "Jane Roe").unwrap();
    session.add_subject(&other, "Math", "123456", "Jane Roe").unwrap();
    session.record_grade("1000001", "Math", 90, 85, 95).unwrap();
    session.record_grade(&other, "Math", 70, 70, 70).unwrap();

    session.delete_student("1000001").unwrap();

    assert!(session.repository().find_by_id("1000001").is_none());
    assert!(!read(&dir, "students.csv").contains("1000001,"));
    assert_eq!(read(&dir, "subjects.csv"), format!("{},Math,123456,Jane Roe\n", other));
    assert_eq!(read(&dir, "grades.csv"), format!("{},Math,70,70,70,70.00\n", other));
}

#[test]
fn test_failed_grade_flush_restores_memory() {
    let dir = seeded();
    let mut session = open(&dir);
    session.add_subject("1000001", "Math", "123456", "Jane Roe").unwrap();

    // Make the grades relation unreadable
    fs::create_dir(dir.path().join("grades.csv")).unwrap();

    let result = session.record_grade("1000001", "Math", 90, 85, 95);
    assert!(matches!(result, Err(Error::Io(_))));

    let math = session
        .repository()
        .find_by_id("1000001")
        .and_then(|s| s.subject_by_name("Math"))
        .unwrap();
    assert!(math.grade().is_none());
}

#[test]
fn test_shutdown_saves_once() {
    let dir = seeded();
    let mut session = open(&dir);
    session.add_subject("1000001", "Math", "123456", "Jane Roe").unwrap();
    fs::remove_file(dir.path().join("students.csv")).unwrap();

    session.shutdown().unwrap();
    assert!(session.is_closed());
    assert!(read(&dir, "students.csv").starts_with(STUDENTS_HEADER));
    assert_eq!(read(&dir, "subjects.csv"), "1000001,Math,123456,Jane Roe\n");

    // Second call is a no-op even if storage has gone away
    fs::remove_dir_all(dir.path()).unwrap();
    session.shutdown().unwrap();
    assert!(!dir.path().exists());
}
