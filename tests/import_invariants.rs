//! Bulk import behavior: row-level skips, placeholder names, course
//! reuse, and the administrator-only gate.

use std::sync::Arc;

use registra::audit::MemoryAuditLog;
use registra::auth::{Account, PasswordPolicy, Role};
use registra::import::{import_rows, ImportRow};
use registra::model::Program;
use registra::service::{Core, CreateProgramRequest, ServiceError};
use registra::store::{EntityStore, MemoryStore};

fn core() -> Core {
    Core::new(
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryAuditLog::new()),
        PasswordPolicy::default(),
    )
}

fn admin() -> Account {
    Account::new(
        "root@school.edu",
        "Root",
        "Sup3rSecret",
        Role::Administrator,
        None,
        &PasswordPolicy::default(),
    )
    .unwrap()
}

fn seed_program(core: &Core, root: &Account, name: &str) -> Program {
    core.programs
        .create(
            root,
            CreateProgramRequest {
                name: name.to_string(),
                code: None,
            },
        )
        .unwrap()
}

fn row(matricula: &str, program: &str, course: &str, score: f64, term: &str) -> ImportRow {
    ImportRow {
        matricula: matricula.to_string(),
        paternal_surname: None,
        maternal_surname: None,
        first_names: None,
        program: program.to_string(),
        semester: 3,
        course: course.to_string(),
        score,
        attendance: 90.0,
        term: term.to_string(),
    }
}

// =============================================================================
// Happy path and placeholders
// =============================================================================

/// Unknown students and courses are created on the fly; absent name
/// fields get placeholders.
#[test]
fn test_import_creates_missing_entities() {
    let core = core();
    let root = admin();
    seed_program(&core, &root, "Systems Eng");

    let report = import_rows(
        &core,
        &root,
        &[
            row("A001", "Systems Eng", "Algebra", 85.0, "2025-1"),
            row("A001", "Systems Eng", "Physics", 60.0, "2025-1"),
        ],
    )
    .unwrap();

    assert_eq!(report.rows, 2);
    assert_eq!(report.inserted, 2);
    assert_eq!(report.students_created, 1);
    assert_eq!(report.courses_created, 2);
    assert_eq!(report.duplicates, 0);
    assert_eq!(report.rejected, 0);

    let student = core
        .store()
        .student_by_matricula("A001")
        .unwrap()
        .unwrap();
    assert_eq!(student.paternal_surname, "No surname");
    assert_eq!(student.first_names, "No name");
    assert_eq!(core.grades.for_student(&root, student.id).unwrap().len(), 2);
}

/// A second batch reuses the students and courses of the first.
#[test]
fn test_import_reuses_existing_entities() {
    let core = core();
    let root = admin();
    seed_program(&core, &root, "Systems Eng");

    import_rows(
        &core,
        &root,
        &[row("A001", "Systems Eng", "Algebra", 85.0, "2025-1")],
    )
    .unwrap();
    let report = import_rows(
        &core,
        &root,
        &[row("A001", "Systems Eng", "Algebra", 90.0, "2025-2")],
    )
    .unwrap();

    assert_eq!(report.inserted, 1);
    assert_eq!(report.students_created, 0);
    assert_eq!(report.courses_created, 0);
}

// =============================================================================
// Row-level skips
// =============================================================================

/// Duplicate and invalid rows are counted and skipped; the batch never
/// aborts.
#[test]
fn test_import_skips_bad_rows_and_continues() {
    let core = core();
    let root = admin();
    seed_program(&core, &root, "Systems Eng");

    let report = import_rows(
        &core,
        &root,
        &[
            row("A001", "Systems Eng", "Algebra", 85.0, "2025-1"),
            // Same (student, course, term): duplicate.
            row("A001", "Systems Eng", "Algebra", 40.0, "2025-1"),
            // Out-of-range score: rejected.
            row("A002", "Systems Eng", "Algebra", 120.0, "2025-1"),
            // Unknown program: rejected.
            row("A003", "Mechatronics", "Algebra", 70.0, "2025-1"),
            // Still processed after the bad rows.
            row("A004", "Systems Eng", "Algebra", 95.0, "2025-1"),
        ],
    )
    .unwrap();

    assert_eq!(report.inserted, 2);
    assert_eq!(report.duplicates, 1);
    assert_eq!(report.rejected, 2);

    // Rejected rows created nothing.
    assert!(core.store().student_by_matricula("A002").unwrap().is_none());
    assert!(core.store().student_by_matricula("A003").unwrap().is_none());

    // The duplicate row did not overwrite the original score.
    let student = core.store().student_by_matricula("A001").unwrap().unwrap();
    let grades = core.grades.for_student(&root, student.id).unwrap();
    assert_eq!(grades.len(), 1);
    assert_eq!(grades[0].score, 85.0);
}

// =============================================================================
// Authorization
// =============================================================================

/// Import is administrator-only.
#[test]
fn test_import_denies_instructors() {
    let core = core();
    let root = admin();
    let program = seed_program(&core, &root, "Systems Eng");

    let prof = Account::new(
        "prof@school.edu",
        "Prof",
        "Sup3rSecret",
        Role::Instructor,
        Some(program.id),
        &PasswordPolicy::default(),
    )
    .unwrap();

    let err = import_rows(
        &core,
        &prof,
        &[row("A001", "Systems Eng", "Algebra", 85.0, "2025-1")],
    )
    .unwrap_err();
    assert!(matches!(err, ServiceError::Unauthorized));
    assert!(core.store().student_by_matricula("A001").unwrap().is_none());
}
