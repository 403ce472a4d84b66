//! End-to-end mutation pipeline tests over the bundled services.
//!
//! Covers the full create/update/delete flows: uniqueness rejection,
//! range validation, the Dropout follow-up signal, and cascade deletes.

use std::sync::Arc;

use registra::audit::MemoryAuditLog;
use registra::auth::{Account, PasswordPolicy, Role};
use registra::model::StudentStatus;
use registra::service::{
    Core, CreateCourseRequest, CreateGradeRequest, CreateProgramRequest, CreateRiskFactorRequest,
    CreateStudentRequest, FollowUp, ServiceError, UpdateStudentRequest,
};
use registra::store::{EntityStore, MemoryStore};
use uuid::Uuid;

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

fn instructor(program_id: Uuid) -> Account {
    Account::new(
        "prof@school.edu",
        "Prof",
        "Sup3rSecret",
        Role::Instructor,
        Some(program_id),
        &PasswordPolicy::default(),
    )
    .unwrap()
}

fn student_request(program_id: Uuid, matricula: &str) -> CreateStudentRequest {
    CreateStudentRequest {
        matricula: matricula.to_string(),
        paternal_surname: "Rivera".to_string(),
        maternal_surname: "Luna".to_string(),
        first_names: "Ana".to_string(),
        gender: None,
        modality: None,
        program_id,
        semester: 3,
        status: "Active".to_string(),
    }
}

fn update_request(program_id: Uuid, status: &str) -> UpdateStudentRequest {
    UpdateStudentRequest {
        paternal_surname: "Rivera".to_string(),
        maternal_surname: "Luna".to_string(),
        first_names: "Ana".to_string(),
        gender: None,
        modality: None,
        program_id,
        semester: 3,
        status: status.to_string(),
    }
}

// =============================================================================
// Uniqueness
// =============================================================================

/// Administrator creates a program, an instructor bound to it creates a
/// student, and a second student with the same matricula is rejected.
#[test]
fn test_duplicate_matricula_is_rejected() {
    let core = core();
    let root = admin();

    let program = core
        .programs
        .create(
            &root,
            CreateProgramRequest {
                name: "Systems Eng".to_string(),
                code: Some("SE".to_string()),
            },
        )
        .unwrap();

    let prof = instructor(program.id);
    core.students
        .create(&prof, student_request(program.id, "A001"))
        .unwrap();

    let err = core
        .students
        .create(&prof, student_request(program.id, "A001"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateEntity(_)));
    assert_eq!(core.students.list(&root).unwrap().len(), 1);
}

/// At most one grade per (student, course, term).
#[test]
fn test_grade_unique_per_student_course_term() {
    let core = core();
    let root = admin();
    let program = core
        .programs
        .create(
            &root,
            CreateProgramRequest {
                name: "Systems Eng".to_string(),
                code: None,
            },
        )
        .unwrap();
    let student = core
        .students
        .create(&root, student_request(program.id, "A001"))
        .unwrap();
    let course = core
        .courses
        .create(
            &root,
            CreateCourseRequest {
                name: "Algebra".to_string(),
                semester: 3,
                program_id: Some(program.id),
            },
        )
        .unwrap();

    let request = CreateGradeRequest {
        student_id: student.id,
        course_id: course.id,
        score: 85.0,
        attendance: 95.0,
        term: "2025-1".to_string(),
    };
    core.grades.create(&root, request.clone()).unwrap();
    let err = core.grades.create(&root, request).unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateEntity(_)));
}

// =============================================================================
// Range validation
// =============================================================================

/// Out-of-range scores and attendance never reach the store.
#[test]
fn test_grade_range_enforced_before_persistence() {
    let core = core();
    let root = admin();
    let program = core
        .programs
        .create(
            &root,
            CreateProgramRequest {
                name: "Systems Eng".to_string(),
                code: None,
            },
        )
        .unwrap();
    let student = core
        .students
        .create(&root, student_request(program.id, "A001"))
        .unwrap();
    let course = core
        .courses
        .create(
            &root,
            CreateCourseRequest {
                name: "Algebra".to_string(),
                semester: 3,
                program_id: Some(program.id),
            },
        )
        .unwrap();

    for (score, attendance) in [(-1.0, 90.0), (101.0, 90.0), (80.0, -5.0), (80.0, 100.1)] {
        let err = core
            .grades
            .create(
                &root,
                CreateGradeRequest {
                    student_id: student.id,
                    course_id: course.id,
                    score,
                    attendance,
                    term: "2025-1".to_string(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::ConstraintViolation(_)));
    }
    assert!(core.grades.for_student(&root, student.id).unwrap().is_empty());
}

// =============================================================================
// Dropout follow-up
// =============================================================================

/// Setting status to Dropout with no risk factors persists the edit and
/// signals the follow-up. A duplicate (category, term) factor is then
/// rejected.
#[test]
fn test_dropout_follow_up_and_factor_uniqueness() {
    let core = core();
    let root = admin();
    let program = core
        .programs
        .create(
            &root,
            CreateProgramRequest {
                name: "Systems Eng".to_string(),
                code: None,
            },
        )
        .unwrap();
    let student = core
        .students
        .create(&root, student_request(program.id, "A001"))
        .unwrap();

    let outcome = core
        .students
        .update(&root, student.id, update_request(program.id, "Dropout"))
        .unwrap();
    assert_eq!(outcome.student.status, StudentStatus::Dropout);
    assert_eq!(outcome.follow_up, Some(FollowUp::RiskFactorRequired));

    let factor = CreateRiskFactorRequest {
        student_id: student.id,
        category: "Academic".to_string(),
        value: "Repeated failures".to_string(),
        term: "2025-1".to_string(),
    };
    core.risk_factors.create(&root, factor.clone()).unwrap();
    let err = core.risk_factors.create(&root, factor).unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateEntity(_)));

    // With a factor on file the follow-up signal clears.
    let outcome = core
        .students
        .update(&root, student.id, update_request(program.id, "Dropout"))
        .unwrap();
    assert_eq!(outcome.follow_up, None);
}

// =============================================================================
// Cascades
// =============================================================================

/// Deleting a student removes its grades and risk factors.
#[test]
fn test_student_delete_cascades() {
    let core = core();
    let root = admin();
    let program = core
        .programs
        .create(
            &root,
            CreateProgramRequest {
                name: "Systems Eng".to_string(),
                code: None,
            },
        )
        .unwrap();
    let student = core
        .students
        .create(&root, student_request(program.id, "A001"))
        .unwrap();
    let course = core
        .courses
        .create(
            &root,
            CreateCourseRequest {
                name: "Algebra".to_string(),
                semester: 3,
                program_id: Some(program.id),
            },
        )
        .unwrap();
    core.grades
        .create(
            &root,
            CreateGradeRequest {
                student_id: student.id,
                course_id: course.id,
                score: 85.0,
                attendance: 95.0,
                term: "2025-1".to_string(),
            },
        )
        .unwrap();
    core.students
        .update(&root, student.id, update_request(program.id, "Dropout"))
        .unwrap();
    core.risk_factors
        .create(
            &root,
            CreateRiskFactorRequest {
                student_id: student.id,
                category: "Economic".to_string(),
                value: "Lost scholarship".to_string(),
                term: "2025-1".to_string(),
            },
        )
        .unwrap();

    core.students.delete(&root, student.id).unwrap();

    let store = core.store();
    assert!(store.student(student.id).unwrap().is_none());
    assert!(store.grades_for_student(student.id).unwrap().is_empty());
    assert!(store.risk_factors_for_student(student.id).unwrap().is_empty());
}

/// Deleting a program keeps its courses as shared courses.
#[test]
fn test_program_delete_detaches_courses() {
    let core = core();
    let root = admin();
    let program = core
        .programs
        .create(
            &root,
            CreateProgramRequest {
                name: "Systems Eng".to_string(),
                code: None,
            },
        )
        .unwrap();
    let course = core
        .courses
        .create(
            &root,
            CreateCourseRequest {
                name: "Algebra".to_string(),
                semester: 3,
                program_id: Some(program.id),
            },
        )
        .unwrap();

    core.programs.delete(&root, program.id).unwrap();

    let course = core.store().course(course.id).unwrap().unwrap();
    assert!(course.program_id.is_none());
}
