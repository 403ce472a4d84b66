//! # Bulk Import
//!
//! Administrator-only row-based import of already-parsed tabular data.
//! Each row carries a matricula, a program name, a course name and one
//! grade. Rows flow through the regular services, so validation and
//! auditing apply unchanged. A bad row is counted and skipped; the
//! batch never aborts.

use crate::auth::Account;
use crate::model::{Course, Program, Student};
use crate::observability::Logger;
use crate::service::{
    Core, CreateCourseRequest, CreateGradeRequest, CreateStudentRequest, ServiceError,
    ServiceResult,
};

/// One parsed input row. Name fields are optional; absent names get a
/// placeholder so the student can be completed later.
#[derive(Debug, Clone)]
pub struct ImportRow {
    pub matricula: String,
    pub paternal_surname: Option<String>,
    pub maternal_surname: Option<String>,
    pub first_names: Option<String>,
    pub program: String,
    pub semester: u8,
    pub course: String,
    pub score: f64,
    pub attendance: f64,
    pub term: String,
}

/// Outcome counters for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub rows: usize,
    /// Grades inserted.
    pub inserted: usize,
    pub students_created: usize,
    pub courses_created: usize,
    /// Rows whose (student, course, term) grade already existed.
    pub duplicates: usize,
    /// Rows rejected by validation (unknown program, bad range, ...).
    pub rejected: usize,
}

const PLACEHOLDER_SURNAME: &str = "No surname";
const PLACEHOLDER_NAME: &str = "No name";

/// Import a batch of rows. Administrator-only.
pub fn import_rows(
    core: &Core,
    actor: &Account,
    rows: &[ImportRow],
) -> ServiceResult<ImportReport> {
    if !actor.is_admin() {
        return Err(ServiceError::Unauthorized);
    }

    let mut report = ImportReport {
        rows: rows.len(),
        ..ImportReport::default()
    };

    for row in rows {
        match import_row(core, actor, row, &mut report) {
            Ok(()) => report.inserted += 1,
            Err(ServiceError::DuplicateEntity(_)) => report.duplicates += 1,
            Err(err) if err.is_client_error() => {
                Logger::warn(
                    "import_row_rejected",
                    &[
                        ("matricula", row.matricula.trim()),
                        ("reason", &err.to_string()),
                    ],
                );
                report.rejected += 1;
            }
            Err(err) => return Err(err),
        }
    }

    Logger::info(
        "import_finished",
        &[
            ("duplicates", &report.duplicates.to_string()),
            ("inserted", &report.inserted.to_string()),
            ("rejected", &report.rejected.to_string()),
            ("rows", &report.rows.to_string()),
        ],
    );
    Ok(report)
}

fn import_row(
    core: &Core,
    actor: &Account,
    row: &ImportRow,
    report: &mut ImportReport,
) -> ServiceResult<()> {
    // Reject bad measurements before creating anything for the row.
    crate::service::check_percent("score", row.score)?;
    crate::service::check_percent("attendance", row.attendance)?;

    let program = core
        .store()
        .program_by_name(row.program.trim())?
        .ok_or_else(|| ServiceError::NotFound("Program".to_string()))?;

    let student = find_or_create_student(core, actor, row, &program, report)?;
    let course = find_or_create_course(core, actor, row, &program, report)?;

    core.grades
        .create(
            actor,
            CreateGradeRequest {
                student_id: student.id,
                course_id: course.id,
                score: row.score,
                attendance: row.attendance,
                term: row.term.clone(),
            },
        )
        .map(|_| ())
}

fn find_or_create_student(
    core: &Core,
    actor: &Account,
    row: &ImportRow,
    program: &Program,
    report: &mut ImportReport,
) -> ServiceResult<Student> {
    if let Some(student) = core.store().student_by_matricula(row.matricula.trim())? {
        return Ok(student);
    }

    let student = core.students.create(
        actor,
        CreateStudentRequest {
            matricula: row.matricula.clone(),
            paternal_surname: placeholder(row.paternal_surname.as_deref(), PLACEHOLDER_SURNAME),
            maternal_surname: placeholder(row.maternal_surname.as_deref(), PLACEHOLDER_SURNAME),
            first_names: placeholder(row.first_names.as_deref(), PLACEHOLDER_NAME),
            gender: None,
            modality: None,
            program_id: program.id,
            semester: row.semester,
            status: "Active".to_string(),
        },
    )?;
    report.students_created += 1;
    Ok(student)
}

/// Prefer a course already owned by the row's program, then a shared
/// one; create a shared course as the fallback.
fn find_or_create_course(
    core: &Core,
    actor: &Account,
    row: &ImportRow,
    program: &Program,
    report: &mut ImportReport,
) -> ServiceResult<Course> {
    let name = row.course.trim();
    if let Some(course) = core.store().course_by_name(name, Some(program.id))? {
        return Ok(course);
    }
    if let Some(course) = core.store().course_by_name(name, None)? {
        return Ok(course);
    }

    let course = core.courses.create(
        actor,
        CreateCourseRequest {
            name: name.to_string(),
            semester: row.semester,
            program_id: None,
        },
    )?;
    report.courses_created += 1;
    Ok(course)
}

fn placeholder(value: Option<&str>, fallback: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => fallback.to_string(),
    }
}
