//! In-memory entity store
//!
//! Reference implementation backed by a single `RwLock` over all tables,
//! so cascading deletes and uniqueness checks run under one lock. Lock
//! poisoning maps to `StoreError::Storage` rather than a panic.

use std::sync::RwLock;

use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use super::EntityStore;
use crate::auth::Account;
use crate::model::{Course, EntityKind, Grade, Program, RiskFactor, Student};

#[derive(Debug, Default)]
struct Tables {
    programs: Vec<Program>,
    students: Vec<Student>,
    courses: Vec<Course>,
    grades: Vec<Grade>,
    risk_factors: Vec<RiskFactor>,
    accounts: Vec<Account>,
}

/// RwLock-backed store for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))
    }
}

fn program_conflicts(tables: &Tables, candidate: &Program) -> Option<String> {
    for p in &tables.programs {
        if p.id == candidate.id {
            continue;
        }
        if p.name == candidate.name {
            return Some(format!("name {}", candidate.name));
        }
        if let (Some(a), Some(b)) = (&p.code, &candidate.code) {
            if a == b {
                return Some(format!("code {}", b));
            }
        }
    }
    None
}

fn course_conflicts(tables: &Tables, candidate: &Course) -> bool {
    tables.courses.iter().any(|c| {
        c.id != candidate.id && c.name == candidate.name && c.program_id == candidate.program_id
    })
}

fn grade_conflicts(tables: &Tables, candidate: &Grade) -> bool {
    tables.grades.iter().any(|g| {
        g.id != candidate.id
            && g.student_id == candidate.student_id
            && g.course_id == candidate.course_id
            && g.term == candidate.term
    })
}

fn factor_conflicts(tables: &Tables, candidate: &RiskFactor) -> bool {
    tables.risk_factors.iter().any(|f| {
        f.id != candidate.id
            && f.student_id == candidate.student_id
            && f.term == candidate.term
            && f.category == candidate.category
    })
}

impl EntityStore for MemoryStore {
    // ---- programs ----

    fn insert_program(&self, program: Program) -> StoreResult<()> {
        let mut tables = self.write()?;
        if let Some(constraint) = program_conflicts(&tables, &program) {
            return Err(StoreError::duplicate(EntityKind::Program, constraint));
        }
        tables.programs.push(program);
        Ok(())
    }

    fn program(&self, id: Uuid) -> StoreResult<Option<Program>> {
        Ok(self.read()?.programs.iter().find(|p| p.id == id).cloned())
    }

    fn program_by_name(&self, name: &str) -> StoreResult<Option<Program>> {
        Ok(self
            .read()?
            .programs
            .iter()
            .find(|p| p.name == name)
            .cloned())
    }

    fn update_program(&self, program: Program) -> StoreResult<()> {
        let mut tables = self.write()?;
        if let Some(constraint) = program_conflicts(&tables, &program) {
            return Err(StoreError::duplicate(EntityKind::Program, constraint));
        }
        match tables.programs.iter_mut().find(|p| p.id == program.id) {
            Some(existing) => {
                *existing = program;
                Ok(())
            }
            None => Err(StoreError::not_found(EntityKind::Program)),
        }
    }

    fn delete_program(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.write()?;
        let before = tables.programs.len();
        tables.programs.retain(|p| p.id != id);
        if tables.programs.len() == before {
            return Err(StoreError::not_found(EntityKind::Program));
        }
        // Owned courses become shared rather than disappearing.
        for course in &mut tables.courses {
            if course.program_id == Some(id) {
                course.program_id = None;
            }
        }
        Ok(())
    }

    fn list_programs(&self) -> StoreResult<Vec<Program>> {
        let mut programs = self.read()?.programs.clone();
        programs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(programs)
    }

    // ---- students ----

    fn insert_student(&self, student: Student) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables
            .students
            .iter()
            .any(|s| s.matricula == student.matricula)
        {
            return Err(StoreError::duplicate(
                EntityKind::Student,
                format!("matricula {}", student.matricula),
            ));
        }
        tables.students.push(student);
        Ok(())
    }

    fn student(&self, id: Uuid) -> StoreResult<Option<Student>> {
        Ok(self.read()?.students.iter().find(|s| s.id == id).cloned())
    }

    fn student_by_matricula(&self, matricula: &str) -> StoreResult<Option<Student>> {
        Ok(self
            .read()?
            .students
            .iter()
            .find(|s| s.matricula == matricula)
            .cloned())
    }

    fn update_student(&self, student: Student) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables
            .students
            .iter()
            .any(|s| s.id != student.id && s.matricula == student.matricula)
        {
            return Err(StoreError::duplicate(
                EntityKind::Student,
                format!("matricula {}", student.matricula),
            ));
        }
        match tables.students.iter_mut().find(|s| s.id == student.id) {
            Some(existing) => {
                *existing = student;
                Ok(())
            }
            None => Err(StoreError::not_found(EntityKind::Student)),
        }
    }

    fn delete_student(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.write()?;
        let before = tables.students.len();
        tables.students.retain(|s| s.id != id);
        if tables.students.len() == before {
            return Err(StoreError::not_found(EntityKind::Student));
        }
        tables.grades.retain(|g| g.student_id != id);
        tables.risk_factors.retain(|f| f.student_id != id);
        Ok(())
    }

    fn list_students(&self) -> StoreResult<Vec<Student>> {
        let mut students = self.read()?.students.clone();
        students.sort_by(|a, b| a.matricula.cmp(&b.matricula));
        Ok(students)
    }

    // ---- courses ----

    fn insert_course(&self, course: Course) -> StoreResult<()> {
        let mut tables = self.write()?;
        if course_conflicts(&tables, &course) {
            return Err(StoreError::duplicate(
                EntityKind::Course,
                format!("name {} for program", course.name),
            ));
        }
        tables.courses.push(course);
        Ok(())
    }

    fn course(&self, id: Uuid) -> StoreResult<Option<Course>> {
        Ok(self.read()?.courses.iter().find(|c| c.id == id).cloned())
    }

    fn course_by_name(&self, name: &str, program_id: Option<Uuid>) -> StoreResult<Option<Course>> {
        Ok(self
            .read()?
            .courses
            .iter()
            .find(|c| c.name == name && c.program_id == program_id)
            .cloned())
    }

    fn update_course(&self, course: Course) -> StoreResult<()> {
        let mut tables = self.write()?;
        if course_conflicts(&tables, &course) {
            return Err(StoreError::duplicate(
                EntityKind::Course,
                format!("name {} for program", course.name),
            ));
        }
        match tables.courses.iter_mut().find(|c| c.id == course.id) {
            Some(existing) => {
                *existing = course;
                Ok(())
            }
            None => Err(StoreError::not_found(EntityKind::Course)),
        }
    }

    fn delete_course(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.write()?;
        let before = tables.courses.len();
        tables.courses.retain(|c| c.id != id);
        if tables.courses.len() == before {
            return Err(StoreError::not_found(EntityKind::Course));
        }
        tables.grades.retain(|g| g.course_id != id);
        Ok(())
    }

    fn list_courses(&self) -> StoreResult<Vec<Course>> {
        let mut courses = self.read()?.courses.clone();
        courses.sort_by(|a, b| (a.semester, &a.name).cmp(&(b.semester, &b.name)));
        Ok(courses)
    }

    // ---- grades ----

    fn insert_grade(&self, grade: Grade) -> StoreResult<()> {
        let mut tables = self.write()?;
        if grade_conflicts(&tables, &grade) {
            return Err(StoreError::duplicate(
                EntityKind::Grade,
                format!("student/course/term {}", grade.term),
            ));
        }
        tables.grades.push(grade);
        Ok(())
    }

    fn grade(&self, id: Uuid) -> StoreResult<Option<Grade>> {
        Ok(self.read()?.grades.iter().find(|g| g.id == id).cloned())
    }

    fn update_grade(&self, grade: Grade) -> StoreResult<()> {
        let mut tables = self.write()?;
        if grade_conflicts(&tables, &grade) {
            return Err(StoreError::duplicate(
                EntityKind::Grade,
                format!("student/course/term {}", grade.term),
            ));
        }
        match tables.grades.iter_mut().find(|g| g.id == grade.id) {
            Some(existing) => {
                *existing = grade;
                Ok(())
            }
            None => Err(StoreError::not_found(EntityKind::Grade)),
        }
    }

    fn delete_grade(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.write()?;
        let before = tables.grades.len();
        tables.grades.retain(|g| g.id != id);
        if tables.grades.len() == before {
            return Err(StoreError::not_found(EntityKind::Grade));
        }
        Ok(())
    }

    fn grades_for_student(&self, student_id: Uuid) -> StoreResult<Vec<Grade>> {
        Ok(self
            .read()?
            .grades
            .iter()
            .filter(|g| g.student_id == student_id)
            .cloned()
            .collect())
    }

    fn list_grades(&self) -> StoreResult<Vec<Grade>> {
        Ok(self.read()?.grades.clone())
    }

    // ---- risk factors ----

    fn insert_risk_factor(&self, factor: RiskFactor) -> StoreResult<()> {
        let mut tables = self.write()?;
        if factor_conflicts(&tables, &factor) {
            return Err(StoreError::duplicate(
                EntityKind::RiskFactor,
                format!("{} in term {}", factor.category, factor.term),
            ));
        }
        tables.risk_factors.push(factor);
        Ok(())
    }

    fn risk_factor(&self, id: Uuid) -> StoreResult<Option<RiskFactor>> {
        Ok(self
            .read()?
            .risk_factors
            .iter()
            .find(|f| f.id == id)
            .cloned())
    }

    fn update_risk_factor(&self, factor: RiskFactor) -> StoreResult<()> {
        let mut tables = self.write()?;
        if factor_conflicts(&tables, &factor) {
            return Err(StoreError::duplicate(
                EntityKind::RiskFactor,
                format!("{} in term {}", factor.category, factor.term),
            ));
        }
        match tables.risk_factors.iter_mut().find(|f| f.id == factor.id) {
            Some(existing) => {
                *existing = factor;
                Ok(())
            }
            None => Err(StoreError::not_found(EntityKind::RiskFactor)),
        }
    }

    fn delete_risk_factor(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.write()?;
        let before = tables.risk_factors.len();
        tables.risk_factors.retain(|f| f.id != id);
        if tables.risk_factors.len() == before {
            return Err(StoreError::not_found(EntityKind::RiskFactor));
        }
        Ok(())
    }

    fn risk_factors_for_student(&self, student_id: Uuid) -> StoreResult<Vec<RiskFactor>> {
        let mut factors: Vec<RiskFactor> = self
            .read()?
            .risk_factors
            .iter()
            .filter(|f| f.student_id == student_id)
            .cloned()
            .collect();
        factors.sort_by(|a, b| b.term.cmp(&a.term));
        Ok(factors)
    }

    fn list_risk_factors(&self) -> StoreResult<Vec<RiskFactor>> {
        Ok(self.read()?.risk_factors.clone())
    }

    // ---- accounts ----

    fn insert_account(&self, account: Account) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables.accounts.iter().any(|a| a.email == account.email) {
            return Err(StoreError::duplicate(
                EntityKind::Account,
                format!("email {}", account.email),
            ));
        }
        tables.accounts.push(account);
        Ok(())
    }

    fn account(&self, id: Uuid) -> StoreResult<Option<Account>> {
        Ok(self.read()?.accounts.iter().find(|a| a.id == id).cloned())
    }

    fn account_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        Ok(self
            .read()?
            .accounts
            .iter()
            .find(|a| a.email == email)
            .cloned())
    }

    fn update_account(&self, account: Account) -> StoreResult<()> {
        let mut tables = self.write()?;
        if tables
            .accounts
            .iter()
            .any(|a| a.id != account.id && a.email == account.email)
        {
            return Err(StoreError::duplicate(
                EntityKind::Account,
                format!("email {}", account.email),
            ));
        }
        match tables.accounts.iter_mut().find(|a| a.id == account.id) {
            Some(existing) => {
                *existing = account;
                Ok(())
            }
            None => Err(StoreError::not_found(EntityKind::Account)),
        }
    }

    fn delete_account(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.write()?;
        let before = tables.accounts.len();
        tables.accounts.retain(|a| a.id != id);
        if tables.accounts.len() == before {
            return Err(StoreError::not_found(EntityKind::Account));
        }
        Ok(())
    }

    fn list_accounts(&self) -> StoreResult<Vec<Account>> {
        let mut accounts = self.read()?.accounts.clone();
        accounts.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(accounts)
    }
}
