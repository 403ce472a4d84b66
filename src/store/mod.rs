//! # Entity Store
//!
//! Storage seam for all persisted entities. The core assumes the storage
//! engine enforces row-level uniqueness (surfaced as
//! [`StoreError::Duplicate`]) and provides at least read-committed
//! isolation; it implements no concurrency control of its own.
//!
//! ## Invariants
//! - STORE-1: Uniqueness constraints are checked inside the store, under
//!   the same lock as the write.
//! - STORE-2: Deleting a student cascades deletion of its grades and risk
//!   factors; deleting a course cascades deletion of its grades. No
//!   orphans remain.
//! - STORE-3: Deleting a program detaches its courses (they become
//!   shared) rather than deleting them.

mod errors;
mod memory;

pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;

use uuid::Uuid;

use crate::auth::Account;
use crate::model::{Course, Grade, Program, RiskFactor, Student};

/// Storage operations required by the mutation pipeline.
///
/// One method group per entity table. Implementations must be safe to
/// share across threads; the reference implementation is [`MemoryStore`].
pub trait EntityStore: Send + Sync {
    // ---- programs ----

    fn insert_program(&self, program: Program) -> StoreResult<()>;
    fn program(&self, id: Uuid) -> StoreResult<Option<Program>>;
    fn program_by_name(&self, name: &str) -> StoreResult<Option<Program>>;
    fn update_program(&self, program: Program) -> StoreResult<()>;
    fn delete_program(&self, id: Uuid) -> StoreResult<()>;
    /// All programs, ordered by name.
    fn list_programs(&self) -> StoreResult<Vec<Program>>;

    // ---- students ----

    fn insert_student(&self, student: Student) -> StoreResult<()>;
    fn student(&self, id: Uuid) -> StoreResult<Option<Student>>;
    fn student_by_matricula(&self, matricula: &str) -> StoreResult<Option<Student>>;
    fn update_student(&self, student: Student) -> StoreResult<()>;
    /// Deletes the student and cascades to its grades and risk factors.
    fn delete_student(&self, id: Uuid) -> StoreResult<()>;
    /// All students, ordered by matricula.
    fn list_students(&self) -> StoreResult<Vec<Student>>;

    // ---- courses ----

    fn insert_course(&self, course: Course) -> StoreResult<()>;
    fn course(&self, id: Uuid) -> StoreResult<Option<Course>>;
    fn course_by_name(&self, name: &str, program_id: Option<Uuid>) -> StoreResult<Option<Course>>;
    fn update_course(&self, course: Course) -> StoreResult<()>;
    /// Deletes the course and cascades to its grades.
    fn delete_course(&self, id: Uuid) -> StoreResult<()>;
    /// All courses, ordered by (semester, name).
    fn list_courses(&self) -> StoreResult<Vec<Course>>;

    // ---- grades ----

    fn insert_grade(&self, grade: Grade) -> StoreResult<()>;
    fn grade(&self, id: Uuid) -> StoreResult<Option<Grade>>;
    fn update_grade(&self, grade: Grade) -> StoreResult<()>;
    fn delete_grade(&self, id: Uuid) -> StoreResult<()>;
    fn grades_for_student(&self, student_id: Uuid) -> StoreResult<Vec<Grade>>;
    fn list_grades(&self) -> StoreResult<Vec<Grade>>;

    // ---- risk factors ----

    fn insert_risk_factor(&self, factor: RiskFactor) -> StoreResult<()>;
    fn risk_factor(&self, id: Uuid) -> StoreResult<Option<RiskFactor>>;
    fn update_risk_factor(&self, factor: RiskFactor) -> StoreResult<()>;
    fn delete_risk_factor(&self, id: Uuid) -> StoreResult<()>;
    /// Factors for one student, newest term first.
    fn risk_factors_for_student(&self, student_id: Uuid) -> StoreResult<Vec<RiskFactor>>;
    fn list_risk_factors(&self) -> StoreResult<Vec<RiskFactor>>;

    // ---- accounts ----

    fn insert_account(&self, account: Account) -> StoreResult<()>;
    fn account(&self, id: Uuid) -> StoreResult<Option<Account>>;
    fn account_by_email(&self, email: &str) -> StoreResult<Option<Account>>;
    fn update_account(&self, account: Account) -> StoreResult<()>;
    fn delete_account(&self, id: Uuid) -> StoreResult<()>;
    /// All accounts, ordered by email.
    fn list_accounts(&self) -> StoreResult<Vec<Account>>;
}
