//! # Domain Model
//!
//! Entity types for the academic records core: programs, students,
//! courses, grades and dropout risk factors.
//!
//! ## Invariants
//! - MODEL-1: Students and courses reference their program by stable id,
//!   never by denormalized name; display names resolve at read time.
//! - MODEL-2: Grade score and attendance are percentages in [0, 100].
//! - MODEL-3: Risk factors are only meaningful for students in Dropout
//!   status; the mutation layer enforces this.

mod snapshot;

pub use snapshot::Snapshot;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Entity kinds known to the access policy and the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Program,
    Student,
    Course,
    Grade,
    RiskFactor,
    Account,
    /// The audit trail itself (administrator-only, read-only).
    AuditTrail,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Program => "Program",
            EntityKind::Student => "Student",
            EntityKind::Course => "Course",
            EntityKind::Grade => "Grade",
            EntityKind::RiskFactor => "RiskFactor",
            EntityKind::Account => "Account",
            EntityKind::AuditTrail => "AuditTrail",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An academic degree program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub id: Uuid,

    /// Unique program name.
    pub name: String,

    /// Optional unique short code (e.g., "SE").
    pub code: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Program {
    pub fn new(name: impl Into<String>, code: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            code,
            created_at: Utc::now(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new()
            .field("name", &self.name)
            .field_opt("code", self.code.as_ref())
    }
}

/// Enrollment status of a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StudentStatus {
    Active,
    Dropout,
    Graduated,
}

impl StudentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StudentStatus::Active => "Active",
            StudentStatus::Dropout => "Dropout",
            StudentStatus::Graduated => "Graduated",
        }
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StudentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(StudentStatus::Active),
            "Dropout" => Ok(StudentStatus::Dropout),
            "Graduated" => Ok(StudentStatus::Graduated),
            other => Err(format!("unknown student status: {}", other)),
        }
    }
}

/// An enrolled (or formerly enrolled) student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,

    /// Globally unique enrollment id.
    pub matricula: String,

    pub paternal_surname: String,
    pub maternal_surname: String,
    pub first_names: String,

    pub gender: Option<String>,
    pub modality: Option<String>,

    /// Owning program, by stable id.
    pub program_id: Uuid,

    pub semester: u8,
    pub status: StudentStatus,

    pub created_at: DateTime<Utc>,
}

impl Student {
    /// Full display name in "paternal maternal first-names" order.
    pub fn full_name(&self) -> String {
        format!(
            "{} {} {}",
            self.paternal_surname, self.maternal_surname, self.first_names
        )
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new()
            .field("matricula", &self.matricula)
            .field("paternal_surname", &self.paternal_surname)
            .field("maternal_surname", &self.maternal_surname)
            .field("first_names", &self.first_names)
            .field_opt("gender", self.gender.as_ref())
            .field_opt("modality", self.modality.as_ref())
            .field("program_id", self.program_id)
            .field("semester", self.semester)
            .field("status", self.status)
    }
}

/// A course, optionally owned by a program.
///
/// A course with no program is shared: visible to every instructor and
/// open to students of any program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub semester: u8,
    pub program_id: Option<Uuid>,
}

impl Course {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new()
            .field("name", &self.name)
            .field("semester", self.semester)
            .field_opt("program_id", self.program_id.as_ref())
    }
}

/// A grade for one (student, course, term) triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grade {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,

    /// Score in [0, 100].
    pub score: f64,

    /// Attendance percentage in [0, 100].
    pub attendance: f64,

    /// Academic period label, e.g. "2025-1".
    pub term: String,
}

impl Grade {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new()
            .field("student_id", self.student_id)
            .field("course_id", self.course_id)
            .field("score", self.score)
            .field("attendance", self.attendance)
            .field("term", &self.term)
    }
}

/// Category of a dropout risk factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    Academic,
    Psychosocial,
    Economic,
    Institutional,
    Contextual,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Academic => "Academic",
            RiskCategory::Psychosocial => "Psychosocial",
            RiskCategory::Economic => "Economic",
            RiskCategory::Institutional => "Institutional",
            RiskCategory::Contextual => "Contextual",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RiskCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Academic" => Ok(RiskCategory::Academic),
            "Psychosocial" => Ok(RiskCategory::Psychosocial),
            "Economic" => Ok(RiskCategory::Economic),
            "Institutional" => Ok(RiskCategory::Institutional),
            "Contextual" => Ok(RiskCategory::Contextual),
            other => Err(format!("unknown risk category: {}", other)),
        }
    }
}

/// A recorded cause contributing to a student's dropout.
///
/// At most one factor per (student, term, category) combination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFactor {
    pub id: Uuid,
    pub student_id: Uuid,
    pub category: RiskCategory,

    /// Free-form label describing the factor.
    pub value: String,

    pub term: String,
}

impl RiskFactor {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new()
            .field("student_id", self.student_id)
            .field("category", self.category)
            .field("value", &self.value)
            .field("term", &self.term)
    }
}
