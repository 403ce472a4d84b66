//! # Reporting Projections
//!
//! Read-only aggregates for the dashboard and Pareto chart. Every read
//! passes through the same scope filter as the entity services:
//! instructors only see their own program's students and grades.

use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::{AccessKind, AccessPolicy, Account};
use crate::model::{EntityKind, RiskCategory, Student, StudentStatus};
use crate::service::ServiceResult;
use crate::store::EntityStore;

/// Grades below this score count as failing.
pub const PASSING_SCORE: f64 = 70.0;

/// Dashboard headline numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct Indicators {
    pub students: usize,
    pub dropouts: usize,
    /// Percentage of scoped students with Dropout status.
    pub dropout_rate: f64,
    pub grades: usize,
    pub failing: usize,
    /// Percentage of scoped grades below [`PASSING_SCORE`].
    pub failing_rate: f64,
}

/// One bar of the Pareto chart.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryFrequency {
    pub category: RiskCategory,
    pub count: usize,
    /// Running share of the total, in percent.
    pub cumulative_percent: f64,
}

pub struct ReportService {
    store: Arc<dyn EntityStore>,
}

impl ReportService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub fn indicators(&self, actor: &Account) -> ServiceResult<Indicators> {
        let students = self.scoped_students(actor)?;
        let student_ids: HashMap<_, _> = students.iter().map(|s| (s.id, ())).collect();

        let grades: Vec<_> = self
            .store
            .list_grades()?
            .into_iter()
            .filter(|g| student_ids.contains_key(&g.student_id))
            .collect();

        let dropouts = students
            .iter()
            .filter(|s| s.status == StudentStatus::Dropout)
            .count();
        let failing = grades.iter().filter(|g| g.score < PASSING_SCORE).count();

        let failing_rate = if students.is_empty() {
            0.0
        } else {
            round2(100.0 * failing as f64 / grades.len().max(1) as f64)
        };
        let dropout_rate = round2(100.0 * dropouts as f64 / students.len().max(1) as f64);

        Ok(Indicators {
            students: students.len(),
            dropouts,
            dropout_rate,
            grades: grades.len(),
            failing,
            failing_rate,
        })
    }

    /// Risk factor counts over scoped Dropout students, descending by
    /// count with cumulative percentages (Pareto ordering). Categories
    /// with no occurrences are omitted.
    pub fn risk_factor_frequency(
        &self,
        actor: &Account,
        semester: Option<u8>,
    ) -> ServiceResult<Vec<CategoryFrequency>> {
        let dropouts: HashMap<_, _> = self
            .scoped_students(actor)?
            .into_iter()
            .filter(|s| s.status == StudentStatus::Dropout)
            .filter(|s| semester.map_or(true, |sem| s.semester == sem))
            .map(|s| (s.id, ()))
            .collect();

        let mut counts: HashMap<RiskCategory, usize> = HashMap::new();
        for factor in self.store.list_risk_factors()? {
            if dropouts.contains_key(&factor.student_id) {
                *counts.entry(factor.category).or_insert(0) += 1;
            }
        }

        let mut ordered: Vec<(RiskCategory, usize)> = counts.into_iter().collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));

        let total: usize = ordered.iter().map(|(_, n)| n).sum();
        let mut running = 0;
        let frequencies = ordered
            .into_iter()
            .map(|(category, count)| {
                running += count;
                CategoryFrequency {
                    category,
                    count,
                    cumulative_percent: round2(100.0 * running as f64 / total as f64),
                }
            })
            .collect();
        Ok(frequencies)
    }

    /// Distinct semesters with scoped Dropout students, ascending.
    pub fn dropout_semesters(&self, actor: &Account) -> ServiceResult<Vec<u8>> {
        let mut semesters: Vec<u8> = self
            .scoped_students(actor)?
            .into_iter()
            .filter(|s| s.status == StudentStatus::Dropout)
            .map(|s| s.semester)
            .collect();
        semesters.sort_unstable();
        semesters.dedup();
        Ok(semesters)
    }

    fn scoped_students(&self, actor: &Account) -> ServiceResult<Vec<Student>> {
        let mut students = self.store.list_students()?;
        students.retain(|s| {
            AccessPolicy::can_access(
                actor,
                AccessKind::Read,
                EntityKind::Student,
                Some(s.program_id),
            )
        });
        Ok(students)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
