//! Seed fixtures - load a known dataset through the validated write path
//!
//! A seed is a JSON document with one array per collection:
//!
//! ```json
//! {
//!   "instructors": [{"instructor_id": "I1", "name": "Ada", "department": "CS"}],
//!   "students": [{"student_id": "S1", "name": "Grace", "credits": 12}],
//!   "courses": [{"course_id": "C1", "title": "Algorithms", "instructor_id": "I1"}],
//!   "enrollments": [{"enrollment_id": "E1", "student_id": "S1", "course_id": "C1", "semester": "Fall"}]
//! }
//! ```

use crate::entity::{Course, Enrollment, Instructor, Student};
use crate::store::{Collection, RelationalStore};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A full dataset, one vector per collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub instructors: Vec<Instructor>,
    pub students: Vec<Student>,
    pub courses: Vec<Course>,
    pub enrollments: Vec<Enrollment>,
}

impl Seed {
    /// Read a seed from a JSON file
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The instructor/course dataset used by `demo` when no file is given
    pub fn sample() -> Self {
        Self {
            instructors: vec![
                Instructor::new("I1", "Ada", "CS"),
                Instructor::new("I2", "Emmy", "Math"),
            ],
            students: vec![
                Student::new("S1", "Grace", 12),
                Student::new("S2", "Linus", 9),
            ],
            courses: vec![
                Course::new("C1", "Algorithms", "I1"),
                Course::new("C2", "Abstract Algebra", "I2"),
            ],
            enrollments: vec![
                Enrollment::new("E1", "S1", "C1", "Fall").with_grade("A"),
                Enrollment::new("E2", "S2", "C2", "Spring"),
            ],
        }
    }

    /// Build a fresh store from this seed.
    ///
    /// Rows are inserted referenced-first so references resolve. The first
    /// rejected row aborts the build.
    pub fn build(&self) -> Result<RelationalStore> {
        let mut store = RelationalStore::new();
        insert_all(&mut store, &self.instructors)?;
        insert_all(&mut store, &self.students)?;
        insert_all(&mut store, &self.courses)?;
        insert_all(&mut store, &self.enrollments)?;
        Ok(store)
    }

    /// Replace `store` with this dataset.
    ///
    /// On failure `store` is left exactly as it was.
    pub fn apply(&self, store: &mut RelationalStore) -> Result<()> {
        let seeded = self.build()?;
        *store = seeded;
        tracing::info!("Seeded store: {} rows", store.stats().total());
        Ok(())
    }
}

fn insert_all<R: Collection>(store: &mut RelationalStore, rows: &[R]) -> Result<()> {
    for row in rows {
        store.create(row.clone())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntityKind, Error};

    #[test]
    fn test_sample_builds() {
        let store = Seed::sample().build().unwrap();
        let stats = store.stats();
        assert_eq!(stats.instructors, 2);
        assert_eq!(stats.students, 2);
        assert_eq!(stats.courses, 2);
        assert_eq!(stats.enrollments, 2);
    }

    #[test]
    fn test_from_json_with_missing_collections() {
        let seed = Seed::from_json(
            r#"{"instructors": [{"instructor_id": "I1", "name": "Ada", "department": "CS"}]}"#,
        )
        .unwrap();
        assert_eq!(seed.instructors.len(), 1);
        assert!(seed.enrollments.is_empty());
    }

    #[test]
    fn test_apply_is_all_or_nothing() {
        let mut store = Seed::sample().build().unwrap();
        let before = store.stats();

        let mut broken = Seed::sample();
        broken.courses.push(Course::new("C3", "Compilers", "I9"));

        let err = broken.apply(&mut store).unwrap_err();
        assert!(matches!(
            err,
            Error::ForeignKeyViolation { kind: EntityKind::Course, .. }
        ));
        assert_eq!(store.stats(), before);
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(&path, serde_json::to_string(&Seed::sample()).unwrap()).unwrap();

        let seed = Seed::from_path(&path).unwrap();
        assert_eq!(seed.enrollments[0].grade.as_deref(), Some("A"));
    }
}
