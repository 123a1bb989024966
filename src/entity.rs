//! Entity types - the four record kinds held by the store
//!
//! - `Student`: id, name, credits
//! - `Instructor`: id, name, department
//! - `Course`: id, title, instructor reference
//! - `Enrollment`: id, student and course references, semester, optional grade
//!
//! Wire field names follow the classic school API (`student_id`,
//! `instructor_id`, `enrollment_semester`, ...), so records serialize
//! directly into listing responses.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The four entity kinds, one collection each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Student,
    Instructor,
    Course,
    Enrollment,
}

impl EntityKind {
    /// Get the string representation of the entity kind
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Student => "student",
            EntityKind::Instructor => "instructor",
            EntityKind::Course => "course",
            EntityKind::Enrollment => "enrollment",
        }
    }

    /// Capitalized name used in messages
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Student => "Student",
            EntityKind::Instructor => "Instructor",
            EntityKind::Course => "Course",
            EntityKind::Enrollment => "Enrollment",
        }
    }

    /// Plural collection name
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Student => "students",
            EntityKind::Instructor => "instructors",
            EntityKind::Course => "courses",
            EntityKind::Enrollment => "enrollments",
        }
    }

    /// Get all entity kinds, referenced kinds before their dependents
    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::Instructor,
            EntityKind::Student,
            EntityKind::Course,
            EntityKind::Enrollment,
        ]
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "student" | "students" => Ok(EntityKind::Student),
            "instructor" | "instructors" => Ok(EntityKind::Instructor),
            "course" | "courses" => Ok(EntityKind::Course),
            "enrollment" | "enrollments" => Ok(EntityKind::Enrollment),
            _ => Err(Error::UnknownEntity(s.to_string())),
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A row in one of the store's collections.
pub trait Record: Clone + std::fmt::Debug {
    /// Collection this record lives in
    const KIND: EntityKind;

    /// Unique key within the collection
    fn id(&self) -> &str;

    /// Outgoing references as `(target kind, target id)` pairs.
    ///
    /// Optional references that are empty are omitted.
    fn references(&self) -> Vec<(EntityKind, &str)> {
        Vec::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "student_id")]
    pub id: String,
    pub name: String,
    pub credits: u32,
}

impl Student {
    pub fn new(id: impl Into<String>, name: impl Into<String>, credits: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            credits,
        }
    }
}

impl Record for Student {
    const KIND: EntityKind = EntityKind::Student;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructor {
    #[serde(rename = "instructor_id")]
    pub id: String,
    pub name: String,
    pub department: String,
}

impl Instructor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            department: department.into(),
        }
    }
}

impl Record for Instructor {
    const KIND: EntityKind = EntityKind::Instructor;

    fn id(&self) -> &str {
        &self.id
    }
}

/// A course, optionally taught by an instructor.
///
/// An empty `instructor_id` means the course has no instructor assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    #[serde(rename = "course_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub instructor_id: String,
}

impl Course {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        instructor_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            instructor_id: instructor_id.into(),
        }
    }
}

impl Record for Course {
    const KIND: EntityKind = EntityKind::Course;

    fn id(&self) -> &str {
        &self.id
    }

    fn references(&self) -> Vec<(EntityKind, &str)> {
        if self.instructor_id.is_empty() {
            Vec::new()
        } else {
            vec![(EntityKind::Instructor, self.instructor_id.as_str())]
        }
    }
}

/// A student's enrollment in a course for one semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    #[serde(rename = "enrollment_id")]
    pub id: String,
    pub student_id: String,
    pub course_id: String,
    #[serde(rename = "enrollment_semester", alias = "semester")]
    pub semester: String,
    #[serde(rename = "enrollment_grade", alias = "grade", default)]
    pub grade: Option<String>,
}

impl Enrollment {
    pub fn new(
        id: impl Into<String>,
        student_id: impl Into<String>,
        course_id: impl Into<String>,
        semester: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            student_id: student_id.into(),
            course_id: course_id.into(),
            semester: semester.into(),
            grade: None,
        }
    }

    /// Set the grade
    pub fn with_grade(mut self, grade: impl Into<String>) -> Self {
        self.grade = Some(grade.into());
        self
    }
}

impl Record for Enrollment {
    const KIND: EntityKind = EntityKind::Enrollment;

    fn id(&self) -> &str {
        &self.id
    }

    fn references(&self) -> Vec<(EntityKind, &str)> {
        vec![
            (EntityKind::Student, self.student_id.as_str()),
            (EntityKind::Course, self.course_id.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        for kind in EntityKind::all() {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), *kind);
            assert_eq!(kind.collection().parse::<EntityKind>().unwrap(), *kind);
        }
        assert!(matches!(
            "janitor".parse::<EntityKind>(),
            Err(Error::UnknownEntity(_))
        ));
    }

    #[test]
    fn test_course_without_instructor_has_no_references() {
        let course = Course::new("C1", "Algorithms", "");
        assert!(course.references().is_empty());

        let taught = Course::new("C2", "Compilers", "I1");
        assert_eq!(taught.references(), vec![(EntityKind::Instructor, "I1")]);
    }

    #[test]
    fn test_enrollment_wire_names() {
        let enrollment = Enrollment::new("E1", "S1", "C1", "Fall").with_grade("A");
        let json = serde_json::to_value(&enrollment).unwrap();

        assert_eq!(json["enrollment_id"], "E1");
        assert_eq!(json["enrollment_semester"], "Fall");
        assert_eq!(json["enrollment_grade"], "A");

        let parsed: Enrollment = serde_json::from_str(
            r#"{"enrollment_id":"E2","student_id":"S1","course_id":"C1","semester":"Spring"}"#,
        )
        .unwrap();
        assert_eq!(parsed.semester, "Spring");
        assert_eq!(parsed.grade, None);
    }
}
