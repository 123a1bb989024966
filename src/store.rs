//! Relational Store - in-memory collections with integrity checks
//!
//! Holds one `Table` per entity kind and validates every mutation before
//! applying it:
//! - identifiers are unique within a table
//! - references must resolve to an existing row in the target table
//! - a row that is still referenced cannot be removed
//!
//! A rejected mutation leaves the store untouched.

use crate::entity::{Course, Enrollment, EntityKind, Instructor, Record, Student};
use crate::{Error, Result};
use serde::Serialize;

/// One collection of records, kept in insertion order.
#[derive(Debug, Clone)]
pub struct Table<R> {
    rows: Vec<R>,
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<R: Record> Table<R> {
    /// All rows in insertion order
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    /// Get a row by its identifier
    pub fn get(&self, id: &str) -> Option<&R> {
        self.rows.iter().find(|row| row.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.rows.iter().position(|row| row.id() == id)
    }

    /// Rows holding a reference to `(kind, id)`
    fn referencing<'a>(&'a self, kind: EntityKind, id: &'a str) -> impl Iterator<Item = &'a R> {
        self.rows.iter().filter(move |row| {
            row.references()
                .iter()
                .any(|(target, reference)| *target == kind && *reference == id)
        })
    }
}

/// Record types the store keeps a table for.
pub trait Collection: Record {
    fn table(store: &RelationalStore) -> &Table<Self>;
    fn table_mut(store: &mut RelationalStore) -> &mut Table<Self>;
}

impl Collection for Student {
    fn table(store: &RelationalStore) -> &Table<Self> {
        &store.students
    }

    fn table_mut(store: &mut RelationalStore) -> &mut Table<Self> {
        &mut store.students
    }
}

impl Collection for Instructor {
    fn table(store: &RelationalStore) -> &Table<Self> {
        &store.instructors
    }

    fn table_mut(store: &mut RelationalStore) -> &mut Table<Self> {
        &mut store.instructors
    }
}

impl Collection for Course {
    fn table(store: &RelationalStore) -> &Table<Self> {
        &store.courses
    }

    fn table_mut(store: &mut RelationalStore) -> &mut Table<Self> {
        &mut store.courses
    }
}

impl Collection for Enrollment {
    fn table(store: &RelationalStore) -> &Table<Self> {
        &store.enrollments
    }

    fn table_mut(store: &mut RelationalStore) -> &mut Table<Self> {
        &mut store.enrollments
    }
}

/// In-memory store for students, instructors, courses and enrollments.
///
/// Mutations take `&mut self`, so a single owner serializes writes. Callers
/// that share a store across tasks wrap it in a lock.
///
/// Removing a row that another row still references is rejected with
/// `Error::ReferentialIntegrityViolation`; nothing is cascaded.
#[derive(Debug, Clone, Default)]
pub struct RelationalStore {
    students: Table<Student>,
    instructors: Table<Instructor>,
    courses: Table<Course>,
    enrollments: Table<Enrollment>,
}

impl RelationalStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// All records of one kind, in insertion order
    pub fn list<R: Collection>(&self) -> &[R] {
        R::table(self).rows()
    }

    /// Direct key lookup
    pub fn get<R: Collection>(&self, id: &str) -> Option<&R> {
        R::table(self).get(id)
    }

    /// Check whether a row of `kind` with `id` exists
    pub fn contains(&self, kind: EntityKind, id: &str) -> bool {
        match kind {
            EntityKind::Student => self.students.contains(id),
            EntityKind::Instructor => self.instructors.contains(id),
            EntityKind::Course => self.courses.contains(id),
            EntityKind::Enrollment => self.enrollments.contains(id),
        }
    }

    /// Insert a new record.
    ///
    /// Fails with `DuplicateKey` if the identifier is taken, or with
    /// `ForeignKeyViolation` if a reference does not resolve.
    pub fn create<R: Collection>(&mut self, record: R) -> Result<&R> {
        if R::table(self).contains(record.id()) {
            tracing::debug!("Rejecting duplicate {} '{}'", R::KIND.as_str(), record.id());
            return Err(Error::DuplicateKey {
                kind: R::KIND,
                id: record.id().to_string(),
            });
        }
        self.check_references(&record)?;

        tracing::debug!("Created {} '{}'", R::KIND.as_str(), record.id());
        let rows = &mut R::table_mut(self).rows;
        let index = rows.len();
        rows.push(record);
        Ok(&rows[index])
    }

    /// Replace the row whose identifier equals `record.id()`.
    ///
    /// The row keeps its position in the table.
    pub fn update<R: Collection>(&mut self, record: R) -> Result<&R> {
        let Some(index) = R::table(self).position(record.id()) else {
            return Err(Error::NotFound {
                kind: R::KIND,
                id: record.id().to_string(),
            });
        };
        self.check_references(&record)?;

        tracing::debug!("Updated {} '{}'", R::KIND.as_str(), record.id());
        let rows = &mut R::table_mut(self).rows;
        rows[index] = record;
        Ok(&rows[index])
    }

    /// Delete a row, returning it.
    ///
    /// Fails with `NotFound` if absent, or `ReferentialIntegrityViolation`
    /// if a course or enrollment still points at it.
    pub fn remove<R: Collection>(&mut self, id: &str) -> Result<R> {
        let Some(index) = R::table(self).position(id) else {
            return Err(Error::NotFound {
                kind: R::KIND,
                id: id.to_string(),
            });
        };

        if let Some((dependent, dependent_id)) = self.find_dependent(R::KIND, id) {
            tracing::debug!(
                "Refusing to remove {} '{}': referenced by {} '{}'",
                R::KIND.as_str(),
                id,
                dependent.as_str(),
                dependent_id
            );
            return Err(Error::ReferentialIntegrityViolation {
                kind: R::KIND,
                id: id.to_string(),
                dependent,
                dependent_id,
            });
        }

        tracing::debug!("Removed {} '{}'", R::KIND.as_str(), id);
        Ok(R::table_mut(self).rows.remove(index))
    }

    /// Clear all four collections
    pub fn reset(&mut self) {
        *self = Self::new();
        tracing::info!("Store reset");
    }

    /// Get row counts per collection
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            students: self.students.len(),
            instructors: self.instructors.len(),
            courses: self.courses.len(),
            enrollments: self.enrollments.len(),
        }
    }

    /// Check every reference of `record` before anything is written
    fn check_references<R: Record>(&self, record: &R) -> Result<()> {
        for (target, reference) in record.references() {
            if !self.contains(target, reference) {
                tracing::debug!(
                    "{} '{}' references missing {} '{}'",
                    R::KIND.as_str(),
                    record.id(),
                    target.as_str(),
                    reference
                );
                return Err(Error::ForeignKeyViolation {
                    kind: R::KIND,
                    id: record.id().to_string(),
                    target,
                    reference: reference.to_string(),
                });
            }
        }
        Ok(())
    }

    /// First row that still references `(kind, id)`, if any
    fn find_dependent(&self, kind: EntityKind, id: &str) -> Option<(EntityKind, String)> {
        self.courses
            .referencing(kind, id)
            .map(|course| (Course::KIND, course.id.clone()))
            .chain(
                self.enrollments
                    .referencing(kind, id)
                    .map(|enrollment| (Enrollment::KIND, enrollment.id.clone())),
            )
            .next()
    }
}

/// Row counts of a store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub students: usize,
    pub instructors: usize,
    pub courses: usize,
    pub enrollments: usize,
}

impl StoreStats {
    pub fn total(&self) -> usize {
        self.students + self.instructors + self.courses + self.enrollments
    }

    /// `(kind, count)` pairs in dependency order
    pub fn rows(&self) -> Vec<(EntityKind, usize)> {
        vec![
            (EntityKind::Instructor, self.instructors),
            (EntityKind::Student, self.students),
            (EntityKind::Course, self.courses),
            (EntityKind::Enrollment, self.enrollments),
        ]
    }
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Store Statistics:")?;
        writeln!(f, "  Students: {}", self.students)?;
        writeln!(f, "  Instructors: {}", self.instructors)?;
        writeln!(f, "  Courses: {}", self.courses)?;
        writeln!(f, "  Enrollments: {}", self.enrollments)
    }
}
