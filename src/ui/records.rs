use crate::entity::{Course, Enrollment, Instructor, Record, Student};
use crate::store::{Collection, RelationalStore};
use crate::ui::palette;
use owo_colors::OwoColorize;

/// One-line summary of a record's attributes, without its id
pub trait Describe: Collection {
    fn describe(&self) -> String;
}

impl Describe for Student {
    fn describe(&self) -> String {
        format!("{} ({} credits)", self.name, self.credits)
    }
}

impl Describe for Instructor {
    fn describe(&self) -> String {
        format!("{}, {}", self.name, self.department)
    }
}

impl Describe for Course {
    fn describe(&self) -> String {
        if self.instructor_id.is_empty() {
            format!("{} (unassigned)", self.title)
        } else {
            format!("{} taught by {}", self.title, self.instructor_id)
        }
    }
}

impl Describe for Enrollment {
    fn describe(&self) -> String {
        let grade = self.grade.as_deref().unwrap_or("-");
        format!(
            "{} in {}, {}, grade {}",
            self.student_id, self.course_id, self.semester, grade
        )
    }
}

/// `id  description`, id highlighted
pub fn record_line<R: Describe>(record: &R) -> String {
    format!(
        "{}  {}",
        record.id().style(palette().id.clone()),
        record.describe()
    )
}

/// Print one collection under a `name (count)` heading
pub fn print_collection<R: Describe>(store: &RelationalStore) {
    let rows = store.list::<R>();
    println!();
    println!(
        "{} ({})",
        R::KIND.collection().style(palette().title.clone()),
        rows.len()
    );
    if rows.is_empty() {
        println!("  {}", "(empty)".style(palette().muted.clone()));
    }
    for row in rows {
        println!("  {}", record_line(row));
    }
}
