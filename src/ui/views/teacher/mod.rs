mod assignment_form;
mod assignments;
mod courses;
mod grade_form;
mod grades;

pub use assignment_form::{AssignmentFormView, AssignmentTarget};
pub use assignments::AssignmentsView;
pub use courses::CoursesView;
pub use grade_form::{GradeFormView, GradeTarget};
pub use grades::GradesView;
