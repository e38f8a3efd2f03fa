mod assignments;
mod course;
mod courses;
mod grades;

pub use assignments::AssignmentsView;
pub use course::CourseView;
pub use courses::CoursesView;
pub use grades::GradesView;
