mod course_form;
mod course_students;
mod courses;
mod events;
mod logs;
mod metrics;
mod user_form;
mod users;

pub use course_form::CourseFormView;
pub use course_students::CourseStudentsView;
pub use courses::CoursesView;
pub use events::EventsView;
pub use logs::LogsView;
pub use metrics::MetricsView;
pub use user_form::{UserFormView, UserTarget};
pub use users::UsersView;
