pub mod course;
pub mod course_progress;
pub mod payment;
pub mod user;

pub use course::*;
pub use course_progress::*;
pub use payment::*;
pub use user::*;
