pub mod activity;
pub mod day_window;

pub use activity::{ActivityRecord, TIMESTAMP_FIELDS};
pub use day_window::DayWindow;
