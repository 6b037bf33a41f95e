pub mod directory;
pub mod timetable;
