pub mod attendance;
pub mod core;
pub mod dashboard;
pub mod events;
pub mod groups;
pub mod notifications;
pub mod planner;
pub mod subjects;
pub mod timetables;
pub mod users;
