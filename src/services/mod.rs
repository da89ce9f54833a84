pub mod ranking;
pub mod submission;
