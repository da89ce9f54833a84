pub mod run;
pub mod submission;
