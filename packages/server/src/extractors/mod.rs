pub mod json;
pub mod submission;
