pub mod config;
pub mod localized;
pub mod storage;

pub use localized::{LocalizedPatch, LocalizedText};
