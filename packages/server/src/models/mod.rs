pub mod category;
pub mod content;
pub mod public;
pub mod shared;
