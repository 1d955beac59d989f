pub mod category;
pub mod content_record;
pub mod sub_category;
