pub mod json;
pub mod notice;
pub mod table;
