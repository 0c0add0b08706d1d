pub mod backend;
pub mod entry;
pub mod risk;
