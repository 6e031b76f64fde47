pub mod tasks;
pub mod version;
