//! Task operations - business logic for the web service
//!
//! Storage-agnostic and HTTP-agnostic: handlers own status codes, the
//! document store owns persistence.

pub mod tasks;
