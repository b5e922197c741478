//! Command handlers, one module per command group.

pub mod books;
pub mod init;
pub mod loans;
pub mod maintenance;
pub mod members;
pub mod misc;
