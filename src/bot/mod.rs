pub mod commands;
pub mod digest;
pub mod service;
