//! Cross-platform utilities shared by the built-in handlers

pub mod platform;
