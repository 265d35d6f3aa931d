//! Post creation and listing handlers.

pub mod handlers;
