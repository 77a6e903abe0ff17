// common/src/models/mod.rs
pub mod resources;
pub mod session;
