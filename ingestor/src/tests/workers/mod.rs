pub mod coordinator;
pub mod geometry;
