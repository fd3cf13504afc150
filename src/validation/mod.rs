pub mod classifier;
pub mod controller;
pub mod job;
