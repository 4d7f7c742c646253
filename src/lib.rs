pub mod config;
pub mod drivers;
pub mod engine;
pub mod gui;
pub mod types;
pub mod worker;
