pub mod app;
pub mod browser;
pub mod classifier;
pub mod config;
pub mod db;
pub mod domain;
pub mod infrastructure;
pub mod lists;
pub mod tasks;
