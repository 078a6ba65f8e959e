pub mod ai;
pub mod analytics;
pub mod rest;
