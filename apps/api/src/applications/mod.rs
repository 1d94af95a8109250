//! Tracked job applications: storage, lifecycle rules and dashboard stats.

pub mod handlers;
pub mod lifecycle;
pub mod repository;
