//! Leave-request workflow for an academic institution: submission,
//! HOD and Principal approval, balance accounting and notifications.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod docs;
pub mod model;
pub mod models;
pub mod routes;
pub mod store;
pub mod workflow;
