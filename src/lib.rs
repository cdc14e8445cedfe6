// src/lib.rs

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod storage;
pub mod utils;

pub use database::Database;
pub use routes::create_router;
