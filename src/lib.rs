//! Notes and Users CRUD services sharing one startup, validation and
//! persistence toolkit. Each service runs as its own binary against its own
//! tables; they share no data.

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod notes;
pub mod startup;
pub mod state;
pub mod telemetry;
pub mod users;
pub mod validation;
