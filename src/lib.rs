pub mod admission;
pub mod aggregation;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod models;
pub mod mutation;
pub mod render;
pub mod response;
pub mod server;
pub mod store;
pub mod validation;

pub use admission::{AdmissionConfig, AdmissionController};
pub use config::Config;
pub use error::{Error, Result};
pub use models::{Laureate, Prize};
pub use server::{build_state, create_app, Server};
pub use store::RecordStore;
