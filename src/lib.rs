pub mod cache;
pub mod cli;
pub mod config;
pub mod correlation;
pub mod error;
pub mod io;
pub mod math;
pub mod pool;
pub mod rank_response;
pub mod schema;
pub mod service;
pub mod upstream;
