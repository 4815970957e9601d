pub mod cache;
pub mod cli;
pub mod config;
pub mod git;
pub mod model;

mod api;

pub use api::{Kamino, KaminoBuilder};
