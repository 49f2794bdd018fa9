pub mod api;
pub mod config;
pub mod engine;
pub mod entities;
pub mod error;
pub mod external;
pub mod planner;
pub mod presenter;
pub mod server;

#[cfg(test)]
mod test_utils;
