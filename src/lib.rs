pub mod app;
pub mod cli;
pub mod config;
pub mod filter;
pub mod output;
pub mod paginate;
pub mod session;
pub mod store;
pub mod utils;

#[cfg(test)]
mod tests;
