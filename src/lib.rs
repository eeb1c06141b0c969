pub mod api;
pub mod config;
pub mod error;
pub mod feed;
pub mod gate;
pub mod state;
pub mod store;
pub mod tracker;
