pub mod handlers;
pub mod interests;
pub mod models;
pub mod registry;
pub mod service;
pub mod session;
pub mod walker;
