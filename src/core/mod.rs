pub mod answer;
pub mod app;
pub mod config;
pub mod fetch_service;
pub mod keyring;
pub mod message;
pub mod persona;
pub mod session;
