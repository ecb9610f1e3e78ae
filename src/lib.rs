//! ficserver - minimal HTTP/1.0 static file server
//!
//! Core library for the protocol handler, resource resolution and the listener.

pub mod cli;
pub mod config;
pub mod http;
pub mod resource;
pub mod server;
