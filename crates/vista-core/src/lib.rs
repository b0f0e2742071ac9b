//! Vista Core - Shared library for the router engine and its hosts
//!
//! This crate provides the configuration shared by
//! vista-router and vista-shell.

pub mod config;

pub use config::NavigatorConfig;
