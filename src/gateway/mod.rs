//! # Gateway Module
//!
//! The HTTP face of the site: server assembly in [`server`] and the resource handlers in
//! [`handlers`].

pub mod handlers;
pub mod server;

pub use server::{build_app, GatewayServer, ServerState};
