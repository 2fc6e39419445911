//! SensorNode firmware library.
//!
//! Exposes the pure-logic modules (sampling, peer broadcast, control loop,
//! roles) together with the host adapters for integration testing and the
//! simulation binary.  Board-specific adapters plug in behind the port
//! traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod notifications;
pub mod pins;
pub mod sensors;
