//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the orchestration for the sensor node: the
//! fixed-cadence control loop and the startup-selected device roles.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod roles;
pub mod service;
