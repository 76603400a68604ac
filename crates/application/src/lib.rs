//! Application services and ports.

#![forbid(unsafe_code)]

mod access_ports;
mod access_resolution_service;

pub use access_ports::{AccessRepository, AccessSnapshot};
pub use access_resolution_service::AccessResolutionService;
