//! # Quill Core
//!
//! The domain layer of the Quill blog platform.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, ports, and the services that drive them.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod slug;

pub use error::DomainError;
