//! Domain layer - Core business logic
//!
//! This module contains the entities describing an extraction run, the
//! collaborator traits, and the pure decision services.

pub mod entities;
pub mod repositories;
pub mod services;
