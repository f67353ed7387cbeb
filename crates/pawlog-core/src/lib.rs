//! pawlog-core - Core library for pawlog
//!
//! Models for pets and their health logs, the backend gateway (Supabase
//! PostgREST or in-memory), the record access layer, and the per-screen
//! state used by every pawlog shell.

pub mod auth;
pub mod config;
pub mod controllers;
pub mod error;
pub mod gateway;
pub mod models;
pub mod records;
pub mod util;
pub mod workflows;

pub use error::{Error, ErrorKind, Result};
pub use models::{Pet, PetId};
pub use records::PetRecords;
