//! Infrastructure layer (adapters/implementations).
//!
//! This module contains IO-heavy integrations (config files, complaint
//! sources, SQLite).

pub mod app_config;
pub mod db;
pub mod source;
