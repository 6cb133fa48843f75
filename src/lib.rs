// src/lib.rs

//! geoprobe: website accessibility checks from a set of countries.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod probe;
pub mod utils;
