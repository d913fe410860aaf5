// src/lib.rs

//! Housing Crawler Library

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod storage;
pub mod utils;
