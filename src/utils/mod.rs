//! Configuration loading.

#![allow(missing_docs)]

pub mod toml_config;
