//! Carosello - turn short phrases into square Instagram carousel slides.
//!
//! The deck model lives in [`deck`], rasterization in [`render`], export and sharing in
//! [`export`], and phrase generation through Gemini in [`gateway`] and [`server`].

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod color;
pub mod config;
pub mod context;
pub mod deck;
pub mod error;
pub mod export;
pub mod gateway;
pub mod model;
pub mod ports;
pub mod render;
pub mod server;
