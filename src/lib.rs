//! audio-to-alac - mirror an audio library into ALAC
//!
//! This library crate exposes the scanner, the mirror dispatcher and the
//! configuration layer for the binary and for integration testing.

pub mod config;
pub mod mirror;
pub mod scanner;
