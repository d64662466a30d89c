//! Integration test crate for Moviola.
//!
//! This crate exists solely to hold cross-crate integration tests: the
//! player driven end to end through the software video backend and the
//! in-memory audio engine.

#[cfg(test)]
mod support;

#[cfg(test)]
mod player;

#[cfg(test)]
mod audio;

#[cfg(test)]
mod gpu;
