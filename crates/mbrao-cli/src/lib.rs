//! mbrao command line front-end
//!
//! The binary is a thin wrapper: [`cli`] defines the arguments,
//! [`commands`] runs them against a [`mbrao_core::Parser`] built from the
//! loaded configuration.

pub mod cli;
pub mod commands;
