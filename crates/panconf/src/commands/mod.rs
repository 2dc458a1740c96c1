//! Subcommand handlers.

pub mod apikey;
pub mod getyaml;
