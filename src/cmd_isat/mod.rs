//! Subcommand modules for the `isat` binary.

pub mod bed;
pub mod reference;
pub mod sam;
