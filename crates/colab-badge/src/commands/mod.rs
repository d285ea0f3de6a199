//! Command handlers, one module per subcommand.

pub mod completion;
pub mod update;
pub mod version;
