//! resledger-config — agent resource declarations.
//!
//! Parses a TOML (or JSON) file listing the resources an agent offers and
//! folds it into a [`resledger_core::Resources`] ledger. Unlike the ledger
//! itself, loading is strict: the first invalid declaration is an error.

pub mod config;
pub mod error;

pub use config::{AgentSection, DiskDecl, LedgerConfig, ModeDecl, ResourceDecl, load_resources};
pub use error::{ConfigError, ConfigResult};
