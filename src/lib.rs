//! phpintel main library
//!
//! Symbol resolution and completion evaluation for PHP code intelligence:
//! resolves CITDL expressions against pre-parsed symbol trees and a library
//! federation to produce completions, calltips, and definition locations.

pub mod citdl;
pub mod cli;
pub mod config;
pub mod errors;
pub mod eval;
pub mod libs;
pub mod model;
