//! # main-dex-list
//!
//! Computes the set of classes that must be packaged in the primary dex file
//! of a legacy multidex application: everything reachable from a root set
//! through superclass, interface and constant pool references.
//!
//! ## Architecture
//!
//! - **element**: classpath entries, either a directory or a zip/jar archive
//! - **classpath**: ordered element list resolving class names to decoded units
//! - **pool**: constant pool arena and the big-endian byte reader
//! - **unit**: class file header, hierarchy and interface decoding
//! - **references**: descriptor decoding and direct reference extraction
//! - **closure**: the resolution pass and its front/back queue discipline
//! - **roots**: root set adapters (jar of roots, list files)
//! - **report**: text and JSON rendering of a closure
//! - **cli** / **config**: command line and configuration resolution

pub mod classpath;
pub mod cli;
pub mod closure;
pub mod config;
pub mod element;
pub mod error;
pub mod name;
pub mod pool;
pub mod references;
pub mod report;
pub mod roots;
pub mod unit;

#[cfg(test)]
mod fixture;

pub use classpath::ClassPath;
pub use closure::{Closure, ClosureResolver, resolve_closure};
pub use element::ClassPathElement;
pub use error::{Error, FormatError, Result};
pub use name::UnitName;
pub use unit::BinaryUnit;
