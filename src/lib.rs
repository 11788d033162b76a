//! Reader, writer, and patcher for SuperGiant Games' package format, used by
//! Pyre, Transistor, and Hades.
//!
//! A package is a chunked, optionally-compressed container: [`chunk`]
//! handles the per-chunk compression codecs, [`container`] layers a flat,
//! seekable virtual address space on top of them, and [`entry`] decodes the
//! typed records (textures, atlases, Bink clips, ...) that make up a
//! package's content. [`package`] pairs a package with its optional
//! manifest sidecar, [`patch`] rewrites a package in place from one or more
//! patch packages, and [`facade`] exposes all of this as a small set of
//! path-in, path-out operations.
//!
//! ```no_run
//! # fn main() -> Result<(), sgpack::errors::PackageError> {
//! use std::path::Path;
//!
//! let names = sgpack::list(Path::new("Transistor.pkg"), None, &|msg| println!("{}", msg))?;
//! # Ok(())
//! # }
//! ```

pub mod bytes;
pub mod chunk;
pub mod container;
pub mod entry;
pub mod errors;
pub mod facade;
pub mod package;
pub mod patch;

pub use chunk::CompressionType;
pub use errors::{PackageError, Result};
pub use facade::{extract, list, pack, patch as patch_package};
