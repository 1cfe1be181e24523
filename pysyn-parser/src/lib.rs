//! Error-tolerant parser for Python-family source text.
//!
//! All functionality lives under the [`pysyn`] module.

pub mod pysyn;
