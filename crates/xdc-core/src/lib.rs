#![forbid(unsafe_code)]

//! Core types shared by every crate of the XDC eForm pipeline.

pub mod algorithm;
pub mod error;
pub mod ns;

pub use error::{Error, ErrorKind, Result};
