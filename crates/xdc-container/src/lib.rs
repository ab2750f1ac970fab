#![forbid(unsafe_code)]

//! XML DataContainer (XDC) construction and validation.
//!
//! An XDC wraps an eForm together with references to (or copies of) the
//! schema and transformation it was filled in against. Referenced resources
//! are pinned by canonical digests.

pub mod builder;
pub mod validator;

pub use builder::{xdc_file_name, XdcBuilder};
pub use validator::{is_xdc, XdcValidator};
