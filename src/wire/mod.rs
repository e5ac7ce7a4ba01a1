//! Service JSON shapes. Nothing here is part of the public model; the
//! `mapper` module converts these into `crate::models` types.

pub mod documents;
pub mod jobs;

pub use documents::*;
pub use jobs::*;
