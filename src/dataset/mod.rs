//! Dataset module - loading, column profiling and the features/labels split

pub mod loader;
pub mod profile;
pub mod split;

pub use loader::*;
pub use profile::*;
pub use split::*;
