//! FileSystem abstraction so argument checks and manifest searches can run
//! against an in-memory tree in tests.

mod mock;
mod real;
mod r#trait;

pub use mock::MockFileSystem;
pub use r#trait::{FileSystem, FileType};
pub use real::RealFileSystem;
