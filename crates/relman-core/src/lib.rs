pub mod branch;
pub mod buildsys;
pub mod config;
pub mod error;
pub mod git;
pub mod io;
pub mod process;
pub mod prompt;
pub mod rpmbuild;
pub mod session;
pub mod specfile;
pub mod syncer;
pub mod versions;

pub use error::{RelmanError, Result};
