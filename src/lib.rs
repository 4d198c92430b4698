//! Migrates Next.js pages-router data fetching (`getStaticProps`,
//! `getServerSideProps`, `getStaticPaths`) to app-router data loaders.

mod error;
mod factories;
mod matchers;
mod names;
mod options;
mod reorder;
mod repomod;
mod returns;
pub mod runner;
mod scheduler;
mod session;
mod tasks;
mod transform;

pub use error::{Error, Result};
pub use options::{TransformOptions, BUILD_LEGACY_CTX_UTIL_ABSOLUTE_PATH};
pub use repomod::{
    DataCommand, FileCommand, Repomod, RepomodState, RepomodStep, BUILD_LEGACY_CTX_UTIL_CONTENT,
    EXCLUDE_PATTERNS, INCLUDE_PATTERNS,
};
pub use transform::{transform, transform_file};
