#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod config;
pub mod models;
pub mod provider;
pub mod resolver;
pub mod suggestion;

pub use config::RunfilesConfig;
pub use models::RunfileEntry;
pub use provider::{
  DirectoryProvider, ManifestFileProvider, ManifestProvider, ProviderError, Runfiles,
};
pub use resolver::{ResolveError, Resolver, resolve};
pub use suggestion::{SUGGESTION_THRESHOLD, find_closest, find_closest_in, shared_suffix};
