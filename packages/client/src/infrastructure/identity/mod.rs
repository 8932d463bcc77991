//! `IdentityStore` の具体的な実装
//!
//! - `file`: one-line file under the user's data directory
//! - `inmemory`: process-local store for tests and throwaway visits

pub mod file;
pub mod inmemory;

pub use file::FileIdentityStore;
pub use inmemory::InMemoryIdentityStore;
