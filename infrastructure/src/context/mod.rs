//! Project context adapter: implements `ProjectContextProducer` by reading
//! known files off the local file system.

mod loader;

pub use loader::LocalContextLoader;
