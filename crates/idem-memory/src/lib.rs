// idem-memory — in-memory user store for idem.
//
// HashMap-based, thread-safe via `tokio::sync::RwLock`. Ideal for tests,
// prototyping, and development; data is lost when the store is dropped.

pub mod store;

pub use store::MemoryUserStore;
