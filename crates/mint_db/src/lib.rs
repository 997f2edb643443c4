pub mod memory;
pub mod repository;
pub mod schema;
pub mod store;

mod error;
mod rows;

pub use memory::MemoryStore;
pub use repository::MintRepository;
pub use store::{DocumentRegistry, LedgerStore};
