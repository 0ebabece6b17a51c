mod revocation_store_memory;

pub use revocation_store_memory::*;
