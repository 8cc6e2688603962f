//! Persistence sink for enrolled users
//!
//! Stores never see plain passwords after `StoredUser::from_user`; only a
//! salted SHA-256 digest is kept.

mod jsonl;
mod memory;
mod record;

pub use jsonl::JsonlStore;
pub use memory::MemoryStore;
pub use record::*;
