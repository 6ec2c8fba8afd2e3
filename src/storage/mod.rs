//! Client-side durable storage.

pub mod token_store;

pub use token_store::{FileTokenStore, MemoryTokenStore, StoredTokens, TokenPair, TokenStore, ACCESS_KEY, REFRESH_KEY};
