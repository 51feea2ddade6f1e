#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Persistence adapter that writes battles to disk and reads them back.

mod codec;
mod store;

pub use codec::{decode, encode, CodecError, FORMAT_VERSION, MAGIC};
pub use store::{BattleStore, PersistenceError};
