//! File cache for computed coordinates.

mod key;
mod lock;
mod store;

pub use key::{build_key, expected_size, format_fixed, CacheKey, MAX_FILE_NAME_LEN};
pub use lock::{LockMode, ScopedLock};
pub use store::{preflight, CacheReader, LatLonCache};
