//! Re-exports of performance-oriented collection types.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;
pub use std::collections::BTreeMap;

/// SmallVec for per-bodypart coordinate pairs (x, y).
pub type SmallVec2<T> = SmallVec<[T; 2]>;
