//! Shared type aliases.

pub mod collections;

pub use collections::{BTreeMap, FxHashMap, FxHashSet, SmallVec, SmallVec2};
