//! The seam between the partitioner and a concrete game's content rules.
//!
//! The tree builder never interprets content values; it only combines them
//! through a [`GameAdapter`] and reports them into the adapter's own stats.

use std::any::Any;

/// Opaque content bit-mask. The meaning of individual bits belongs entirely
/// to the game adapter; the partitioner just carries the value around.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ContentFlags(pub u64);

/// Per-build content statistics, allocated by the game adapter.
///
/// Leaves are counted from parallel tasks, so implementations must use
/// interior mutability (atomics) for their counters.
pub trait ContentStats: Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

/// Game-specific content rules, provided by the caller. Immutable after
/// configuration and freely shared across worker threads.
pub trait GameAdapter: Send + Sync {
    /// Contents of a cell no brush reached.
    fn create_empty_contents(&self) -> ContentFlags;

    /// Union of two content values, whatever that means for the game.
    fn combine_contents(&self, a: ContentFlags, b: ContentFlags) -> ContentFlags;

    /// Whether the contents mark the brush as detail (excluded from the
    /// visibility-structural splitter passes).
    fn is_any_detail(&self, contents: ContentFlags) -> bool;

    fn create_content_stats(&self) -> Box<dyn ContentStats>;

    /// Record one leaf's contents. Called concurrently.
    fn count_contents_in_stats(&self, contents: ContentFlags, stats: &dyn ContentStats);

    fn print_content_stats(&self, stats: &dyn ContentStats, label: &str);
}
