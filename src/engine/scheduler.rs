//! Batch scheduler.
//!
//! # Responsibilities
//! - Size waves of origin groups from the total group count
//! - Split the group list into waves dispatched one after another
//!
//! # Design Decisions
//! - Waves bound peak task count and memory for very large inputs
//! - Network concurrency stays with the admission gate; a wave only
//!   decides how many groups are in play at once
//!
//! # Wave sizes
//! ```text
//! groups ≤ 100    → all at once
//! groups ≤ 1000   → 100
//! otherwise       → min(500, max(50, groups / 20))
//! ```

/// Groups dispatched together for a run with `group_count` groups.
pub fn wave_size(group_count: usize) -> usize {
    match group_count {
        0..=100 => group_count,
        101..=1000 => 100,
        _ => (group_count / 20).clamp(50, 500),
    }
}

/// Split `items` into consecutive waves of at most `size` items.
pub fn into_waves<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut waves = Vec::with_capacity(items.len().div_ceil(size));
    let mut rest = items;
    while !rest.is_empty() {
        let tail = rest.split_off(size.min(rest.len()));
        waves.push(rest);
        rest = tail;
    }
    waves
}
