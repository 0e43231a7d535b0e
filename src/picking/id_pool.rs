//! Allocation and recycling of 16-bit picking ids.
//!
//! Every pickable vertex carries an object id that the selection shader
//! writes into an offscreen target. The id space is only 16 bits wide, far
//! smaller than the geometry it addresses, so ids are handed out in
//! contiguous ranges (one per geometry container) and recycled aggressively
//! when a container is destroyed.
//!
//! Free ranges are kept in a list and reused best-fit: the smallest free
//! range that can hold the request wins, ties go to the earliest entry.
//! Only when nothing on the free list fits is a fresh range carved from the
//! untouched tail of the id space.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::pick_map::PickTarget;

/// Size of the picking id space.
pub const MAX_IDS: u32 = 1 << 16;

/// A contiguous `[start, end)` span of picking ids owned by one geometry.
///
/// Ids are assigned from the front of the range through
/// [`IdPool::next_id`]. The range is returned to its pool with
/// [`IdPool::release`], which moves this very value onto the free list.
#[derive(Debug, PartialEq, Eq)]
pub struct IdRange {
    start: u32,
    next: u32,
    end: u32,
}

impl IdRange {
    fn new(start: u32, end: u32) -> Self {
        Self {
            start,
            next: start,
            end,
        }
    }

    /// First id of the range.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// One past the last id of the range.
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Declared capacity of the range.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns `true` for a zero-capacity range.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Number of ids assigned so far.
    pub fn assigned(&self) -> u32 {
        self.next - self.start
    }

    /// Number of ids still available for assignment.
    pub fn remaining(&self) -> u32 {
        self.end - self.next
    }

    /// Returns `true` if `id` falls inside the declared span.
    pub fn contains(&self, id: u16) -> bool {
        let id = u32::from(id);
        id >= self.start && id < self.end
    }
}

/// Snapshot of pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// First id never handed out by a fresh carve.
    pub high_water: u32,
    /// Number of released ranges waiting for reuse.
    pub free_ranges: usize,
    /// Number of ids currently mapped to an object.
    pub live_ids: usize,
}

/// Owner of the picking id space and the id-to-object table.
#[derive(Debug, Default)]
pub struct IdPool {
    objects: Vec<Option<PickTarget>>,
    unused_start: u32,
    free: Vec<IdRange>,
}

impl IdPool {
    /// Empty pool with the full id space available.
    pub fn new() -> Self {
        Self::default()
    }

    /// Obtain a range of `n` contiguous ids.
    ///
    /// Prefers the best-fitting released range. Returns `None` (and logs)
    /// when the request cannot be satisfied; the caller then has to do
    /// without picking support for its geometry.
    pub fn acquire(&mut self, n: u32) -> Option<IdRange> {
        let mut best: Option<(usize, u32)> = None;
        for (i, free) in self.free.iter().enumerate() {
            let len = free.len();
            if len >= n && best.is_none_or(|(_, best_len)| len < best_len) {
                best = Some((i, len));
            }
        }
        if let Some((index, len)) = best {
            log::trace!("reusing id range of {len} for request of {n}");
            return Some(self.free.remove(index));
        }

        let start = self.unused_start;
        let Some(end) = start.checked_add(n).filter(|&end| end <= MAX_IDS)
        else {
            log::error!(
                "picking id space exhausted: requested {n}, only {} unused",
                MAX_IDS - start
            );
            return None;
        };
        self.unused_start = end;
        self.objects.resize(end as usize, None);
        Some(IdRange::new(start, end))
    }

    /// Assign the next id of `range` to `target` and return it.
    ///
    /// # Panics
    ///
    /// Panics if the range has no ids left. Callers size their ranges up
    /// front, so running past the end is a logic error.
    pub fn next_id(&mut self, range: &mut IdRange, target: PickTarget) -> u16 {
        assert!(
            range.next < range.end,
            "id range [{}, {}) exhausted",
            range.start,
            range.end
        );
        let id = range.next;
        range.next += 1;
        self.objects[id as usize] = Some(target);
        id as u16
    }

    /// Return `range` to the free list, dropping every object association
    /// it assigned.
    pub fn release(&mut self, mut range: IdRange) {
        let assigned = range.start as usize..range.next as usize;
        for slot in &mut self.objects[assigned] {
            *slot = None;
        }
        range.next = range.start;
        self.free.push(range);
    }

    /// Object currently associated with `id`, if any.
    pub fn lookup(&self, id: u16) -> Option<PickTarget> {
        self.objects.get(usize::from(id)).copied().flatten()
    }

    /// Current occupancy.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            high_water: self.unused_start,
            free_ranges: self.free.len(),
            live_ids: self.objects.iter().filter(|o| o.is_some()).count(),
        }
    }
}

/// Shared, lock-protected handle to an [`IdPool`].
///
/// One pool is owned per visual-representation manager and a clone of the
/// handle is passed to every geometry container it creates. All operations
/// run under a single mutex so a release is fully applied before another
/// acquire or lookup can observe the pool.
#[derive(Debug, Clone, Default)]
pub struct IdPoolHandle {
    inner: Arc<Mutex<IdPool>>,
}

impl IdPoolHandle {
    /// Handle to a fresh, empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the pool for a batch of operations.
    pub fn lock(&self) -> MutexGuard<'_, IdPool> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`IdPool::acquire`].
    pub fn acquire(&self, n: u32) -> Option<IdRange> {
        self.lock().acquire(n)
    }

    /// See [`IdPool::next_id`].
    pub fn next_id(&self, range: &mut IdRange, target: PickTarget) -> u16 {
        self.lock().next_id(range, target)
    }

    /// See [`IdPool::release`].
    pub fn release(&self, range: IdRange) {
        self.lock().release(range);
    }

    /// See [`IdPool::lookup`].
    pub fn lookup(&self, id: u16) -> Option<PickTarget> {
        self.lock().lookup(id)
    }

    /// See [`IdPool::stats`].
    pub fn stats(&self) -> PoolStats {
        self.lock().stats()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn atom(index: u32) -> PickTarget {
        PickTarget::Atom {
            structure: 0,
            atom: index,
        }
    }

    #[test]
    fn ids_are_distinct_and_in_range() {
        let mut pool = IdPool::new();
        let _warmup = pool.acquire(17);
        let mut range = pool.acquire(100).unwrap();
        let mut seen = HashSet::new();
        for i in 0..100 {
            let id = pool.next_id(&mut range, atom(i));
            assert!(range.contains(id));
            assert!(seen.insert(id), "id {id} handed out twice");
        }
        assert_eq!(seen.len(), 100);
        assert_eq!(range.remaining(), 0);
    }

    #[test]
    fn id_zero_is_a_valid_assignment() {
        let mut pool = IdPool::new();
        let mut range = pool.acquire(1).unwrap();
        let id = pool.next_id(&mut range, atom(42));
        assert_eq!(id, 0);
        assert_eq!(pool.lookup(0), Some(atom(42)));
    }

    #[test]
    fn release_clears_lookup() {
        let mut pool = IdPool::new();
        let mut range = pool.acquire(8).unwrap();
        let ids: Vec<u16> =
            (0..5).map(|i| pool.next_id(&mut range, atom(i))).collect();
        pool.release(range);
        for id in ids {
            assert_eq!(pool.lookup(id), None);
        }
        assert_eq!(pool.stats().live_ids, 0);
    }

    #[test]
    fn released_range_is_reused_with_reset_cursor() {
        let mut pool = IdPool::new();
        let mut range = pool.acquire(4).unwrap();
        let _ = pool.next_id(&mut range, atom(0));
        let _ = pool.next_id(&mut range, atom(1));
        pool.release(range);

        let mut again = pool.acquire(3).unwrap();
        assert_eq!(again.start(), 0);
        assert_eq!(again.len(), 4);
        assert_eq!(again.assigned(), 0);
        assert_eq!(pool.next_id(&mut again, atom(9)), 0);
        assert_eq!(pool.stats().high_water, 4);
    }

    #[test]
    fn best_fit_prefers_smallest_sufficient_range() {
        let mut pool = IdPool::new();
        let five = pool.acquire(5).unwrap();
        let ten = pool.acquire(10).unwrap();
        let three = pool.acquire(3).unwrap();
        let five_start = five.start();
        pool.release(five);
        pool.release(ten);
        pool.release(three);

        let chosen = pool.acquire(4).unwrap();
        assert_eq!(chosen.len(), 5);
        assert_eq!(chosen.start(), five_start);
        assert_eq!(pool.stats().free_ranges, 2);
    }

    #[test]
    fn best_fit_ties_go_to_first_entry() {
        let mut pool = IdPool::new();
        let a = pool.acquire(6).unwrap();
        let b = pool.acquire(6).unwrap();
        let b_start = b.start();
        pool.release(b);
        pool.release(a);

        let chosen = pool.acquire(6).unwrap();
        assert_eq!(chosen.start(), b_start);
    }

    #[test]
    fn miss_on_free_list_carves_from_tail() {
        let mut pool = IdPool::new();
        let small = pool.acquire(2).unwrap();
        pool.release(small);
        let big = pool.acquire(10).unwrap();
        assert_eq!(big.start(), 2);
        assert_eq!(big.end(), 12);
        assert_eq!(pool.stats().free_ranges, 1);
    }

    #[test]
    fn exhaustion_returns_none_without_consuming() {
        let mut pool = IdPool::new();
        let all_but_ten = pool.acquire(MAX_IDS - 10).unwrap();
        assert!(pool.acquire(11).is_none());
        let last = pool.acquire(10).unwrap();
        assert_eq!(last.end(), MAX_IDS);
        assert!(pool.acquire(1).is_none());

        pool.release(all_but_ten);
        assert!(pool.acquire(1000).is_some());
    }

    #[test]
    fn oversized_request_after_allocation_returns_none() {
        let mut pool = IdPool::new();
        let first = pool.acquire(1).unwrap();
        assert!(pool.acquire(u32::MAX).is_none());
        assert_eq!(pool.stats().high_water, 1);

        let next = pool.acquire(4).unwrap();
        assert_eq!(next.start(), first.end());
        assert_eq!(next.end(), 5);
    }

    #[test]
    fn full_space_ids_fit_in_u16() {
        let mut pool = IdPool::new();
        let _head = pool.acquire(MAX_IDS - 1).unwrap();
        let mut last = pool.acquire(1).unwrap();
        assert_eq!(pool.next_id(&mut last, atom(1)), u16::MAX);
        assert_eq!(pool.lookup(u16::MAX), Some(atom(1)));
    }

    #[test]
    #[should_panic(expected = "exhausted")]
    fn assigning_past_range_end_panics() {
        let mut pool = IdPool::new();
        let mut range = pool.acquire(1).unwrap();
        let _ = pool.next_id(&mut range, atom(0));
        let _ = pool.next_id(&mut range, atom(1));
    }

    #[test]
    fn unassigned_ids_resolve_to_none() {
        let mut pool = IdPool::new();
        let mut range = pool.acquire(4).unwrap();
        let _ = pool.next_id(&mut range, atom(0));
        assert_eq!(pool.lookup(1), None);
        assert_eq!(pool.lookup(500), None);
    }

    #[test]
    fn handle_serializes_across_threads() {
        let handle = IdPoolHandle::new();
        let workers: Vec<_> = (0..4u32)
            .map(|t| {
                let handle = handle.clone();
                std::thread::spawn(move || {
                    for round in 0..50 {
                        let mut range = handle.acquire(8).unwrap();
                        for i in 0..8 {
                            let target = atom(t * 1000 + round * 8 + i);
                            let id = handle.next_id(&mut range, target);
                            assert_eq!(handle.lookup(id), Some(target));
                        }
                        handle.release(range);
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        let stats = handle.stats();
        assert_eq!(stats.live_ids, 0);
        assert!(stats.high_water <= 32);
    }
}
