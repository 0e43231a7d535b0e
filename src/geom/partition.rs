//! Splits one logical chain or mesh across bounded vertex-array segments.

use super::vertex_array::{VertexArray, VertexLayout, MAX_SEGMENT_VERTS};

/// Hands out segments with guaranteed free space, opening a new segment for
/// the same chain whenever the current one cannot take the next append.
///
/// Callers announce each chain with [`begin_chain`](Self::begin_chain) and an
/// estimate of its size, then route every append through
/// [`ensure_space_for`](Self::ensure_space_for).
#[derive(Debug)]
pub struct Partitioner {
    layout: VertexLayout,
    cap: usize,
    segments: Vec<VertexArray>,
    remaining_verts: usize,
    remaining_indices: usize,
}

impl Partitioner {
    /// Partitioner producing segments of at most 65536 vertices.
    pub fn new(layout: VertexLayout) -> Self {
        Self::with_cap(layout, MAX_SEGMENT_VERTS)
    }

    /// Partitioner producing segments of at most `cap` vertices. `cap` is
    /// clamped to `3..=65536`.
    pub fn with_cap(layout: VertexLayout, cap: usize) -> Self {
        Self {
            layout,
            cap: cap.clamp(3, MAX_SEGMENT_VERTS),
            segments: Vec::new(),
            remaining_verts: 0,
            remaining_indices: 0,
        }
    }

    /// Per-segment vertex cap.
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Vertex layout of every segment.
    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    /// Open the first segment of a new chain, sized from the estimates.
    pub fn begin_chain(
        &mut self,
        chain: impl Into<String>,
        estimated_verts: usize,
        estimated_indices: usize,
    ) -> &mut VertexArray {
        let chain = chain.into();
        log::trace!(
            "begin chain '{chain}': ~{estimated_verts} vertices, \
             ~{estimated_indices} indices"
        );
        self.remaining_verts = estimated_verts;
        self.remaining_indices = estimated_indices;
        let segment = VertexArray::new(
            chain,
            self.layout,
            estimated_verts.min(self.cap),
            estimated_indices,
        );
        self.segments.push(segment);
        let last = self.segments.len() - 1;
        &mut self.segments[last]
    }

    /// Segment with at least `n` free vertex slots, and its index.
    ///
    /// # Panics
    ///
    /// Panics if no chain has been started or if `n` exceeds the cap.
    pub fn ensure_space_for(&mut self, n: usize) -> (usize, &mut VertexArray) {
        assert!(
            n <= self.cap,
            "cannot reserve {n} vertices in segments capped at {}",
            self.cap
        );
        assert!(
            !self.segments.is_empty(),
            "ensure_space_for called before begin_chain"
        );
        let last = self.segments.len() - 1;
        let current = &self.segments[last];
        if current.free_verts() < n {
            self.remaining_verts =
                self.remaining_verts.saturating_sub(current.num_verts());
            self.remaining_indices =
                self.remaining_indices.saturating_sub(current.num_indices());
            let size = n.max(self.remaining_verts).min(self.cap);
            log::debug!(
                "segment for chain '{}' full at {} vertices, opening {size}",
                current.chain(),
                current.num_verts()
            );
            let segment = VertexArray::new(
                current.chain().to_owned(),
                self.layout,
                size,
                self.remaining_indices,
            );
            self.segments.push(segment);
        }
        let last = self.segments.len() - 1;
        (last, &mut self.segments[last])
    }

    /// All segments, in creation order.
    pub fn segments(&self) -> &[VertexArray] {
        &self.segments
    }

    /// All segments, mutably.
    pub fn segments_mut(&mut self) -> &mut [VertexArray] {
        &mut self.segments
    }

    /// Total vertices across segments.
    pub fn total_verts(&self) -> usize {
        self.segments.iter().map(VertexArray::num_verts).sum()
    }
}
