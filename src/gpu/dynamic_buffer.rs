//! Growable wgpu buffers backing context buffer handles.
//!
//! Vertex segments are re-uploaded whole whenever they turn dirty, so a
//! buffer is rewritten from offset zero and grows (2x) when the new
//! contents no longer fit. GPU buffers never shrink.

/// Minimum allocation, in bytes.
const MIN_CAPACITY: u64 = 64;

/// Round `len` up to the copy alignment wgpu requires for writes.
fn aligned(len: u64) -> u64 {
    len.next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT)
}

/// Capacity after growing to hold `needed` bytes, or `None` if `capacity`
/// already suffices.
fn grown_capacity(capacity: u64, needed: u64) -> Option<u64> {
    (needed > capacity).then(|| (needed * 2).max(capacity + 1024))
}

/// A GPU buffer that grows on demand.
pub struct DynamicBuffer {
    buffer: wgpu::Buffer,
    capacity: u64,
    usage: wgpu::BufferUsages,
    label: String,
}

impl DynamicBuffer {
    /// Empty buffer with room for `initial_capacity` bytes.
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        initial_capacity: u64,
        usage: wgpu::BufferUsages,
    ) -> Self {
        let capacity = aligned(initial_capacity.max(MIN_CAPACITY));
        Self {
            buffer: Self::allocate(device, label, capacity, usage),
            capacity,
            usage,
            label: label.to_owned(),
        }
    }

    fn allocate(
        device: &wgpu::Device,
        label: &str,
        size: u64,
        usage: wgpu::BufferUsages,
    ) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Replace the contents with `data`, growing if necessary.
    ///
    /// Data whose length is not a multiple of the copy alignment is padded
    /// with zeros. Returns `true` if the buffer was reallocated, in which
    /// case bind groups referencing it must be recreated.
    pub fn write_bytes(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
    ) -> bool {
        let needed = aligned(data.len() as u64);

        let grown = grown_capacity(self.capacity, needed);
        if let Some(new_capacity) = grown {
            log::debug!(
                "growing buffer '{}' from {} to {new_capacity} bytes",
                self.label,
                self.capacity
            );
            self.buffer =
                Self::allocate(device, &self.label, new_capacity, self.usage);
            self.capacity = new_capacity;
        }

        if needed > 0 {
            if needed == data.len() as u64 {
                queue.write_buffer(&self.buffer, 0, data);
            } else {
                let mut padded = data.to_vec();
                padded.resize(needed as usize, 0);
                queue.write_buffer(&self.buffer, 0, &padded);
            }
        }

        grown.is_some()
    }

    /// Underlying wgpu buffer.
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_rounds_up_to_four() {
        assert_eq!(aligned(0), 0);
        assert_eq!(aligned(1), 4);
        assert_eq!(aligned(6), 8);
        assert_eq!(aligned(8), 8);
    }

    #[test]
    fn growth_doubles_past_the_request() {
        assert_eq!(grown_capacity(64, 64), None);
        assert_eq!(grown_capacity(64, 0), None);
        // small overflows grow by at least a kilobyte
        assert_eq!(grown_capacity(64, 68), Some(64 + 1024));
        assert_eq!(grown_capacity(64, 4096), Some(8192));
        let big = grown_capacity(8192, 8196).unwrap();
        assert!(big >= 8196 * 2);
    }
}
