//! Dynamic GPU buffer management with automatic resizing
//!
//! Provides buffers that grow automatically when data exceeds capacity,
//! using a 2x growth strategy to minimize reallocations.

/// A GPU buffer that can grow dynamically
///
/// Uses a 2x growth strategy when capacity is exceeded.
/// Never shrinks (GPU buffers cannot be resized in place).
pub struct DynamicBuffer {
    buffer: wgpu::Buffer,
    capacity: u64,
    len: u64,
    usage: wgpu::BufferUsages,
    label: String,
}

impl DynamicBuffer {
    /// Buffer with the given initial byte capacity.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        initial_capacity: u64,
        usage: wgpu::BufferUsages,
    ) -> Self {
        let capacity = initial_capacity.max(256);
        Self {
            buffer: allocate(device, label, capacity, usage),
            capacity,
            len: 0,
            usage,
            label: label.to_owned(),
        }
    }

    /// Write raw bytes to the start of the buffer, growing if necessary.
    ///
    /// Returns `true` if the buffer was reallocated (bind groups need
    /// recreation).
    pub fn write_bytes(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
    ) -> bool {
        let needed = data.len() as u64;
        let reallocated = needed > self.capacity;
        if reallocated {
            self.capacity = grown_capacity(self.capacity, needed);
            self.buffer =
                allocate(device, &self.label, self.capacity, self.usage);
            log::debug!("{} grew to {} bytes", self.label, self.capacity);
        }
        if needed > 0 {
            queue.write_buffer(&self.buffer, 0, data);
        }
        self.len = needed;
        reallocated
    }

    /// Typed variant of [`write_bytes`](Self::write_bytes).
    pub fn write<T: bytemuck::Pod>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[T],
    ) -> bool {
        self.write_bytes(device, queue, bytemuck::cast_slice(data))
    }

    /// The underlying buffer.
    #[must_use]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Bytes written by the last write.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the last write was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocated size in bytes.
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.capacity
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

/// 2x growth, at least 1 KiB more than before, kept 4-byte aligned for
/// `write_buffer`.
fn grown_capacity(current: u64, needed: u64) -> u64 {
    let grown = (needed * 2).max(current + 1024);
    grown.next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT)
}

/// Round `size` up to the device's dynamic uniform offset alignment.
#[must_use]
pub fn aligned_stride(size: u64, alignment: u32) -> u64 {
    size.next_multiple_of(u64::from(alignment.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_doubles_and_stays_aligned() {
        assert_eq!(grown_capacity(256, 300), 1280);
        assert_eq!(grown_capacity(256, 4001), 8004);
        assert_eq!(grown_capacity(256, 4001) % wgpu::COPY_BUFFER_ALIGNMENT, 0);
    }

    #[test]
    fn stride_rounds_to_offset_alignment() {
        assert_eq!(aligned_stride(144, 256), 256);
        assert_eq!(aligned_stride(256, 256), 256);
        assert_eq!(aligned_stride(300, 256), 512);
        assert_eq!(aligned_stride(144, 0), 144);
    }
}
