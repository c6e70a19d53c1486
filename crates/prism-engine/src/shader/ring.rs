use std::num::NonZeroU64;

/// Draw slots a ring starts with; doubled whenever a frame runs out.
pub(crate) const INITIAL_SLOTS: u64 = 256;

/// Rounds `value` up to a multiple of `alignment` (a power of two).
pub(crate) fn align_to(value: u64, alignment: u64) -> u64 {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}

/// Slot bookkeeping for a per-frame ring. Rewinds when the frame changes.
#[derive(Debug, Clone)]
pub(crate) struct SlotCursor {
    capacity: u64,
    next: u64,
    frame: Option<u64>,
}

impl SlotCursor {
    pub(crate) fn new(capacity: u64) -> Self {
        Self { capacity, next: 0, frame: None }
    }

    /// Claims the next slot for `frame`, or `None` when the ring is full.
    pub(crate) fn claim(&mut self, frame: u64) -> Option<u64> {
        if self.frame != Some(frame) {
            self.frame = Some(frame);
            self.next = 0;
        }
        if self.next == self.capacity {
            return None;
        }
        let slot = self.next;
        self.next += 1;
        Some(slot)
    }
}

/// Dynamic-offset uniform buffer holding one block snapshot per draw.
///
/// Every draw gets its own slot, so uniform changes between draws in one pass
/// do not clobber each other.
pub(crate) struct UniformRing {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    block_size: u64,
    stride: u64,
    cursor: SlotCursor,
}

impl UniformRing {
    pub(crate) fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        block_size: u64,
        slots: u64,
    ) -> Self {
        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let stride = align_to(block_size, alignment);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: stride * slots,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: NonZeroU64::new(block_size),
                }),
            }],
        });

        Self {
            buffer,
            bind_group,
            block_size,
            stride,
            cursor: SlotCursor::new(slots),
        }
    }

    /// Uploads `bytes` into a fresh slot and returns the slot's bind group and offset.
    ///
    /// A full ring is replaced by one twice its size. Passes already recorded
    /// keep the old buffer alive.
    pub(crate) fn push(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        frame: u64,
        bytes: &[u8],
    ) -> (&wgpu::BindGroup, u32) {
        let slot = match self.cursor.claim(frame) {
            Some(slot) => slot,
            None => {
                let slots = self.cursor.capacity * 2;
                log::debug!("uniform ring full; growing to {slots} slots");
                *self = Self::new(device, layout, "prism uniform ring", self.block_size, slots);
                self.cursor.claim(frame).unwrap_or(0)
            }
        };

        let offset = slot * self.stride;
        queue.write_buffer(&self.buffer, offset, bytes);
        (&self.bind_group, offset as u32)
    }
}
