/// Frames-in-flight synchronization ring
///
/// A fixed ring of `SyncSlot`s, one per frame in flight. Slot `frame % N` is
/// reused every N frames; before reuse the CPU blocks on the slot's fence
/// until the GPU (or the presentation engine) has signaled it, then resets it.
///
/// Fences are created signaled so the first pass through the ring never
/// blocks.

use std::sync::Arc;

use crate::config::TIMEOUT_INFINITE;
use crate::error::Result;
use crate::platform::{FenceHandle, PresentDevice, SemaphoreHandle};
use crate::{winsys_bail, winsys_trace, winsys_warn};

// ============================================================================
// SyncSlot
// ============================================================================

/// Semaphores and fence of one frame in flight
pub struct SyncSlot {
    device: Arc<dyn PresentDevice>,
    /// Signaled when the acquired image is ready to be rendered to
    image_available: SemaphoreHandle,
    /// Signaled when rendering into the image is done; present waits on it
    render_finished: SemaphoreHandle,
    /// Signaled when the acquire (and work submitted against it) completed
    frame_fence: FenceHandle,
    /// The fence was reset and nothing will signal it
    stale_fence: bool,
}

impl SyncSlot {
    /// Create the slot's primitives. Anything already created is released
    /// if a later creation fails.
    pub fn new(device: &Arc<dyn PresentDevice>) -> Result<Self> {
        let mut slot = Self {
            device: Arc::clone(device),
            image_available: SemaphoreHandle::NULL,
            render_finished: SemaphoreHandle::NULL,
            frame_fence: FenceHandle::NULL,
            stale_fence: false,
        };

        slot.image_available = device.create_semaphore()?;
        slot.render_finished = device.create_semaphore()?;
        slot.frame_fence = device.create_fence(true)?;

        Ok(slot)
    }

    pub fn image_available(&self) -> SemaphoreHandle {
        self.image_available
    }

    pub fn render_finished(&self) -> SemaphoreHandle {
        self.render_finished
    }

    pub fn frame_fence(&self) -> FenceHandle {
        self.frame_fence
    }

    /// Whether the fence still awaits a successful `replace_fence()`
    pub fn is_fence_stale(&self) -> bool {
        self.stale_fence
    }

    /// Block until the slot's fence is signaled
    ///
    /// A stale fence has nothing in flight and returns immediately.
    pub fn wait(&self) -> Result<()> {
        if self.stale_fence || self.frame_fence.is_null() {
            return Ok(());
        }
        self.device.wait_for_fence(self.frame_fence, TIMEOUT_INFINITE)
    }

    /// Block until the slot is free, then reset its fence for the next use
    pub fn wait_and_reset(&mut self) -> Result<()> {
        if self.stale_fence {
            self.replace_fence()?;
        }
        self.wait()?;
        self.device.reset_fence(self.frame_fence)
    }

    /// Replace the fence with a fresh signaled one
    ///
    /// Used when the fence was reset but the operation that should have
    /// signaled it failed; waiting on it would never return. If creating
    /// the replacement fails the slot stays stale and the next
    /// `wait_and_reset()` tries again.
    pub fn replace_fence(&mut self) -> Result<()> {
        self.stale_fence = true;
        let fence = self.device.create_fence(true)?;
        let old = std::mem::replace(&mut self.frame_fence, fence);
        self.device.destroy_fence(old);
        self.stale_fence = false;
        Ok(())
    }

    /// Replace `image_available` with a fresh unsignaled semaphore
    ///
    /// Needed when an acquired image is dropped without being presented:
    /// the acquire left the semaphore signaled and nothing will wait on it.
    /// The slot fence is waited on first so the acquire's signal operation
    /// has completed before the old semaphore is destroyed.
    pub fn replace_image_available(&mut self) -> Result<()> {
        self.wait()?;
        let semaphore = self.device.create_semaphore()?;
        let old = std::mem::replace(&mut self.image_available, semaphore);
        self.device.destroy_semaphore(old);
        Ok(())
    }
}

impl Drop for SyncSlot {
    fn drop(&mut self) {
        // destroy_* ignore NULL handles (partially created slot)
        self.device.destroy_semaphore(self.image_available);
        self.device.destroy_semaphore(self.render_finished);
        self.device.destroy_fence(self.frame_fence);
    }
}

// ============================================================================
// SyncRing
// ============================================================================

/// Ring of `SyncSlot`s indexed by a monotonically increasing frame counter
pub struct SyncRing {
    slots: Vec<SyncSlot>,
    frame_counter: u64,
    legacy_frame_offset: bool,
}

impl SyncRing {
    /// Create `capacity` slots
    ///
    /// With `legacy_frame_offset` the counter is advanced before the slot is
    /// picked, so frame 1 maps to slot 1.
    pub fn new(
        device: &Arc<dyn PresentDevice>,
        capacity: usize,
        legacy_frame_offset: bool,
    ) -> Result<Self> {
        if capacity == 0 {
            winsys_bail!(@InvalidArgument "winsys::SyncRing", "Sync ring capacity must be positive");
        }

        // Slots created so far are dropped (and released) on early return
        let mut slots = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            slots.push(SyncSlot::new(device)?);
        }

        winsys_trace!("winsys::SyncRing", "Created {} sync slots", capacity);

        Ok(Self {
            slots,
            frame_counter: 0,
            legacy_frame_offset,
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of frames begun so far
    pub fn frame_counter(&self) -> u64 {
        self.frame_counter
    }

    /// Slot used by frame number `frame`
    pub fn slot_for_frame(&self, frame: u64) -> usize {
        (frame % self.slots.len() as u64) as usize
    }

    pub fn slot(&self, index: usize) -> &SyncSlot {
        &self.slots[index]
    }

    /// Slot the next `begin_frame()` will use
    pub fn next_slot(&self) -> usize {
        if self.legacy_frame_offset {
            self.slot_for_frame(self.frame_counter + 1)
        } else {
            self.slot_for_frame(self.frame_counter)
        }
    }

    /// Claim the next slot: wait for its previous use to complete, reset its
    /// fence and advance the frame counter. Returns the slot index.
    ///
    /// The counter only advances once the slot is ready, so a failed wait
    /// leaves the ring where it was.
    pub fn begin_frame(&mut self) -> Result<usize> {
        let slot_index = self.next_slot();
        winsys_trace!("winsys::SyncRing", "Frame {}: waiting on slot {}", self.frame_counter, slot_index);

        self.slots[slot_index].wait_and_reset()?;
        self.frame_counter += 1;

        Ok(slot_index)
    }

    /// Give `slot` a fresh signaled fence (see `SyncSlot::replace_fence`)
    pub fn recycle_fence(&mut self, slot: usize) -> Result<()> {
        self.slots[slot].replace_fence()
    }

    /// Give `slot` a fresh `image_available` semaphore
    /// (see `SyncSlot::replace_image_available`)
    pub fn recycle_semaphore(&mut self, slot: usize) -> Result<()> {
        self.slots[slot].replace_image_available()
    }

    /// Block until every slot's fence is signaled
    ///
    /// Every slot is waited on even after a failure; the first error is
    /// returned.
    pub fn wait_idle(&self) -> Result<()> {
        let mut result = Ok(());
        for slot in &self.slots {
            if let Err(e) = slot.wait() {
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }
        result
    }
}

impl Drop for SyncRing {
    fn drop(&mut self) {
        // No primitive is released while a slot may still be in use
        if let Err(e) = self.wait_idle() {
            winsys_warn!("winsys::SyncRing", "Fence wait failed during teardown: {}", e);
        }
    }
}

#[cfg(test)]
#[path = "sync_ring_tests.rs"]
mod tests;
