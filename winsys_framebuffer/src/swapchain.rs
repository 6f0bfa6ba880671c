/// Swapchain manager: creation, recreation, acquire/present and teardown
///
/// Owns the surface binding, the sync ring and the current swapchain of one
/// window. The first `resize()` materializes everything; later resizes chain
/// a new swapchain on the current one and replace the image set.
///
/// A resize only touches the current image set once its replacement has
/// been built; until then a failure leaves the previous swapchain, images
/// and acquired image in place.
///
/// Teardown order (both `destroy()` and `Drop`):
/// flush pending work, release images, wait every slot fence, destroy
/// semaphores and fences, destroy the swapchain, destroy the surface.

use std::sync::Arc;

use crate::config::{Config, MAX_BUFFERS, TIMEOUT_INFINITE};
use crate::error::Result;
use crate::format::PixelFormat;
use crate::platform::{
    ColorSpace, CompositeAlpha, Extent2D, PresentDevice, RenderContext, ResourceFactory,
    SemaphoreHandle, SwapchainDesc, SwapchainHandle, WindowTarget, SWAPCHAIN_IMAGE_USAGE,
};
use crate::resource::{PresentImage, ResourceTemplate};
use crate::surface::SurfaceBinding;
use crate::sync_ring::SyncRing;
use crate::{winsys_bail, winsys_debug, winsys_info, winsys_trace, winsys_warn};

const SOURCE: &str = "winsys::Swapchain";

// ============================================================================
// OwnedSwapchain
// ============================================================================

/// Swapchain handle destroyed on drop
struct OwnedSwapchain {
    device: Arc<dyn PresentDevice>,
    handle: SwapchainHandle,
}

impl Drop for OwnedSwapchain {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            self.device.destroy_swapchain(self.handle);
            winsys_trace!(SOURCE, "Swapchain {:#x} destroyed", self.handle.as_raw());
        }
    }
}

// ============================================================================
// Frame bookkeeping
// ============================================================================

/// The image currently handed to the frontend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquiredImage {
    /// Swapchain image index
    pub index: u32,
    /// Sync ring slot used for the acquisition
    pub slot: usize,
}

/// Synchronization primitives of the current frame
///
/// The frontend waits on `image_available` before writing the image and
/// signals `render_finished` when done; present waits on the latter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSync {
    pub image_index: u32,
    pub slot: usize,
    pub image_available: SemaphoreHandle,
    pub render_finished: SemaphoreHandle,
}

// ============================================================================
// SwapchainManager
// ============================================================================

pub struct SwapchainManager {
    device: Arc<dyn PresentDevice>,
    factory: Arc<dyn ResourceFactory>,
    window: WindowTarget,
    config: Config,

    // Declaration order is the teardown order used by Drop
    images: Vec<Arc<PresentImage>>,
    ring: Option<SyncRing>,
    swapchain: Option<OwnedSwapchain>,
    surface: Option<SurfaceBinding>,

    format: Option<PixelFormat>,
    extent: Extent2D,
    generation: u64,
    acquired: Option<AcquiredImage>,
}

impl SwapchainManager {
    /// Create an empty manager. No platform call is made until the first resize.
    pub fn new(
        device: Arc<dyn PresentDevice>,
        factory: Arc<dyn ResourceFactory>,
        window: WindowTarget,
        config: Config,
    ) -> Self {
        Self {
            device,
            factory,
            window,
            config,
            images: Vec::new(),
            ring: None,
            swapchain: None,
            surface: None,
            format: None,
            extent: Extent2D::default(),
            generation: 0,
            acquired: None,
        }
    }

    // ===== ACCESSORS =====

    pub fn has_swapchain(&self) -> bool {
        self.swapchain.is_some()
    }

    pub fn swapchain_handle(&self) -> SwapchainHandle {
        self.swapchain.as_ref().map_or(SwapchainHandle::NULL, |s| s.handle)
    }

    pub fn extent(&self) -> Extent2D {
        self.extent
    }

    /// Format fixed by the first resize
    pub fn format(&self) -> Option<PixelFormat> {
        self.format
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Number of swapchains created so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn acquired(&self) -> Option<AcquiredImage> {
        self.acquired
    }

    pub fn frame_counter(&self) -> u64 {
        self.ring.as_ref().map_or(0, |r| r.frame_counter())
    }

    pub fn surface(&self) -> Option<&SurfaceBinding> {
        self.surface.as_ref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ===== RESIZE =====

    /// Create or recreate the swapchain at `width` x `height`
    ///
    /// Outstanding rendering is drained through `ctx` before the current
    /// images are replaced. On return an image has been acquired. On error
    /// the current swapchain and images are kept.
    pub fn resize(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
        ctx: &mut dyn RenderContext,
    ) -> Result<()> {
        if width == 0 || height == 0 {
            winsys_bail!(@InvalidArgument SOURCE, "Invalid swapchain extent {}x{}", width, height);
        }
        let native_format = match self.device.native_format(format) {
            Some(native) => native,
            None => winsys_bail!(@InvalidArgument SOURCE, "Format {:?} cannot be presented", format),
        };
        if let Some(current) = self.format {
            if current != format {
                winsys_bail!(@InvalidArgument SOURCE,
                    "Format change on resize ({:?} -> {:?}) is not supported", current, format);
            }
        }

        if self.swapchain.is_some() {
            drain(ctx)?;
        }

        if self.surface.is_none() {
            self.surface = Some(SurfaceBinding::new(Arc::clone(&self.device), &self.window)?);
        }
        if self.ring.is_none() {
            self.ring = Some(SyncRing::new(&self.device, MAX_BUFFERS, self.config.legacy_frame_offset)?);
        }

        let surface = match self.surface.as_ref() {
            Some(surface) => surface,
            None => winsys_bail!(@InvalidState SOURCE, "Surface missing after creation"),
        };

        let caps = surface.capabilities()?;
        let families = self.device.queue_families();
        if !surface.supports_present(families.present)? {
            winsys_bail!(@Unsupported SOURCE,
                "Queue family {} cannot present to the surface", families.present);
        }

        let extent = Extent2D::new(width, height);
        if caps.current_extent != extent {
            winsys_debug!(SOURCE, "Requested extent {}x{} differs from surface extent {}x{}",
                width, height, caps.current_extent.width, caps.current_extent.height);
        }

        let mut min_image_count = self.config.min_image_count.max(caps.min_image_count);
        if caps.max_image_count > 0 {
            min_image_count = min_image_count.min(caps.max_image_count);
        }
        min_image_count = min_image_count.min(MAX_BUFFERS as u32);

        let desc = SwapchainDesc {
            surface: surface.handle(),
            min_image_count,
            format: native_format,
            color_space: ColorSpace::SrgbNonLinear,
            extent,
            array_layers: 1,
            usage: SWAPCHAIN_IMAGE_USAGE,
            queue_family_indices: families.sharing_indices(),
            pre_transform: caps.current_transform,
            composite_alpha: CompositeAlpha::Opaque,
            present_mode: self.config.present_mode,
            clipped: true,
            old_swapchain: self.swapchain_handle(),
        };

        let new_swapchain = OwnedSwapchain {
            device: Arc::clone(&self.device),
            handle: self.device.create_swapchain(&desc)?,
        };

        let handles = self.device.swapchain_images(new_swapchain.handle)?;
        if handles.is_empty() || handles.len() > MAX_BUFFERS {
            winsys_bail!(SOURCE, "Swapchain reported {} images (expected 1..={})",
                handles.len(), MAX_BUFFERS);
        }

        let generation = self.generation + 1;
        let template = ResourceTemplate::swapchain_image(format, width, height);
        let mut images = Vec::with_capacity(handles.len());
        for (index, handle) in handles.into_iter().enumerate() {
            if handle.is_null() {
                winsys_bail!(SOURCE, "Swapchain image {} is null", index);
            }
            let resource = self.factory.resource_from_handle(&template, handle)?;
            images.push(Arc::new(PresentImage::new(resource, index as u32, generation)));
        }

        // An acquired image dropped unpresented leaves its semaphore signaled
        if let (Some(acquired), Some(ring)) = (self.acquired, self.ring.as_mut()) {
            ring.recycle_semaphore(acquired.slot)?;
            winsys_debug!(SOURCE, "Image {} dropped unpresented, slot {} semaphore recycled",
                acquired.index, acquired.slot);
        }

        // The previous swapchain is destroyed only now that its successor exists
        self.release_images();
        self.swapchain = Some(new_swapchain);
        self.images = images;
        self.format = Some(format);
        self.extent = extent;
        self.generation = generation;

        winsys_info!(SOURCE, "Swapchain generation {} created: {}x{}, {} images, {:?}",
            generation, width, height, self.images.len(), format);

        self.acquire_next_image()?;
        Ok(())
    }

    // ===== ACQUIRE / PRESENT =====

    /// Acquire the next presentable image into the next ring slot
    ///
    /// Blocks until the slot's previous use has completed.
    pub fn acquire_next_image(&mut self) -> Result<u32> {
        let swapchain = self.swapchain_handle();
        let ring = match self.ring.as_mut() {
            Some(ring) if !swapchain.is_null() => ring,
            _ => winsys_bail!(@InvalidState SOURCE, "Cannot acquire an image without a swapchain"),
        };

        let slot = ring.begin_frame()?;
        let image_available = ring.slot(slot).image_available();
        let frame_fence = ring.slot(slot).frame_fence();

        let outcome = match self.device.acquire_next_image(
            swapchain,
            TIMEOUT_INFINITE,
            image_available,
            frame_fence,
        ) {
            Ok(outcome) => outcome,
            Err(e) => {
                // The fence was reset but nothing will signal it
                if let Err(recycle) = ring.recycle_fence(slot) {
                    winsys_warn!(SOURCE, "Replacing the fence of slot {} failed: {}", slot, recycle);
                }
                self.acquired = None;
                return Err(e);
            }
        };

        if outcome.index as usize >= self.images.len() {
            self.acquired = None;
            winsys_bail!(SOURCE, "Acquired image index {} out of range ({} images)",
                outcome.index, self.images.len());
        }
        if outcome.suboptimal {
            winsys_debug!(SOURCE, "Swapchain is suboptimal for the surface");
        }

        winsys_trace!(SOURCE, "Acquired image {} (slot {})", outcome.index, slot);
        self.acquired = Some(AcquiredImage { index: outcome.index, slot });
        Ok(outcome.index)
    }

    /// Present the acquired image, then acquire the next one
    ///
    /// Returns `Ok(false)` without any platform call when there is nothing
    /// to present.
    pub fn present(&mut self) -> Result<bool> {
        let swapchain = self.swapchain_handle();
        if swapchain.is_null() {
            winsys_warn!(SOURCE, "Present without a swapchain ignored");
            return Ok(false);
        }
        let (acquired, ring) = match (self.acquired, self.ring.as_ref()) {
            (Some(acquired), Some(ring)) => (acquired, ring),
            _ => {
                winsys_warn!(SOURCE, "Present without an acquired image ignored");
                return Ok(false);
            }
        };

        let render_finished = ring.slot(acquired.slot).render_finished();
        self.acquired = None;

        let outcome = self.device.queue_present(swapchain, acquired.index, render_finished)?;
        if outcome.suboptimal {
            winsys_debug!(SOURCE, "Present reported a suboptimal swapchain");
        }
        winsys_trace!(SOURCE, "Presented image {}", acquired.index);

        self.acquire_next_image()?;
        Ok(true)
    }

    /// Resource of the acquired image, None when nothing is acquired
    pub fn current_resource(&self) -> Option<Arc<PresentImage>> {
        let acquired = self.acquired?;
        self.images.get(acquired.index as usize).map(Arc::clone)
    }

    /// Semaphores the frontend must wait on / signal for the current frame
    pub fn frame_sync(&self) -> Option<FrameSync> {
        let acquired = self.acquired?;
        let slot = self.ring.as_ref()?.slot(acquired.slot);
        Some(FrameSync {
            image_index: acquired.index,
            slot: acquired.slot,
            image_available: slot.image_available(),
            render_finished: slot.render_finished(),
        })
    }

    // ===== TEARDOWN =====

    /// Release everything in dependency order
    ///
    /// Tolerates any partial state; every step is skipped when its piece
    /// was never created.
    pub fn destroy(&mut self, ctx: Option<&mut dyn RenderContext>) -> Result<()> {
        let drained = match (ctx, self.swapchain.is_some()) {
            (Some(ctx), true) => drain(ctx),
            _ => Ok(()),
        };
        if let Err(e) = &drained {
            winsys_warn!(SOURCE, "Draining the render context failed during destroy: {}", e);
        }

        self.teardown();
        drained
    }

    fn teardown(&mut self) {
        self.acquired = None;
        self.release_images();
        // SyncRing::drop waits on every slot fence before releasing the primitives
        self.ring = None;
        self.swapchain = None;
        self.surface = None;
    }

    /// Retire the current image set and drop the manager's references
    fn release_images(&mut self) {
        self.acquired = None;
        for image in self.images.drain(..) {
            image.retire();
            let outstanding = Arc::strong_count(&image) - 1;
            if outstanding > 0 {
                winsys_warn!(SOURCE, "Image {} of generation {} retired with {} outstanding reference(s)",
                    image.index(), image.generation(), outstanding);
            }
        }
    }
}

impl Drop for SwapchainManager {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Flush the render context and wait on the fence it returns
fn drain(ctx: &mut dyn RenderContext) -> Result<()> {
    if let Some(fence) = ctx.flush()? {
        ctx.fence_finish(fence, TIMEOUT_INFINITE)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "swapchain_tests.rs"]
mod tests;
