/// Framebuffer facade - the public contract of a window's presentable surface
///
/// # Lifecycle
///
/// ```text
/// create ──> Uninitialized ──resize──> Live ──resize──> Live
///                  │                     │
///                  └──────destroy────────┴──> Destroyed (terminal)
/// ```
///
/// `create` makes no platform call. The first `resize` creates the surface,
/// the sync ring and the swapchain and acquires an image. `present` queues
/// the acquired image and acquires the next one.
///
/// # Example
///
/// ```no_run
/// # use std::sync::Arc;
/// # use winsys_framebuffer::winsys::*;
/// # fn run(device: Arc<dyn PresentDevice>, factory: Arc<dyn ResourceFactory>,
/// #        window: WindowTarget, info: PixelFormatInfo, ctx: &mut dyn RenderContext) -> Result<()> {
/// let mut fb = Framebuffer::create(device, factory, window, &info, Config::default())
///     .ok_or_else(|| Error::Unsupported("pixel format".to_string()))?;
///
/// fb.resize(ctx, &ResourceTemplate::new_2d(PixelFormat::B8G8R8A8_UNORM, 800, 600))?;
/// if let Some(image) = fb.get_resource(Attachment::BackLeft) {
///     // render into image.resource() ...
/// }
/// fb.present()?;
/// fb.destroy(Some(ctx))?;
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use crate::config::{Config, PresentMode};
use crate::error::Result;
use crate::format::{PixelFormat, PixelFormatInfo};
use crate::platform::{
    PresentDevice, RenderContext, ResourceFactory, SurfaceFormat, WindowTarget,
};
use crate::resource::{Attachment, PresentImage, ResourceTemplate};
use crate::swapchain::{FrameSync, SwapchainManager};
use crate::{winsys_bail, winsys_debug, winsys_info, winsys_warn};

const SOURCE: &str = "winsys::Framebuffer";

/// Lifecycle state of a framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferState {
    /// Created, no swapchain yet
    Uninitialized,
    /// Swapchain created, an image is (normally) acquired
    Live,
    /// Torn down; only accessors remain usable
    Destroyed,
}

pub struct Framebuffer {
    manager: SwapchainManager,
    state: FramebufferState,
    pixel_format: PixelFormatInfo,
}

impl Framebuffer {
    /// Create a framebuffer for `window`
    ///
    /// Returns None when the pixel format cannot be backed by a swapchain
    /// (no double buffering, or GDI drawing requested). No platform call is
    /// made here.
    pub fn create(
        device: Arc<dyn PresentDevice>,
        factory: Arc<dyn ResourceFactory>,
        window: WindowTarget,
        pixel_format: &PixelFormatInfo,
        config: Config,
    ) -> Option<Self> {
        if !pixel_format.supports_swapchain() {
            winsys_debug!(SOURCE, "Pixel format {} ({:?}) cannot use a swapchain",
                pixel_format.id, pixel_format.flags);
            return None;
        }

        Some(Self {
            manager: SwapchainManager::new(device, factory, window, config),
            state: FramebufferState::Uninitialized,
            pixel_format: *pixel_format,
        })
    }

    // ===== CONTRACT =====

    /// Create or recreate the swapchain for `template`'s extent and format
    ///
    /// Rendering pending in `ctx` is flushed and waited on before the
    /// current images are replaced. On error the state is unchanged.
    pub fn resize(&mut self, ctx: &mut dyn RenderContext, template: &ResourceTemplate) -> Result<()> {
        if self.state == FramebufferState::Destroyed {
            winsys_bail!(@InvalidState SOURCE, "Resize of a destroyed framebuffer");
        }

        self.manager.resize(template.width, template.height, template.format, ctx)?;
        self.state = FramebufferState::Live;
        Ok(())
    }

    /// Present the acquired image and acquire the next one
    ///
    /// `Ok(false)` when there is nothing to present (no swapchain yet,
    /// destroyed, or no image acquired).
    pub fn present(&mut self) -> Result<bool> {
        match self.state {
            FramebufferState::Live => self.manager.present(),
            FramebufferState::Uninitialized => {
                winsys_warn!(SOURCE, "Present before the first resize ignored");
                Ok(false)
            }
            FramebufferState::Destroyed => {
                winsys_warn!(SOURCE, "Present of a destroyed framebuffer ignored");
                Ok(false)
            }
        }
    }

    /// Resource backing `attachment`
    ///
    /// Swapchain-backed attachments (front and back left) resolve to the
    /// acquired image. Each call hands out a new reference.
    pub fn get_resource(&self, attachment: Attachment) -> Option<Arc<PresentImage>> {
        if self.state != FramebufferState::Live || !attachment.is_swapchain_backed() {
            return None;
        }
        self.manager.current_resource()
    }

    /// Tear everything down; terminal
    ///
    /// `ctx`, when given, is drained first. A second call is a no-op.
    pub fn destroy(&mut self, ctx: Option<&mut dyn RenderContext>) -> Result<()> {
        if self.state == FramebufferState::Destroyed {
            return Ok(());
        }

        let result = self.manager.destroy(ctx);
        self.state = FramebufferState::Destroyed;
        winsys_info!(SOURCE, "Framebuffer destroyed after {} swapchain generation(s)",
            self.manager.generation());
        result
    }

    // ===== ACCESSORS =====

    pub fn state(&self) -> FramebufferState {
        self.state
    }

    pub fn pixel_format(&self) -> &PixelFormatInfo {
        &self.pixel_format
    }

    pub fn width(&self) -> u32 {
        self.manager.extent().width
    }

    pub fn height(&self) -> u32 {
        self.manager.extent().height
    }

    /// Color format, fixed by the first resize
    pub fn format(&self) -> Option<PixelFormat> {
        self.manager.format()
    }

    pub fn image_count(&self) -> usize {
        self.manager.image_count()
    }

    /// Number of swapchains created so far
    pub fn generation(&self) -> u64 {
        self.manager.generation()
    }

    /// Index of the acquired image
    pub fn acquired_index(&self) -> Option<u32> {
        self.manager.acquired().map(|a| a.index)
    }

    /// Frames begun so far
    pub fn frame_counter(&self) -> u64 {
        self.manager.frame_counter()
    }

    /// Semaphores of the current frame (see `FrameSync`)
    pub fn frame_sync(&self) -> Option<FrameSync> {
        if self.state != FramebufferState::Live {
            return None;
        }
        self.manager.frame_sync()
    }

    /// Formats the surface reported, empty before the first resize
    pub fn surface_formats(&self) -> &[SurfaceFormat] {
        self.manager.surface().map(|s| s.formats()).unwrap_or(&[])
    }

    /// Present modes the surface reported, empty before the first resize
    pub fn present_modes(&self) -> &[PresentMode] {
        self.manager.surface().map(|s| s.present_modes()).unwrap_or(&[])
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        if self.state != FramebufferState::Destroyed {
            // No render context here; the manager's own teardown runs
            if let Err(e) = self.manager.destroy(None) {
                winsys_warn!(SOURCE, "Teardown on drop failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
#[path = "framebuffer_tests.rs"]
mod tests;
