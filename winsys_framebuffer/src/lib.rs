/*!
# Winsys Framebuffer

Swapchain-backed framebuffer for a native window.

This crate owns the presentation lifecycle of one window: surface creation,
swapchain (re)creation on resize, a fixed ring of frames in flight with
fence-based backpressure, image acquisition and presentation, and ordered
teardown. It talks to the GPU only through capability traits; backend
crates (e.g. `winsys_framebuffer_vulkan`) implement them.

## Architecture

- **Framebuffer**: public facade (create / resize / present / get_resource / destroy)
- **SwapchainManager**: swapchain recreation, acquire/present protocol, teardown order
- **SyncRing**: per-frame semaphores and fences, slot = frame % MAX_BUFFERS
- **SurfaceBinding**: window surface plus cached format/present-mode queries
- **PresentDevice / ResourceFactory / RenderContext**: consumed capabilities
*/

// Internal modules
mod error;
mod config;
mod format;
mod platform;
mod resource;
mod surface;
mod sync_ring;
mod swapchain;
mod framebuffer;
pub mod log;

#[cfg(test)]
mod mock_device;

// Main winsys namespace module
pub mod winsys {
    // Error types
    pub use crate::error::{Error, Result};

    // Configuration
    pub use crate::config::{Config, PresentMode, MAX_BUFFERS, TIMEOUT_INFINITE};

    // Formats
    pub use crate::format::{PixelFormat, PixelFormatFlags, PixelFormatInfo};

    // Capability traits and handles
    pub use crate::platform::{
        AcquireOutcome, ColorSpace, CompositeAlpha, ContextFence, Extent2D, FenceHandle,
        ImageHandle, ImageUsage, NativeFormat, PresentDevice, PresentOutcome, QueueFamilies,
        RenderContext, ResourceFactory, SemaphoreHandle, SurfaceCapabilities, SurfaceFormat,
        SurfaceHandle, SwapchainDesc, SwapchainHandle, WindowTarget, SWAPCHAIN_IMAGE_USAGE,
    };

    // Resources
    pub use crate::resource::{
        Attachment, BindFlags, PresentImage, RenderResource, ResourceTemplate, TextureTarget,
    };

    // Components
    pub use crate::surface::SurfaceBinding;
    pub use crate::sync_ring::{SyncRing, SyncSlot};
    pub use crate::swapchain::{AcquiredImage, FrameSync, SwapchainManager};
    pub use crate::framebuffer::{Framebuffer, FramebufferState};

    // Logging sub-module (types and functions; the winsys_* macros live at the crate root)
    pub mod log {
        pub use crate::log::{
            Logger, LogEntry, LogSeverity, DefaultLogger, set_logger, reset_logger, log,
            log_detailed,
        };
    }
}
