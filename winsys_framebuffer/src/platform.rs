/// Platform capability traits - what the framebuffer consumes from a GPU backend
///
/// The framebuffer never talks to a graphics API directly. It drives three
/// capability providers:
///
/// - **PresentDevice**: surfaces, swapchains, semaphores, fences, acquire and present
/// - **ResourceFactory**: wraps an externally created image as a renderable resource
/// - **RenderContext**: flush + fence wait of the frontend's rendering context
///
/// Backends (e.g. `winsys_framebuffer_vulkan`) implement these traits; unit
/// tests use the mock device.

use std::sync::Arc;
use bitflags::bitflags;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawDisplayHandle, RawWindowHandle};

use crate::config::PresentMode;
use crate::error::{Error, Result};
use crate::format::PixelFormat;
use crate::resource::{RenderResource, ResourceTemplate};

// ============================================================================
// Handles
// ============================================================================

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(u64);

        impl $name {
            /// The null handle
            pub const NULL: Self = Self(0);

            /// Wrap a raw backend handle value
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            /// Raw backend handle value
            pub const fn as_raw(&self) -> u64 {
                self.0
            }

            pub const fn is_null(&self) -> bool {
                self.0 == 0
            }
        }
    };
}

define_handle!(
    /// Presentable surface bound to a native window
    SurfaceHandle
);
define_handle!(
    /// Chain of presentable images
    SwapchainHandle
);
define_handle!(
    /// GPU-side binary semaphore
    SemaphoreHandle
);
define_handle!(
    /// Host-waitable fence
    FenceHandle
);
define_handle!(
    /// Presentable image owned by a swapchain
    ImageHandle
);

/// Backend-native format value (e.g. a `VkFormat`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeFormat(pub i32);

/// Native window the framebuffer presents to
#[derive(Debug, Clone, Copy)]
pub struct WindowTarget {
    pub window: RawWindowHandle,
    pub display: RawDisplayHandle,
}

impl WindowTarget {
    pub fn new(window: RawWindowHandle, display: RawDisplayHandle) -> Self {
        Self { window, display }
    }

    /// Capture the raw handles of any raw-window-handle provider (winit, sdl, ...)
    pub fn from_window<W: HasWindowHandle + HasDisplayHandle + ?Sized>(window: &W) -> Result<Self> {
        let window_handle = window.window_handle()
            .map_err(|e| Error::InvalidArgument(format!("Failed to get window handle: {}", e)))?;
        let display_handle = window.display_handle()
            .map_err(|e| Error::InvalidArgument(format!("Failed to get display handle: {}", e)))?;

        Ok(Self {
            window: window_handle.as_raw(),
            display: display_handle.as_raw(),
        })
    }
}

// ============================================================================
// Surface and swapchain descriptions
// ============================================================================

/// Width/height pair in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent2D {
    pub width: u32,
    pub height: u32,
}

impl Extent2D {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Color space of presented images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    SrgbNonLinear,
    /// Any other backend color space, raw value
    Other(i32),
}

/// A (format, color space) pair the surface can present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceFormat {
    pub format: NativeFormat,
    pub color_space: ColorSpace,
}

/// Surface limits reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceCapabilities {
    pub min_image_count: u32,
    /// 0 means no limit
    pub max_image_count: u32,
    pub current_extent: Extent2D,
    pub min_image_extent: Extent2D,
    pub max_image_extent: Extent2D,
    /// Backend surface transform bits, forwarded untouched as pre-transform
    pub current_transform: u32,
}

bitflags! {
    /// Usage of swapchain images (bit values follow VkImageUsageFlagBits)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImageUsage: u32 {
        const TRANSFER_SRC = 0x0000_0001;
        const TRANSFER_DST = 0x0000_0002;
        const SAMPLED = 0x0000_0004;
        const STORAGE = 0x0000_0008;
        const COLOR_ATTACHMENT = 0x0000_0010;
        const DEPTH_STENCIL_ATTACHMENT = 0x0000_0020;
        const INPUT_ATTACHMENT = 0x0000_0080;
    }
}

/// Usage every swapchain image is created with.
///
/// Must equal the usage the resource layer derives for a color-renderable
/// 2D resource, otherwise wrapped images and regular ones diverge.
pub const SWAPCHAIN_IMAGE_USAGE: ImageUsage = ImageUsage::TRANSFER_SRC
    .union(ImageUsage::TRANSFER_DST)
    .union(ImageUsage::SAMPLED)
    .union(ImageUsage::COLOR_ATTACHMENT)
    .union(ImageUsage::INPUT_ATTACHMENT);

/// Alpha compositing with the window system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeAlpha {
    Opaque,
    PreMultiplied,
    PostMultiplied,
    Inherit,
}

/// Queue families used for rendering and presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilies {
    pub graphics: u32,
    pub present: u32,
}

impl QueueFamilies {
    /// Distinct family indices sharing the swapchain images
    pub fn sharing_indices(&self) -> Vec<u32> {
        if self.graphics == self.present {
            vec![self.graphics]
        } else {
            vec![self.graphics, self.present]
        }
    }
}

/// Swapchain creation parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapchainDesc {
    pub surface: SurfaceHandle,
    pub min_image_count: u32,
    pub format: NativeFormat,
    pub color_space: ColorSpace,
    pub extent: Extent2D,
    pub array_layers: u32,
    pub usage: ImageUsage,
    /// Exclusive sharing between these families
    pub queue_family_indices: Vec<u32>,
    pub pre_transform: u32,
    pub composite_alpha: CompositeAlpha,
    pub present_mode: PresentMode,
    pub clipped: bool,
    /// Chain being replaced, NULL on first creation
    pub old_swapchain: SwapchainHandle,
}

/// Result of a successful image acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquireOutcome {
    pub index: u32,
    /// The swapchain still works but no longer matches the surface exactly
    pub suboptimal: bool,
}

/// Result of a successful present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresentOutcome {
    pub suboptimal: bool,
}

/// Fence returned by a render context flush
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextFence(pub u64);

// ============================================================================
// Capability traits
// ============================================================================

/// GPU device/queue/instance capabilities needed for presentation
///
/// All destroy methods accept NULL handles and ignore them.
pub trait PresentDevice: Send + Sync {
    /// Map a framebuffer format to the backend format, None if unsupported
    fn native_format(&self, format: PixelFormat) -> Option<NativeFormat>;

    /// Queue families used for rendering and presentation
    fn queue_families(&self) -> QueueFamilies;

    fn create_surface(&self, window: &WindowTarget) -> Result<SurfaceHandle>;
    fn destroy_surface(&self, surface: SurfaceHandle);

    /// Formats the surface can present (informational)
    fn surface_formats(&self, surface: SurfaceHandle) -> Result<Vec<SurfaceFormat>>;
    /// Present modes the surface supports (informational)
    fn surface_present_modes(&self, surface: SurfaceHandle) -> Result<Vec<PresentMode>>;
    fn surface_capabilities(&self, surface: SurfaceHandle) -> Result<SurfaceCapabilities>;
    /// Whether `queue_family` can present to `surface`
    fn surface_support(&self, queue_family: u32, surface: SurfaceHandle) -> Result<bool>;

    fn create_swapchain(&self, desc: &SwapchainDesc) -> Result<SwapchainHandle>;
    fn destroy_swapchain(&self, swapchain: SwapchainHandle);
    fn swapchain_images(&self, swapchain: SwapchainHandle) -> Result<Vec<ImageHandle>>;

    fn create_semaphore(&self) -> Result<SemaphoreHandle>;
    fn destroy_semaphore(&self, semaphore: SemaphoreHandle);

    fn create_fence(&self, signaled: bool) -> Result<FenceHandle>;
    /// Block until `fence` is signaled or `timeout` nanoseconds elapsed
    fn wait_for_fence(&self, fence: FenceHandle, timeout: u64) -> Result<()>;
    fn reset_fence(&self, fence: FenceHandle) -> Result<()>;
    fn destroy_fence(&self, fence: FenceHandle);

    /// Request the next presentable image
    ///
    /// `semaphore` and `fence` are signaled when the image is safe to write.
    fn acquire_next_image(
        &self,
        swapchain: SwapchainHandle,
        timeout: u64,
        semaphore: SemaphoreHandle,
        fence: FenceHandle,
    ) -> Result<AcquireOutcome>;

    /// Queue `image_index` for presentation once `wait_semaphore` is signaled
    fn queue_present(
        &self,
        swapchain: SwapchainHandle,
        image_index: u32,
        wait_semaphore: SemaphoreHandle,
    ) -> Result<PresentOutcome>;
}

/// Factory turning an externally created image into a renderable resource
pub trait ResourceFactory: Send + Sync {
    /// Wrap `image` (not owned by the resource) as a resource described by `template`
    fn resource_from_handle(
        &self,
        template: &ResourceTemplate,
        image: ImageHandle,
    ) -> Result<Arc<dyn RenderResource>>;
}

/// The frontend's rendering context, used to drain work before images are replaced
pub trait RenderContext {
    /// Flush pending rendering, returning a fence when work was submitted
    fn flush(&mut self) -> Result<Option<ContextFence>>;

    /// Wait until `fence` retires, then release it
    fn fence_finish(&mut self, fence: ContextFence, timeout: u64) -> Result<()>;
}

#[cfg(test)]
#[path = "platform_tests.rs"]
mod tests;
