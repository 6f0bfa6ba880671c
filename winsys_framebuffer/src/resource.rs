/// Render resources wrapping swapchain images
///
/// A `PresentImage` is the framebuffer's handle on one swapchain image: the
/// backend resource created from the image plus the image index and the
/// swapchain generation it belongs to. Callers receive it as
/// `Arc<PresentImage>`; when the swapchain is replaced the framebuffer marks
/// every image of the old generation as retired and drops its own reference,
/// so a clone held across a resize is still memory-safe but observably stale.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use bitflags::bitflags;

use crate::format::PixelFormat;
use crate::platform::ImageHandle;

/// Texture dimensionality of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    Texture2D,
}

bitflags! {
    /// How a resource may be bound
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BindFlags: u32 {
        const RENDER_TARGET = 0x0000_0002;
        const SAMPLER_VIEW = 0x0000_0008;
        const DISPLAY_TARGET = 0x0000_0100;
        const SCANOUT = 0x0000_4000;
        const SHARED = 0x0000_8000;
    }
}

/// Description used to create or wrap a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceTemplate {
    pub target: TextureTarget,
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub array_size: u32,
    pub sample_count: u32,
    pub last_level: u32,
    pub bind: BindFlags,
}

impl ResourceTemplate {
    /// Single-level, single-sample 2D template
    pub fn new_2d(format: PixelFormat, width: u32, height: u32) -> Self {
        Self {
            target: TextureTarget::Texture2D,
            format,
            width,
            height,
            depth: 1,
            array_size: 1,
            sample_count: 1,
            last_level: 0,
            bind: BindFlags::RENDER_TARGET,
        }
    }

    /// Template used to wrap every image of a swapchain
    pub fn swapchain_image(format: PixelFormat, width: u32, height: u32) -> Self {
        Self {
            bind: BindFlags::DISPLAY_TARGET | BindFlags::RENDER_TARGET | BindFlags::SCANOUT,
            ..Self::new_2d(format, width, height)
        }
    }
}

/// A renderable resource produced by a `ResourceFactory`
pub trait RenderResource: Send + Sync {
    fn template(&self) -> &ResourceTemplate;

    /// Image the resource was created from
    fn image(&self) -> ImageHandle;
}

/// Framebuffer attachment a caller asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attachment {
    FrontLeft,
    BackLeft,
    FrontRight,
    BackRight,
    DepthStencil,
}

impl Attachment {
    /// Front and back left both resolve to the acquired swapchain image;
    /// there is no stereo or depth/stencil swapchain
    pub fn is_swapchain_backed(&self) -> bool {
        matches!(self, Attachment::FrontLeft | Attachment::BackLeft)
    }
}

/// One swapchain image as seen by callers
pub struct PresentImage {
    resource: Arc<dyn RenderResource>,
    index: u32,
    generation: u64,
    retired: AtomicBool,
}

impl PresentImage {
    pub(crate) fn new(resource: Arc<dyn RenderResource>, index: u32, generation: u64) -> Self {
        Self {
            resource,
            index,
            generation,
            retired: AtomicBool::new(false),
        }
    }

    /// The wrapped backend resource
    pub fn resource(&self) -> &Arc<dyn RenderResource> {
        &self.resource
    }

    pub fn image(&self) -> ImageHandle {
        self.resource.image()
    }

    /// Position of the image in the swapchain
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Swapchain generation this image belongs to (1 for the first swapchain)
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn width(&self) -> u32 {
        self.resource.template().width
    }

    pub fn height(&self) -> u32 {
        self.resource.template().height
    }

    pub fn format(&self) -> PixelFormat {
        self.resource.template().format
    }

    /// True once the swapchain this image belongs to has been replaced or
    /// destroyed. A retired image must not be rendered to or presented.
    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::Acquire)
    }

    pub(crate) fn retire(&self) {
        self.retired.store(true, Ordering::Release);
    }
}

impl fmt::Debug for PresentImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresentImage")
            .field("index", &self.index)
            .field("generation", &self.generation)
            .field("image", &self.image())
            .field("retired", &self.is_retired())
            .finish()
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
