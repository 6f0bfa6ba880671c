/// Pixel formats and pixel-format descriptors
///
/// `PixelFormat` is the renderer-facing color format of the framebuffer.
/// Backends map it to their native format through
/// `PresentDevice::native_format()`; a format without a mapping is rejected
/// at resize time.

use bitflags::bitflags;

/// Color format of the presentable images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum PixelFormat {
    R8G8B8A8_SRGB,
    R8G8B8A8_UNORM,
    B8G8R8A8_SRGB,
    B8G8R8A8_UNORM,
    A2B10G10R10_UNORM,
    R16G16B16A16_SFLOAT,
    R5G6B5_UNORM,
    /// Depth/stencil, never presentable
    D24_UNORM_S8_UINT,
}

impl PixelFormat {
    /// Whether this is a depth and/or stencil format
    pub fn is_depth_stencil(&self) -> bool {
        matches!(self, PixelFormat::D24_UNORM_S8_UINT)
    }
}

bitflags! {
    /// Capability flags of a window-system pixel format descriptor
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PixelFormatFlags: u32 {
        const DRAW_TO_WINDOW = 0x0000_0004;
        const DRAW_TO_BITMAP = 0x0000_0008;
        const SUPPORT_GDI = 0x0000_0010;
        const SUPPORT_OPENGL = 0x0000_0020;
        const DOUBLEBUFFER = 0x0000_0001;
        const STEREO = 0x0000_0002;
    }
}

/// Pixel-format descriptor negotiated with the window system
///
/// Looked up by the caller from its pixel-format table and handed to
/// `Framebuffer::create()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormatInfo {
    /// Window-system pixel format id
    pub id: i32,
    /// Descriptor flags
    pub flags: PixelFormatFlags,
    /// Color buffer format
    pub color_format: PixelFormat,
}

impl PixelFormatInfo {
    /// A swapchain-backed framebuffer needs double buffering and a color
    /// format, and cannot serve legacy GDI drawing.
    pub fn supports_swapchain(&self) -> bool {
        self.flags.contains(PixelFormatFlags::DOUBLEBUFFER)
            && !self.flags.contains(PixelFormatFlags::SUPPORT_GDI)
            && !self.color_format.is_depth_stencil()
    }
}

#[cfg(test)]
#[path = "format_tests.rs"]
mod tests;
