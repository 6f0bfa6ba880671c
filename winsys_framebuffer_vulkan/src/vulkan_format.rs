/// Conversions between winsys types and Vulkan types
///
/// Pure functions, no device needed. `vk_error()` is the single place where
/// a `vk::Result` becomes a winsys `Error`.

use ash::vk;
use winsys_framebuffer::winsys::{
    ColorSpace, CompositeAlpha, Error, Extent2D, ImageUsage, NativeFormat, PixelFormat,
    PresentMode, SurfaceCapabilities, SurfaceFormat,
};
use winsys_framebuffer::{winsys_err, winsys_error, winsys_warn};

pub(crate) const SOURCE: &str = "winsys::vulkan";

/// Map a framebuffer format to the Vulkan format, None when not presentable
pub fn format_to_vk(format: PixelFormat) -> Option<vk::Format> {
    match format {
        PixelFormat::R8G8B8A8_SRGB => Some(vk::Format::R8G8B8A8_SRGB),
        PixelFormat::R8G8B8A8_UNORM => Some(vk::Format::R8G8B8A8_UNORM),
        PixelFormat::B8G8R8A8_SRGB => Some(vk::Format::B8G8R8A8_SRGB),
        PixelFormat::B8G8R8A8_UNORM => Some(vk::Format::B8G8R8A8_UNORM),
        PixelFormat::A2B10G10R10_UNORM => Some(vk::Format::A2B10G10R10_UNORM_PACK32),
        PixelFormat::R16G16B16A16_SFLOAT => Some(vk::Format::R16G16B16A16_SFLOAT),
        PixelFormat::R5G6B5_UNORM => Some(vk::Format::R5G6B5_UNORM_PACK16),
        PixelFormat::D24_UNORM_S8_UINT => None,
    }
}

pub fn native_to_vk(format: NativeFormat) -> vk::Format {
    vk::Format::from_raw(format.0)
}

pub fn vk_to_native(format: vk::Format) -> NativeFormat {
    NativeFormat(format.as_raw())
}

pub fn color_space_to_vk(color_space: ColorSpace) -> vk::ColorSpaceKHR {
    match color_space {
        ColorSpace::SrgbNonLinear => vk::ColorSpaceKHR::SRGB_NONLINEAR,
        ColorSpace::Other(raw) => vk::ColorSpaceKHR::from_raw(raw),
    }
}

pub fn vk_to_color_space(color_space: vk::ColorSpaceKHR) -> ColorSpace {
    if color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR {
        ColorSpace::SrgbNonLinear
    } else {
        ColorSpace::Other(color_space.as_raw())
    }
}

pub fn vk_to_surface_format(format: &vk::SurfaceFormatKHR) -> SurfaceFormat {
    SurfaceFormat {
        format: vk_to_native(format.format),
        color_space: vk_to_color_space(format.color_space),
    }
}

pub fn present_mode_to_vk(mode: PresentMode) -> vk::PresentModeKHR {
    match mode {
        PresentMode::Immediate => vk::PresentModeKHR::IMMEDIATE,
        PresentMode::Mailbox => vk::PresentModeKHR::MAILBOX,
        PresentMode::Fifo => vk::PresentModeKHR::FIFO,
        PresentMode::FifoRelaxed => vk::PresentModeKHR::FIFO_RELAXED,
    }
}

/// None for extension present modes the framebuffer never requests
pub fn vk_to_present_mode(mode: vk::PresentModeKHR) -> Option<PresentMode> {
    match mode {
        vk::PresentModeKHR::IMMEDIATE => Some(PresentMode::Immediate),
        vk::PresentModeKHR::MAILBOX => Some(PresentMode::Mailbox),
        vk::PresentModeKHR::FIFO => Some(PresentMode::Fifo),
        vk::PresentModeKHR::FIFO_RELAXED => Some(PresentMode::FifoRelaxed),
        _ => None,
    }
}

pub fn composite_alpha_to_vk(alpha: CompositeAlpha) -> vk::CompositeAlphaFlagsKHR {
    match alpha {
        CompositeAlpha::Opaque => vk::CompositeAlphaFlagsKHR::OPAQUE,
        CompositeAlpha::PreMultiplied => vk::CompositeAlphaFlagsKHR::PRE_MULTIPLIED,
        CompositeAlpha::PostMultiplied => vk::CompositeAlphaFlagsKHR::POST_MULTIPLIED,
        CompositeAlpha::Inherit => vk::CompositeAlphaFlagsKHR::INHERIT,
    }
}

/// ImageUsage bits follow VkImageUsageFlagBits, so this is a plain copy
pub fn usage_to_vk(usage: ImageUsage) -> vk::ImageUsageFlags {
    vk::ImageUsageFlags::from_raw(usage.bits())
}

pub fn vk_to_extent(extent: vk::Extent2D) -> Extent2D {
    Extent2D::new(extent.width, extent.height)
}

pub fn vk_to_capabilities(caps: &vk::SurfaceCapabilitiesKHR) -> SurfaceCapabilities {
    SurfaceCapabilities {
        min_image_count: caps.min_image_count,
        max_image_count: caps.max_image_count,
        current_extent: vk_to_extent(caps.current_extent),
        min_image_extent: vk_to_extent(caps.min_image_extent),
        max_image_extent: vk_to_extent(caps.max_image_extent),
        current_transform: caps.current_transform.as_raw(),
    }
}

/// Translate a failed Vulkan call into a winsys error, logging it
///
/// `ERROR_OUT_OF_DATE_KHR` is expected during window resizes and only warns.
pub fn vk_error(call: &str, result: vk::Result) -> Error {
    match result {
        vk::Result::ERROR_OUT_OF_DATE_KHR => {
            winsys_warn!(SOURCE, "{}: swapchain out of date", call);
            Error::OutOfDate
        }
        vk::Result::ERROR_DEVICE_LOST => {
            winsys_error!(SOURCE, "{}: device lost", call);
            Error::DeviceLost
        }
        vk::Result::ERROR_OUT_OF_HOST_MEMORY | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => {
            winsys_error!(SOURCE, "{}: out of memory ({:?})", call, result);
            Error::OutOfMemory
        }
        other => winsys_err!(SOURCE, "{} failed: {:?}", call, other),
    }
}

#[cfg(test)]
#[path = "vulkan_format_tests.rs"]
mod tests;
