/*!
# Winsys Framebuffer - Vulkan Backend

Vulkan implementation of the capability traits consumed by
`winsys_framebuffer`, built on `ash` and `ash-window`.

- **VulkanDevice**: instance, logical device, queues; implements `PresentDevice`
- **VulkanResourceFactory**: wraps swapchain images into `VulkanImageResource`s
- **VulkanRenderContext**: flushes the graphics queue before images are released

Validation layers are only enabled with the `vulkan-validation` feature and
`Config::enable_validation`; their messages go through the winsys logger.

# Example

```no_run
use std::sync::Arc;
use winsys_framebuffer::winsys::{Config, Framebuffer, PixelFormat, PixelFormatFlags,
    PixelFormatInfo, ResourceTemplate, WindowTarget};
use winsys_framebuffer_vulkan::{VulkanDevice, VulkanRenderContext, VulkanResourceFactory};
# fn run(window: &winit::window::Window) -> winsys_framebuffer::winsys::Result<()> {
let config = Config::default();
let device = Arc::new(VulkanDevice::new(window, &config)?);
let factory = Arc::new(VulkanResourceFactory::new(device.clone()));
let mut ctx = VulkanRenderContext::new(device.clone());

let info = PixelFormatInfo {
    id: 1,
    flags: PixelFormatFlags::DOUBLEBUFFER | PixelFormatFlags::DRAW_TO_WINDOW,
    color_format: PixelFormat::B8G8R8A8_SRGB,
};
let mut fb = Framebuffer::create(device, factory, WindowTarget::from_window(window)?, &info, config)
    .expect("double-buffered window format");
fb.resize(&mut ctx, &ResourceTemplate::new_2d(PixelFormat::B8G8R8A8_SRGB, 800, 600))?;
fb.present()?;
fb.destroy(Some(&mut ctx))?;
# Ok(())
# }
```
*/

mod debug;
mod vulkan_context;
mod vulkan_device;
mod vulkan_format;
mod vulkan_resource;

pub use vulkan_context::VulkanRenderContext;
pub use vulkan_device::VulkanDevice;
pub use vulkan_format::{format_to_vk, vk_error};
pub use vulkan_resource::{VulkanImageResource, VulkanResourceFactory};

// Re-export debug utilities
pub use debug::{get_validation_stats, print_validation_stats_report, ValidationStats};
