/// Vulkan render resources wrapping swapchain images
///
/// The swapchain owns its images. A `VulkanImageResource` only owns the
/// color view created on top of one of them and destroys it on drop.

use ash::vk;
use ash::vk::Handle;
use std::sync::Arc;
use winsys_framebuffer::winsys::{
    ImageHandle, RenderResource, ResourceFactory, ResourceTemplate, Result,
};
use winsys_framebuffer::{winsys_bail, winsys_trace};

use crate::vulkan_device::VulkanDevice;
use crate::vulkan_format::{format_to_vk, vk_error, SOURCE};

/// Image plus the view rendering goes through
pub struct VulkanImageResource {
    device: Arc<VulkanDevice>,
    template: ResourceTemplate,
    image: vk::Image,
    view: vk::ImageView,
}

impl VulkanImageResource {
    pub fn vk_image(&self) -> vk::Image {
        self.image
    }

    /// Color view over the whole image
    pub fn view(&self) -> vk::ImageView {
        self.view
    }
}

impl RenderResource for VulkanImageResource {
    fn template(&self) -> &ResourceTemplate {
        &self.template
    }

    fn image(&self) -> ImageHandle {
        ImageHandle::from_raw(self.image.as_raw())
    }
}

impl Drop for VulkanImageResource {
    fn drop(&mut self) {
        unsafe {
            self.device.device().destroy_image_view(self.view, None);
        }
        winsys_trace!(SOURCE, "Image view {:#x} destroyed", self.view.as_raw());
    }
}

/// Creates `VulkanImageResource`s for the framebuffer
pub struct VulkanResourceFactory {
    device: Arc<VulkanDevice>,
}

impl VulkanResourceFactory {
    pub fn new(device: Arc<VulkanDevice>) -> Self {
        Self { device }
    }
}

impl ResourceFactory for VulkanResourceFactory {
    fn resource_from_handle(
        &self,
        template: &ResourceTemplate,
        image: ImageHandle,
    ) -> Result<Arc<dyn RenderResource>> {
        let Some(format) = format_to_vk(template.format) else {
            winsys_bail!(@InvalidArgument SOURCE, "Format {:?} has no Vulkan color view", template.format);
        };
        if image.is_null() {
            winsys_bail!(@InvalidArgument SOURCE, "Cannot wrap a null image");
        }

        let image = vk::Image::from_raw(image.as_raw());
        let create_info = vk::ImageViewCreateInfo::default()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format)
            .components(vk::ComponentMapping {
                r: vk::ComponentSwizzle::IDENTITY,
                g: vk::ComponentSwizzle::IDENTITY,
                b: vk::ComponentSwizzle::IDENTITY,
                a: vk::ComponentSwizzle::IDENTITY,
            })
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                base_mip_level: 0,
                level_count: template.last_level + 1,
                base_array_layer: 0,
                layer_count: template.array_size,
            });

        let view = unsafe {
            self.device
                .device()
                .create_image_view(&create_info, None)
                .map_err(|e| vk_error("vkCreateImageView", e))?
        };

        Ok(Arc::new(VulkanImageResource {
            device: Arc::clone(&self.device),
            template: *template,
            image,
            view,
        }))
    }
}
