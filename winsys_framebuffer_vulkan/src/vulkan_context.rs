/// VulkanRenderContext - drains the graphics queue for the framebuffer
///
/// The framebuffer flushes its render context before swapchain images are
/// released. Here a flush is an empty submission on the graphics queue
/// signaling a fresh fence: once it signals, everything submitted before it
/// has completed.

use ash::vk;
use ash::vk::Handle;
use std::sync::Arc;
use winsys_framebuffer::winsys::{ContextFence, RenderContext, Result, TIMEOUT_INFINITE};
use winsys_framebuffer::{winsys_bail, winsys_trace, winsys_warn};

use crate::vulkan_device::VulkanDevice;
use crate::vulkan_format::{vk_error, SOURCE};

pub struct VulkanRenderContext {
    device: Arc<VulkanDevice>,
    /// Flush fences not yet finished
    pending: Vec<vk::Fence>,
}

impl VulkanRenderContext {
    pub fn new(device: Arc<VulkanDevice>) -> Self {
        Self {
            device,
            pending: Vec::new(),
        }
    }

    pub fn device(&self) -> &Arc<VulkanDevice> {
        &self.device
    }

    /// Flush fences returned and not yet passed to `fence_finish()`
    pub fn pending_fences(&self) -> usize {
        self.pending.len()
    }
}

impl RenderContext for VulkanRenderContext {
    fn flush(&mut self) -> Result<Option<ContextFence>> {
        let device = self.device.device();
        let fence = unsafe {
            device
                .create_fence(&vk::FenceCreateInfo::default(), None)
                .map_err(|e| vk_error("vkCreateFence", e))?
        };

        if let Err(e) = self.device.submit_fence(fence) {
            unsafe {
                device.destroy_fence(fence, None);
            }
            return Err(e);
        }

        self.pending.push(fence);
        winsys_trace!(SOURCE, "Flush fence {:#x} submitted", fence.as_raw());
        Ok(Some(ContextFence(fence.as_raw())))
    }

    fn fence_finish(&mut self, fence: ContextFence, timeout: u64) -> Result<()> {
        let fence = vk::Fence::from_raw(fence.0);
        let Some(position) = self.pending.iter().position(|&pending| pending == fence) else {
            winsys_bail!(@InvalidArgument SOURCE, "Fence {:#x} was not returned by this context", fence.as_raw());
        };

        // On timeout the fence stays pending and is reclaimed on drop
        unsafe {
            self.device
                .device()
                .wait_for_fences(&[fence], true, timeout)
                .map_err(|e| vk_error("vkWaitForFences", e))?;
            self.device.device().destroy_fence(fence, None);
        }
        self.pending.swap_remove(position);
        Ok(())
    }
}

impl Drop for VulkanRenderContext {
    fn drop(&mut self) {
        let device = self.device.device();
        for fence in self.pending.drain(..) {
            unsafe {
                if let Err(e) = device.wait_for_fences(&[fence], true, TIMEOUT_INFINITE) {
                    winsys_warn!(SOURCE, "Flush fence wait failed during teardown: {:?}", e);
                }
                device.destroy_fence(fence, None);
            }
        }
    }
}
