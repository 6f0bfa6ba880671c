/// Presentable surface bound to a native window
///
/// Created on the first resize and kept for the framebuffer's lifetime.
/// The supported formats and present modes are queried once at creation and
/// cached for diagnostics.

use std::sync::Arc;

use crate::config::PresentMode;
use crate::error::Result;
use crate::platform::{
    PresentDevice, SurfaceCapabilities, SurfaceFormat, SurfaceHandle, WindowTarget,
};
use crate::{winsys_debug, winsys_trace};

pub struct SurfaceBinding {
    device: Arc<dyn PresentDevice>,
    handle: SurfaceHandle,
    formats: Vec<SurfaceFormat>,
    present_modes: Vec<PresentMode>,
}

impl SurfaceBinding {
    /// Create the surface for `window` and cache its formats and present modes
    pub fn new(device: Arc<dyn PresentDevice>, window: &WindowTarget) -> Result<Self> {
        let handle = device.create_surface(window)?;

        // From here on Drop releases the surface if a query fails
        let mut binding = Self {
            device,
            handle,
            formats: Vec::new(),
            present_modes: Vec::new(),
        };

        binding.formats = binding.device.surface_formats(handle)?;
        binding.present_modes = binding.device.surface_present_modes(handle)?;

        winsys_debug!("winsys::Surface", "Surface created: {} formats, present modes {:?}",
            binding.formats.len(), binding.present_modes);

        Ok(binding)
    }

    pub fn handle(&self) -> SurfaceHandle {
        self.handle
    }

    pub fn formats(&self) -> &[SurfaceFormat] {
        &self.formats
    }

    pub fn present_modes(&self) -> &[PresentMode] {
        &self.present_modes
    }

    pub fn capabilities(&self) -> Result<SurfaceCapabilities> {
        self.device.surface_capabilities(self.handle)
    }

    /// Whether `queue_family` can present to this surface
    pub fn supports_present(&self, queue_family: u32) -> Result<bool> {
        self.device.surface_support(queue_family, self.handle)
    }
}

impl Drop for SurfaceBinding {
    fn drop(&mut self) {
        if !self.handle.is_null() {
            self.device.destroy_surface(self.handle);
            winsys_trace!("winsys::Surface", "Surface destroyed");
        }
    }
}
