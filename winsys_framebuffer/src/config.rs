/// Framebuffer configuration

/// Upper bound of swapchain images and of frames in flight
///
/// Sizes the synchronization ring and the image table. Compile-time only.
pub const MAX_BUFFERS: usize = 8;

/// Unbounded timeout for fence waits and image acquisition
pub const TIMEOUT_INFINITE: u64 = u64::MAX;

/// Presentation mode requested at swapchain creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresentMode {
    Immediate,
    Mailbox,
    Fifo,
    FifoRelaxed,
}

/// Framebuffer configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Minimum number of swapchain images requested from the platform
    pub min_image_count: u32,
    /// Presentation mode
    pub present_mode: PresentMode,
    /// When true the frame counter is advanced before the slot is picked,
    /// so the first acquire lands on slot 1 instead of slot 0
    pub legacy_frame_offset: bool,
    /// Enable validation/debug layers (backends that support it)
    pub enable_validation: bool,
    /// Application name reported to the backend
    pub app_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_image_count: 2,
            present_mode: PresentMode::Fifo,
            legacy_frame_offset: false,
            enable_validation: cfg!(debug_assertions),
            app_name: "Winsys Framebuffer".to_string(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
