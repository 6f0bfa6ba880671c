/// VulkanDevice - Vulkan implementation of the PresentDevice trait
///
/// Owns the Vulkan instance, the logical device, the graphics and present
/// queues and the surface/swapchain extension loaders. Surfaces, swapchains,
/// semaphores and fences are created on behalf of the framebuffer and
/// destroyed by it; the device only destroys itself.

use ash::vk;
use ash::vk::Handle;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::ffi::CStr;
use std::sync::{Mutex, MutexGuard, PoisonError};
use winsys_framebuffer::winsys::{
    AcquireOutcome, Config, FenceHandle, ImageHandle, NativeFormat, PixelFormat, PresentDevice,
    PresentMode, PresentOutcome, QueueFamilies, Result, SemaphoreHandle, SurfaceCapabilities,
    SurfaceFormat, SurfaceHandle, SwapchainDesc, SwapchainHandle, WindowTarget,
};
use winsys_framebuffer::{winsys_debug, winsys_err, winsys_info, winsys_warn};

use crate::vulkan_format::{
    color_space_to_vk, composite_alpha_to_vk, format_to_vk, native_to_vk, present_mode_to_vk,
    usage_to_vk, vk_error, vk_to_capabilities, vk_to_native, vk_to_present_mode,
    vk_to_surface_format, SOURCE,
};

const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Vulkan device implementing the presentation capabilities
pub struct VulkanDevice {
    entry: ash::Entry,
    instance: ash::Instance,
    physical_device: vk::PhysicalDevice,
    device: ash::Device,

    graphics_queue: vk::Queue,
    present_queue: vk::Queue,
    families: QueueFamilies,
    /// Serializes every submission and present (queues are externally synchronized)
    queue_lock: Mutex<()>,

    surface_loader: ash::khr::surface::Instance,
    swapchain_loader: ash::khr::swapchain::Device,

    /// Debug utils loader and messenger (if validation enabled)
    debug_messenger: Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,
}

/// Physical device plus the queue families chosen on it
struct DeviceSelection {
    physical_device: vk::PhysicalDevice,
    families: QueueFamilies,
}

impl VulkanDevice {
    /// Create a device able to present to `window`
    ///
    /// The window is only used to pick the instance extensions and a queue
    /// family that can present to it; no surface is kept.
    pub fn new<W: HasDisplayHandle + HasWindowHandle + ?Sized>(
        window: &W,
        config: &Config,
    ) -> Result<Self> {
        let target = WindowTarget::from_window(window)?;
        Self::from_target(&target, config)
    }

    /// Same as `new()`, from already captured raw handles
    pub fn from_target(window: &WindowTarget, config: &Config) -> Result<Self> {
        unsafe {
            let entry = ash::Entry::load()
                .map_err(|e| winsys_err!(SOURCE, "Failed to load Vulkan library: {:?}", e))?;

            let validation = cfg!(feature = "vulkan-validation")
                && config.enable_validation
                && Self::validation_layer_available(&entry);

            let app_name = std::ffi::CString::new(config.app_name.as_str())
                .unwrap_or_else(|_| c"Winsys Framebuffer".to_owned());
            let app_info = vk::ApplicationInfo::default()
                .application_name(&app_name)
                .application_version(vk::make_api_version(0, 1, 0, 0))
                .engine_name(c"winsys")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_1);

            let mut extension_names = ash_window::enumerate_required_extensions(window.display)
                .map_err(|e| winsys_err!(SOURCE, "Failed to get required extensions: {:?}", e))?
                .to_vec();
            if validation {
                extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
            }

            let layer_names = if validation {
                vec![VALIDATION_LAYER.as_ptr()]
            } else {
                vec![]
            };

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);

            let instance = entry
                .create_instance(&create_info, None)
                .map_err(|e| vk_error("vkCreateInstance", e))?;

            let debug_messenger = if validation {
                match Self::create_debug_messenger(&entry, &instance) {
                    Ok(messenger) => Some(messenger),
                    Err(e) => {
                        instance.destroy_instance(None);
                        return Err(e);
                    }
                }
            } else {
                None
            };

            let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);

            let logical = Self::select_physical_device(&entry, &instance, &surface_loader, window)
                .and_then(|selection| {
                    Self::create_logical_device(&instance, &selection).map(|device| (selection, device))
                });
            let (selection, device) = match logical {
                Ok(result) => result,
                Err(e) => {
                    Self::destroy_debug_messenger(&debug_messenger);
                    instance.destroy_instance(None);
                    return Err(e);
                }
            };

            let graphics_queue = device.get_device_queue(selection.families.graphics, 0);
            let present_queue = device.get_device_queue(selection.families.present, 0);
            let swapchain_loader = ash::khr::swapchain::Device::new(&instance, &device);

            winsys_info!(SOURCE, "Vulkan device ready: graphics family {}, present family {}, validation {}",
                selection.families.graphics, selection.families.present, validation);

            Ok(Self {
                entry,
                instance,
                physical_device: selection.physical_device,
                device,
                graphics_queue,
                present_queue,
                families: selection.families,
                queue_lock: Mutex::new(()),
                surface_loader,
                swapchain_loader,
                debug_messenger,
            })
        }
    }

    unsafe fn validation_layer_available(entry: &ash::Entry) -> bool {
        let available = entry
            .enumerate_instance_layer_properties()
            .map(|layers| {
                layers
                    .iter()
                    .any(|layer| layer.layer_name_as_c_str().map_or(false, |name| name == VALIDATION_LAYER))
            })
            .unwrap_or(false);
        if !available {
            winsys_warn!(SOURCE, "Validation requested but {:?} is not installed", VALIDATION_LAYER);
        }
        available
    }

    unsafe fn create_debug_messenger(
        entry: &ash::Entry,
        instance: &ash::Instance,
    ) -> Result<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)> {
        let debug_utils = ash::ext::debug_utils::Instance::new(entry, instance);

        crate::debug::init_debug_config();

        let debug_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(
                vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                    | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(crate::debug::vulkan_debug_callback));

        let messenger = debug_utils
            .create_debug_utils_messenger(&debug_info, None)
            .map_err(|e| {
                crate::debug::cleanup_debug_config();
                vk_error("vkCreateDebugUtilsMessengerEXT", e)
            })?;

        Ok((debug_utils, messenger))
    }

    unsafe fn destroy_debug_messenger(
        messenger: &Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,
    ) {
        if let Some((debug_utils, messenger)) = messenger {
            crate::debug::cleanup_debug_config();
            debug_utils.destroy_debug_utils_messenger(*messenger, None);
        }
    }

    /// First physical device with a graphics family and a family presenting to `window`
    unsafe fn select_physical_device(
        entry: &ash::Entry,
        instance: &ash::Instance,
        surface_loader: &ash::khr::surface::Instance,
        window: &WindowTarget,
    ) -> Result<DeviceSelection> {
        // Temporary surface for queue selection
        let surface = ash_window::create_surface(entry, instance, window.display, window.window, None)
            .map_err(|e| vk_error("vkCreateSurfaceKHR", e))?;

        let physical_devices = instance
            .enumerate_physical_devices()
            .map_err(|e| vk_error("vkEnumeratePhysicalDevices", e));

        let selection = physical_devices.and_then(|devices| {
            devices
                .into_iter()
                .find_map(|physical_device| {
                    Self::find_queue_families(instance, surface_loader, physical_device, surface)
                        .map(|families| DeviceSelection { physical_device, families })
                })
                .ok_or_else(|| winsys_err!(@Unsupported SOURCE, "No Vulkan device can present to this window"))
        });

        surface_loader.destroy_surface(surface, None);
        selection
    }

    unsafe fn find_queue_families(
        instance: &ash::Instance,
        surface_loader: &ash::khr::surface::Instance,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> Option<QueueFamilies> {
        let queue_families = instance.get_physical_device_queue_family_properties(physical_device);

        let graphics = queue_families
            .iter()
            .position(|qf| qf.queue_flags.contains(vk::QueueFlags::GRAPHICS))? as u32;

        let can_present = |family: u32| {
            surface_loader
                .get_physical_device_surface_support(physical_device, family, surface)
                .unwrap_or(false)
        };

        // Prefer presenting from the graphics family
        let present = if can_present(graphics) {
            graphics
        } else {
            (0..queue_families.len() as u32).find(|&family| can_present(family))?
        };

        Some(QueueFamilies { graphics, present })
    }

    unsafe fn create_logical_device(
        instance: &ash::Instance,
        selection: &DeviceSelection,
    ) -> Result<ash::Device> {
        let queue_priorities = [1.0];
        let queue_create_infos: Vec<vk::DeviceQueueCreateInfo> = selection
            .families
            .sharing_indices()
            .into_iter()
            .map(|family| {
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(family)
                    .queue_priorities(&queue_priorities)
            })
            .collect();

        let device_extension_names = [ash::khr::swapchain::NAME.as_ptr()];

        let device_create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&device_extension_names);

        instance
            .create_device(selection.physical_device, &device_create_info, None)
            .map_err(|e| vk_error("vkCreateDevice", e))
    }

    /// Lock guarding queue submission and presentation
    fn lock_queues(&self) -> MutexGuard<'_, ()> {
        self.queue_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Submit an empty batch on the graphics queue signaling `fence`
    ///
    /// The fence signals once all previously submitted work has completed.
    pub(crate) fn submit_fence(&self, fence: vk::Fence) -> Result<()> {
        let _queues = self.lock_queues();
        unsafe {
            self.device
                .queue_submit(self.graphics_queue, &[], fence)
                .map_err(|e| vk_error("vkQueueSubmit", e))
        }
    }

    /// Logical device, for backends rendering into the wrapped images
    pub fn device(&self) -> &ash::Device {
        &self.device
    }

    pub fn instance(&self) -> &ash::Instance {
        &self.instance
    }

    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    pub fn graphics_queue(&self) -> vk::Queue {
        self.graphics_queue
    }

    /// Block until the device is idle
    pub fn wait_idle(&self) -> Result<()> {
        let _queues = self.lock_queues();
        unsafe {
            self.device
                .device_wait_idle()
                .map_err(|e| vk_error("vkDeviceWaitIdle", e))
        }
    }
}

fn surface_of(surface: SurfaceHandle) -> vk::SurfaceKHR {
    vk::SurfaceKHR::from_raw(surface.as_raw())
}

fn swapchain_of(swapchain: SwapchainHandle) -> vk::SwapchainKHR {
    vk::SwapchainKHR::from_raw(swapchain.as_raw())
}

fn semaphore_of(semaphore: SemaphoreHandle) -> vk::Semaphore {
    vk::Semaphore::from_raw(semaphore.as_raw())
}

fn fence_of(fence: FenceHandle) -> vk::Fence {
    vk::Fence::from_raw(fence.as_raw())
}

impl PresentDevice for VulkanDevice {
    fn native_format(&self, format: PixelFormat) -> Option<NativeFormat> {
        format_to_vk(format).map(vk_to_native)
    }

    fn queue_families(&self) -> QueueFamilies {
        self.families
    }

    fn create_surface(&self, window: &WindowTarget) -> Result<SurfaceHandle> {
        let surface = unsafe {
            ash_window::create_surface(&self.entry, &self.instance, window.display, window.window, None)
                .map_err(|e| vk_error("vkCreateSurfaceKHR", e))?
        };
        Ok(SurfaceHandle::from_raw(surface.as_raw()))
    }

    fn destroy_surface(&self, surface: SurfaceHandle) {
        if surface.is_null() {
            return;
        }
        unsafe {
            self.surface_loader.destroy_surface(surface_of(surface), None);
        }
    }

    fn surface_formats(&self, surface: SurfaceHandle) -> Result<Vec<SurfaceFormat>> {
        let formats = unsafe {
            self.surface_loader
                .get_physical_device_surface_formats(self.physical_device, surface_of(surface))
                .map_err(|e| vk_error("vkGetPhysicalDeviceSurfaceFormatsKHR", e))?
        };
        Ok(formats.iter().map(vk_to_surface_format).collect())
    }

    fn surface_present_modes(&self, surface: SurfaceHandle) -> Result<Vec<PresentMode>> {
        let modes = unsafe {
            self.surface_loader
                .get_physical_device_surface_present_modes(self.physical_device, surface_of(surface))
                .map_err(|e| vk_error("vkGetPhysicalDeviceSurfacePresentModesKHR", e))?
        };
        Ok(modes.into_iter().filter_map(vk_to_present_mode).collect())
    }

    fn surface_capabilities(&self, surface: SurfaceHandle) -> Result<SurfaceCapabilities> {
        let caps = unsafe {
            self.surface_loader
                .get_physical_device_surface_capabilities(self.physical_device, surface_of(surface))
                .map_err(|e| vk_error("vkGetPhysicalDeviceSurfaceCapabilitiesKHR", e))?
        };
        Ok(vk_to_capabilities(&caps))
    }

    fn surface_support(&self, queue_family: u32, surface: SurfaceHandle) -> Result<bool> {
        unsafe {
            self.surface_loader
                .get_physical_device_surface_support(self.physical_device, queue_family, surface_of(surface))
                .map_err(|e| vk_error("vkGetPhysicalDeviceSurfaceSupportKHR", e))
        }
    }

    fn create_swapchain(&self, desc: &SwapchainDesc) -> Result<SwapchainHandle> {
        // Several families can only share images concurrently
        let sharing_mode = if desc.queue_family_indices.len() > 1 {
            vk::SharingMode::CONCURRENT
        } else {
            vk::SharingMode::EXCLUSIVE
        };

        let mut create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(surface_of(desc.surface))
            .min_image_count(desc.min_image_count)
            .image_format(native_to_vk(desc.format))
            .image_color_space(color_space_to_vk(desc.color_space))
            .image_extent(vk::Extent2D {
                width: desc.extent.width,
                height: desc.extent.height,
            })
            .image_array_layers(desc.array_layers)
            .image_usage(usage_to_vk(desc.usage))
            .image_sharing_mode(sharing_mode)
            .pre_transform(vk::SurfaceTransformFlagsKHR::from_raw(desc.pre_transform))
            .composite_alpha(composite_alpha_to_vk(desc.composite_alpha))
            .present_mode(present_mode_to_vk(desc.present_mode))
            .clipped(desc.clipped)
            .old_swapchain(swapchain_of(desc.old_swapchain));
        if sharing_mode == vk::SharingMode::CONCURRENT {
            create_info = create_info.queue_family_indices(&desc.queue_family_indices);
        }

        let swapchain = unsafe {
            self.swapchain_loader
                .create_swapchain(&create_info, None)
                .map_err(|e| vk_error("vkCreateSwapchainKHR", e))?
        };
        Ok(SwapchainHandle::from_raw(swapchain.as_raw()))
    }

    fn destroy_swapchain(&self, swapchain: SwapchainHandle) {
        if swapchain.is_null() {
            return;
        }
        unsafe {
            self.swapchain_loader.destroy_swapchain(swapchain_of(swapchain), None);
        }
    }

    fn swapchain_images(&self, swapchain: SwapchainHandle) -> Result<Vec<ImageHandle>> {
        let images = unsafe {
            self.swapchain_loader
                .get_swapchain_images(swapchain_of(swapchain))
                .map_err(|e| vk_error("vkGetSwapchainImagesKHR", e))?
        };
        Ok(images.into_iter().map(|image| ImageHandle::from_raw(image.as_raw())).collect())
    }

    fn create_semaphore(&self) -> Result<SemaphoreHandle> {
        let semaphore = unsafe {
            self.device
                .create_semaphore(&vk::SemaphoreCreateInfo::default(), None)
                .map_err(|e| vk_error("vkCreateSemaphore", e))?
        };
        Ok(SemaphoreHandle::from_raw(semaphore.as_raw()))
    }

    fn destroy_semaphore(&self, semaphore: SemaphoreHandle) {
        if semaphore.is_null() {
            return;
        }
        unsafe {
            self.device.destroy_semaphore(semaphore_of(semaphore), None);
        }
    }

    fn create_fence(&self, signaled: bool) -> Result<FenceHandle> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };
        let fence = unsafe {
            self.device
                .create_fence(&vk::FenceCreateInfo::default().flags(flags), None)
                .map_err(|e| vk_error("vkCreateFence", e))?
        };
        Ok(FenceHandle::from_raw(fence.as_raw()))
    }

    fn wait_for_fence(&self, fence: FenceHandle, timeout: u64) -> Result<()> {
        unsafe {
            self.device
                .wait_for_fences(&[fence_of(fence)], true, timeout)
                .map_err(|e| vk_error("vkWaitForFences", e))
        }
    }

    fn reset_fence(&self, fence: FenceHandle) -> Result<()> {
        unsafe {
            self.device
                .reset_fences(&[fence_of(fence)])
                .map_err(|e| vk_error("vkResetFences", e))
        }
    }

    fn destroy_fence(&self, fence: FenceHandle) {
        if fence.is_null() {
            return;
        }
        unsafe {
            self.device.destroy_fence(fence_of(fence), None);
        }
    }

    fn acquire_next_image(
        &self,
        swapchain: SwapchainHandle,
        timeout: u64,
        semaphore: SemaphoreHandle,
        fence: FenceHandle,
    ) -> Result<AcquireOutcome> {
        let (index, suboptimal) = unsafe {
            self.swapchain_loader
                .acquire_next_image(swapchain_of(swapchain), timeout, semaphore_of(semaphore), fence_of(fence))
                .map_err(|e| vk_error("vkAcquireNextImageKHR", e))?
        };
        if suboptimal {
            winsys_debug!(SOURCE, "Acquired image {} from a suboptimal swapchain", index);
        }
        Ok(AcquireOutcome { index, suboptimal })
    }

    fn queue_present(
        &self,
        swapchain: SwapchainHandle,
        image_index: u32,
        wait_semaphore: SemaphoreHandle,
    ) -> Result<PresentOutcome> {
        let swapchains = [swapchain_of(swapchain)];
        let image_indices = [image_index];
        let wait_semaphores = [semaphore_of(wait_semaphore)];

        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let _queues = self.lock_queues();
        let suboptimal = unsafe {
            self.swapchain_loader
                .queue_present(self.present_queue, &present_info)
                .map_err(|e| vk_error("vkQueuePresentKHR", e))?
        };
        if suboptimal {
            winsys_debug!(SOURCE, "Presented image {} to a suboptimal swapchain", image_index);
        }
        Ok(PresentOutcome { suboptimal })
    }
}

impl Drop for VulkanDevice {
    fn drop(&mut self) {
        unsafe {
            if let Err(e) = self.device.device_wait_idle() {
                winsys_warn!(SOURCE, "vkDeviceWaitIdle failed during teardown: {:?}", e);
            }

            self.device.destroy_device(None);

            // Messenger goes before the instance, callbacks stop first
            Self::destroy_debug_messenger(&self.debug_messenger);

            self.instance.destroy_instance(None);
        }
        winsys_debug!(SOURCE, "Vulkan device destroyed");
    }
}

