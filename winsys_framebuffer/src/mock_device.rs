/// Mock presentation device for unit tests (no GPU required)
///
/// `MockDevice` implements `PresentDevice` on plain bookkeeping:
///
/// - every successful call is appended to a call log (`calls()`)
/// - live surfaces, swapchains, semaphores and fences are tracked so tests
///   can assert that teardown released everything exactly once
/// - failures can be injected per operation or at the k-th fallible call
/// - fences are signaled by acquire immediately (auto mode) or only when
///   the test calls `signal_*` (manual mode); in manual mode
///   `wait_for_fence` blocks on a `Condvar`
///
/// `MockResourceFactory` and `MockRenderContext` log into the same call log,
/// so the relative order of flushes, resource releases and platform calls
/// is observable.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::Duration;

use crate::config::PresentMode;
use crate::error::{Error, Result};
use crate::format::PixelFormat;
use crate::platform::{
    AcquireOutcome, ColorSpace, ContextFence, Extent2D, FenceHandle, ImageHandle, NativeFormat,
    PresentDevice, PresentOutcome, QueueFamilies, RenderContext, ResourceFactory,
    SemaphoreHandle, SurfaceCapabilities, SurfaceFormat, SurfaceHandle, SwapchainDesc,
    SwapchainHandle, WindowTarget,
};
use crate::resource::{RenderResource, ResourceTemplate};

// ============================================================================
// Call log
// ============================================================================

/// One recorded call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    CreateSurface(SurfaceHandle),
    DestroySurface(SurfaceHandle),
    SurfaceFormats,
    SurfacePresentModes,
    SurfaceCapabilities,
    SurfaceSupport(u32),
    CreateSwapchain { handle: SwapchainHandle, desc: SwapchainDesc },
    DestroySwapchain(SwapchainHandle),
    SwapchainImages(SwapchainHandle),
    CreateSemaphore(SemaphoreHandle),
    DestroySemaphore(SemaphoreHandle),
    CreateFence(FenceHandle),
    WaitForFence(FenceHandle),
    ResetFence(FenceHandle),
    DestroyFence(FenceHandle),
    AcquireNextImage {
        swapchain: SwapchainHandle,
        semaphore: SemaphoreHandle,
        fence: FenceHandle,
        index: u32,
    },
    QueuePresent {
        swapchain: SwapchainHandle,
        index: u32,
        wait_semaphore: SemaphoreHandle,
    },
    /// MockResourceFactory wrapped an image
    WrapImage(ImageHandle),
    /// A MockResource was dropped
    ReleaseResource(ImageHandle),
    /// MockRenderContext::flush
    ContextFlush,
    /// MockRenderContext::fence_finish
    ContextFenceFinish(ContextFence),
}

/// Fallible operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    CreateSurface,
    SurfaceFormats,
    SurfacePresentModes,
    SurfaceCapabilities,
    SurfaceSupport,
    CreateSwapchain,
    SwapchainImages,
    CreateSemaphore,
    CreateFence,
    WaitForFence,
    ResetFence,
    AcquireNextImage,
    QueuePresent,
    WrapImage,
}

// ============================================================================
// Mock Device
// ============================================================================

struct MockState {
    next_handle: u64,
    calls: Vec<MockCall>,

    // Configuration
    image_count: u32,
    present_supported: bool,
    manual_fences: bool,
    suboptimal: bool,
    families: QueueFamilies,
    surface_extent: Extent2D,

    // Live objects
    surfaces: HashSet<SurfaceHandle>,
    swapchains: HashMap<SwapchainHandle, Vec<ImageHandle>>,
    semaphores: HashSet<SemaphoreHandle>,
    /// fence -> signaled
    fences: HashMap<FenceHandle, bool>,
    /// Fences an acquire will signal, oldest first (manual mode)
    pending: VecDeque<FenceHandle>,
    next_image: HashMap<SwapchainHandle, u32>,

    // Statistics
    surfaces_created: usize,
    swapchains_created: usize,
    blocked_waiters: usize,
    violations: Vec<String>,

    // Failure injection
    fallible_calls: usize,
    fail_at_call: Option<usize>,
    failures: HashMap<MockOp, (usize, Error)>,
    op_counts: HashMap<MockOp, usize>,
}

pub struct MockDevice {
    state: Mutex<MockState>,
    fence_signaled: Condvar,
}

impl MockDevice {
    /// Device with 2 swapchain images, present support, automatic fences
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_handle: 0x1000,
                calls: Vec::new(),
                image_count: 2,
                present_supported: true,
                manual_fences: false,
                suboptimal: false,
                families: QueueFamilies { graphics: 0, present: 0 },
                surface_extent: Extent2D::new(800, 600),
                surfaces: HashSet::new(),
                swapchains: HashMap::new(),
                semaphores: HashSet::new(),
                fences: HashMap::new(),
                pending: VecDeque::new(),
                next_image: HashMap::new(),
                surfaces_created: 0,
                swapchains_created: 0,
                blocked_waiters: 0,
                violations: Vec::new(),
                fallible_calls: 0,
                fail_at_call: None,
                failures: HashMap::new(),
                op_counts: HashMap::new(),
            }),
            fence_signaled: Condvar::new(),
        }
    }

    // ===== BUILDERS =====

    pub fn with_image_count(mut self, count: u32) -> Self {
        self.state_mut().image_count = count;
        self
    }

    pub fn with_present_support(mut self, supported: bool) -> Self {
        self.state_mut().present_supported = supported;
        self
    }

    /// Fences are only signaled by `signal_*` calls
    pub fn with_manual_fences(mut self) -> Self {
        self.state_mut().manual_fences = true;
        self
    }

    pub fn with_queue_families(mut self, graphics: u32, present: u32) -> Self {
        self.state_mut().families = QueueFamilies { graphics, present };
        self
    }

    fn state_mut(&mut self) -> &mut MockState {
        self.state.get_mut().unwrap()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    // ===== CONFIGURATION AT RUNTIME =====

    /// Image count of swapchains created from now on
    pub fn set_image_count(&self, count: u32) {
        self.lock().image_count = count;
    }

    /// Report acquire and present results as suboptimal
    pub fn set_suboptimal(&self, suboptimal: bool) {
        self.lock().suboptimal = suboptimal;
    }

    /// The `nth` call (0-based, counted from device creation) of `op` fails with `error`
    pub fn fail_nth(&self, op: MockOp, nth: usize, error: Error) {
        self.lock().failures.insert(op, (nth, error));
    }

    /// The k-th fallible call (0-based, any operation) fails with a backend error
    pub fn fail_at_call(&self, k: usize) {
        self.lock().fail_at_call = Some(k);
    }

    // ===== FENCE CONTROL (manual mode) =====

    /// Signal the fence of the oldest acquire not yet signaled
    pub fn signal_oldest_pending(&self) -> Option<FenceHandle> {
        let mut state = self.lock();
        let fence = state.pending.pop_front()?;
        state.fences.insert(fence, true);
        drop(state);
        self.fence_signaled.notify_all();
        Some(fence)
    }

    /// Mark `fence` as owned by in-flight work, as if submitted with it
    pub fn submit_fence(&self, fence: FenceHandle) {
        self.lock().pending.push_back(fence);
    }

    pub fn signal_fence(&self, fence: FenceHandle) {
        let mut state = self.lock();
        state.pending.retain(|f| *f != fence);
        if let Some(signaled) = state.fences.get_mut(&fence) {
            *signaled = true;
        }
        drop(state);
        self.fence_signaled.notify_all();
    }

    pub fn signal_all(&self) {
        let mut state = self.lock();
        let pending: Vec<FenceHandle> = state.pending.drain(..).collect();
        for fence in pending {
            state.fences.insert(fence, true);
        }
        drop(state);
        self.fence_signaled.notify_all();
    }

    // ===== INSPECTION =====

    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Number of logged calls matching `pred`
    pub fn count_calls(&self, pred: impl Fn(&MockCall) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| pred(c)).count()
    }

    /// Descriptions passed to create_swapchain, in order
    pub fn swapchain_descs(&self) -> Vec<SwapchainDesc> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                MockCall::CreateSwapchain { desc, .. } => Some(desc.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn live_surfaces(&self) -> usize {
        self.lock().surfaces.len()
    }

    pub fn live_swapchains(&self) -> usize {
        self.lock().swapchains.len()
    }

    pub fn live_semaphores(&self) -> usize {
        self.lock().semaphores.len()
    }

    pub fn live_fences(&self) -> usize {
        self.lock().fences.len()
    }

    /// Surfaces + swapchains + semaphores + fences still alive
    pub fn live_objects(&self) -> usize {
        let state = self.lock();
        state.surfaces.len() + state.swapchains.len() + state.semaphores.len() + state.fences.len()
    }

    pub fn surfaces_created(&self) -> usize {
        self.lock().surfaces_created
    }

    pub fn swapchains_created(&self) -> usize {
        self.lock().swapchains_created
    }

    /// Threads currently blocked in wait_for_fence
    pub fn blocked_waiters(&self) -> usize {
        self.lock().blocked_waiters
    }

    /// Protocol violations seen (double destroy, unknown handles, ...)
    pub fn violations(&self) -> Vec<String> {
        self.lock().violations.clone()
    }

    /// Fallible calls made so far (successful or not)
    pub fn fallible_call_count(&self) -> usize {
        self.lock().fallible_calls
    }

    pub fn is_fence_signaled(&self, fence: FenceHandle) -> Option<bool> {
        self.lock().fences.get(&fence).copied()
    }

    pub(crate) fn record(&self, call: MockCall) {
        self.lock().calls.push(call);
    }

    pub(crate) fn check_op(&self, op: MockOp) -> Result<()> {
        check(&mut self.lock(), op)
    }
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new()
    }
}

fn check(state: &mut MockState, op: MockOp) -> Result<()> {
    let call = state.fallible_calls;
    state.fallible_calls += 1;
    if state.fail_at_call == Some(call) {
        state.fail_at_call = None;
        return Err(Error::Backend(format!("injected failure at call {} ({:?})", call, op)));
    }

    let count = state.op_counts.entry(op).or_insert(0);
    let nth = *count;
    *count += 1;
    if let Some((fail_at, _)) = state.failures.get(&op) {
        if *fail_at == nth {
            if let Some((_, error)) = state.failures.remove(&op) {
                return Err(error);
            }
        }
    }
    Ok(())
}

fn next_handle(state: &mut MockState) -> u64 {
    state.next_handle += 1;
    state.next_handle
}

impl PresentDevice for MockDevice {
    fn native_format(&self, format: PixelFormat) -> Option<NativeFormat> {
        match format {
            PixelFormat::D24_UNORM_S8_UINT => None,
            other => Some(NativeFormat(other as i32 + 1)),
        }
    }

    fn queue_families(&self) -> QueueFamilies {
        self.lock().families
    }

    fn create_surface(&self, _window: &WindowTarget) -> Result<SurfaceHandle> {
        let mut state = self.lock();
        check(&mut state, MockOp::CreateSurface)?;
        let surface = SurfaceHandle::from_raw(next_handle(&mut state));
        state.surfaces.insert(surface);
        state.surfaces_created += 1;
        state.calls.push(MockCall::CreateSurface(surface));
        Ok(surface)
    }

    fn destroy_surface(&self, surface: SurfaceHandle) {
        if surface.is_null() {
            return;
        }
        let mut state = self.lock();
        if !state.surfaces.remove(&surface) {
            state.violations.push(format!("destroy of unknown surface {:?}", surface));
        }
        if !state.swapchains.is_empty() {
            state.violations.push("surface destroyed before its swapchains".to_string());
        }
        state.calls.push(MockCall::DestroySurface(surface));
    }

    fn surface_formats(&self, _surface: SurfaceHandle) -> Result<Vec<SurfaceFormat>> {
        let mut state = self.lock();
        check(&mut state, MockOp::SurfaceFormats)?;
        state.calls.push(MockCall::SurfaceFormats);
        Ok(vec![
            SurfaceFormat {
                format: NativeFormat(PixelFormat::B8G8R8A8_UNORM as i32 + 1),
                color_space: ColorSpace::SrgbNonLinear,
            },
            SurfaceFormat {
                format: NativeFormat(PixelFormat::B8G8R8A8_SRGB as i32 + 1),
                color_space: ColorSpace::SrgbNonLinear,
            },
        ])
    }

    fn surface_present_modes(&self, _surface: SurfaceHandle) -> Result<Vec<PresentMode>> {
        let mut state = self.lock();
        check(&mut state, MockOp::SurfacePresentModes)?;
        state.calls.push(MockCall::SurfacePresentModes);
        Ok(vec![PresentMode::Fifo, PresentMode::Mailbox])
    }

    fn surface_capabilities(&self, _surface: SurfaceHandle) -> Result<SurfaceCapabilities> {
        let mut state = self.lock();
        check(&mut state, MockOp::SurfaceCapabilities)?;
        state.calls.push(MockCall::SurfaceCapabilities);
        Ok(SurfaceCapabilities {
            min_image_count: 1,
            max_image_count: 0,
            current_extent: state.surface_extent,
            min_image_extent: Extent2D::new(1, 1),
            max_image_extent: Extent2D::new(16384, 16384),
            current_transform: 1,
        })
    }

    fn surface_support(&self, queue_family: u32, _surface: SurfaceHandle) -> Result<bool> {
        let mut state = self.lock();
        check(&mut state, MockOp::SurfaceSupport)?;
        state.calls.push(MockCall::SurfaceSupport(queue_family));
        Ok(state.present_supported)
    }

    fn create_swapchain(&self, desc: &SwapchainDesc) -> Result<SwapchainHandle> {
        let mut state = self.lock();
        check(&mut state, MockOp::CreateSwapchain)?;
        if !state.surfaces.contains(&desc.surface) {
            state.violations.push("swapchain created on an unknown surface".to_string());
        }
        if !desc.old_swapchain.is_null() && !state.swapchains.contains_key(&desc.old_swapchain) {
            state.violations.push("old swapchain is not alive".to_string());
        }

        let handle = SwapchainHandle::from_raw(next_handle(&mut state));
        let images = (0..state.image_count)
            .map(|_| ImageHandle::from_raw(next_handle(&mut state)))
            .collect();
        state.swapchains.insert(handle, images);
        state.swapchains_created += 1;
        state.calls.push(MockCall::CreateSwapchain { handle, desc: desc.clone() });
        Ok(handle)
    }

    fn destroy_swapchain(&self, swapchain: SwapchainHandle) {
        if swapchain.is_null() {
            return;
        }
        let mut state = self.lock();
        if state.swapchains.remove(&swapchain).is_none() {
            state.violations.push(format!("destroy of unknown swapchain {:?}", swapchain));
        }
        state.calls.push(MockCall::DestroySwapchain(swapchain));
    }

    fn swapchain_images(&self, swapchain: SwapchainHandle) -> Result<Vec<ImageHandle>> {
        let mut state = self.lock();
        check(&mut state, MockOp::SwapchainImages)?;
        let images = match state.swapchains.get(&swapchain) {
            Some(images) => images.clone(),
            None => return Err(Error::Backend("unknown swapchain".to_string())),
        };
        state.calls.push(MockCall::SwapchainImages(swapchain));
        Ok(images)
    }

    fn create_semaphore(&self) -> Result<SemaphoreHandle> {
        let mut state = self.lock();
        check(&mut state, MockOp::CreateSemaphore)?;
        let semaphore = SemaphoreHandle::from_raw(next_handle(&mut state));
        state.semaphores.insert(semaphore);
        state.calls.push(MockCall::CreateSemaphore(semaphore));
        Ok(semaphore)
    }

    fn destroy_semaphore(&self, semaphore: SemaphoreHandle) {
        if semaphore.is_null() {
            return;
        }
        let mut state = self.lock();
        if !state.semaphores.remove(&semaphore) {
            state.violations.push(format!("destroy of unknown semaphore {:?}", semaphore));
        }
        state.calls.push(MockCall::DestroySemaphore(semaphore));
    }

    fn create_fence(&self, signaled: bool) -> Result<FenceHandle> {
        let mut state = self.lock();
        check(&mut state, MockOp::CreateFence)?;
        let fence = FenceHandle::from_raw(next_handle(&mut state));
        state.fences.insert(fence, signaled);
        state.calls.push(MockCall::CreateFence(fence));
        Ok(fence)
    }

    fn wait_for_fence(&self, fence: FenceHandle, timeout: u64) -> Result<()> {
        let mut state = self.lock();
        check(&mut state, MockOp::WaitForFence)?;

        loop {
            match state.fences.get(&fence) {
                None => return Err(Error::Backend(format!("wait on unknown fence {:?}", fence))),
                Some(true) => break,
                Some(false) => {}
            }
            if !state.pending.contains(&fence) {
                // Nothing will ever signal it
                state.violations.push(format!("wait on fence {:?} that nothing will signal", fence));
                return Err(Error::Backend("fence wait would never return".to_string()));
            }

            state.blocked_waiters += 1;
            if timeout == u64::MAX {
                state = self.fence_signaled.wait(state).unwrap();
                state.blocked_waiters -= 1;
            } else {
                let (guard, result) = self
                    .fence_signaled
                    .wait_timeout(state, Duration::from_nanos(timeout))
                    .unwrap();
                state = guard;
                state.blocked_waiters -= 1;
                if result.timed_out() && state.fences.get(&fence) == Some(&false) {
                    return Err(Error::Backend("fence wait timed out".to_string()));
                }
            }
        }

        state.calls.push(MockCall::WaitForFence(fence));
        Ok(())
    }

    fn reset_fence(&self, fence: FenceHandle) -> Result<()> {
        let mut state = self.lock();
        check(&mut state, MockOp::ResetFence)?;
        match state.fences.get_mut(&fence) {
            Some(signaled) => *signaled = false,
            None => return Err(Error::Backend(format!("reset of unknown fence {:?}", fence))),
        }
        state.calls.push(MockCall::ResetFence(fence));
        Ok(())
    }

    fn destroy_fence(&self, fence: FenceHandle) {
        if fence.is_null() {
            return;
        }
        let mut state = self.lock();
        if state.fences.remove(&fence).is_none() {
            state.violations.push(format!("destroy of unknown fence {:?}", fence));
        }
        state.pending.retain(|f| *f != fence);
        state.calls.push(MockCall::DestroyFence(fence));
    }

    fn acquire_next_image(
        &self,
        swapchain: SwapchainHandle,
        _timeout: u64,
        semaphore: SemaphoreHandle,
        fence: FenceHandle,
    ) -> Result<AcquireOutcome> {
        let mut state = self.lock();
        check(&mut state, MockOp::AcquireNextImage)?;

        let image_count = match state.swapchains.get(&swapchain) {
            Some(images) => images.len() as u32,
            None => return Err(Error::Backend("acquire on unknown swapchain".to_string())),
        };
        if !state.semaphores.contains(&semaphore) {
            state.violations.push("acquire with an unknown semaphore".to_string());
        }
        if state.fences.get(&fence) != Some(&false) {
            state.violations.push(format!("acquire with fence {:?} not reset", fence));
        }

        let index = {
            let next = state.next_image.entry(swapchain).or_insert(0);
            let index = *next % image_count;
            *next = index + 1;
            index
        };

        if state.manual_fences {
            state.pending.push_back(fence);
        } else {
            state.fences.insert(fence, true);
        }

        state.calls.push(MockCall::AcquireNextImage { swapchain, semaphore, fence, index });
        Ok(AcquireOutcome { index, suboptimal: state.suboptimal })
    }

    fn queue_present(
        &self,
        swapchain: SwapchainHandle,
        image_index: u32,
        wait_semaphore: SemaphoreHandle,
    ) -> Result<PresentOutcome> {
        let mut state = self.lock();
        check(&mut state, MockOp::QueuePresent)?;

        match state.swapchains.get(&swapchain) {
            Some(images) if (image_index as usize) < images.len() => {}
            _ => return Err(Error::Backend("present of an unknown image".to_string())),
        }
        if !state.semaphores.contains(&wait_semaphore) {
            state.violations.push("present waits on an unknown semaphore".to_string());
        }

        state.calls.push(MockCall::QueuePresent { swapchain, index: image_index, wait_semaphore });
        Ok(PresentOutcome { suboptimal: state.suboptimal })
    }
}

// ============================================================================
// Mock Resource Factory
// ============================================================================

pub struct MockResource {
    template: ResourceTemplate,
    image: ImageHandle,
    device: Arc<MockDevice>,
    live: Arc<AtomicUsize>,
}

impl RenderResource for MockResource {
    fn template(&self) -> &ResourceTemplate {
        &self.template
    }

    fn image(&self) -> ImageHandle {
        self.image
    }
}

impl Drop for MockResource {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        self.device.record(MockCall::ReleaseResource(self.image));
    }
}

/// Factory producing `MockResource`s; logs into the device's call log
pub struct MockResourceFactory {
    device: Arc<MockDevice>,
    created: AtomicUsize,
    live: Arc<AtomicUsize>,
    templates: Mutex<Vec<ResourceTemplate>>,
}

impl MockResourceFactory {
    pub fn new(device: Arc<MockDevice>) -> Self {
        Self {
            device,
            created: AtomicUsize::new(0),
            live: Arc::new(AtomicUsize::new(0)),
            templates: Mutex::new(Vec::new()),
        }
    }

    /// Resources created so far
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Resources not yet dropped
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Templates passed to resource_from_handle, in order
    pub fn templates(&self) -> Vec<ResourceTemplate> {
        self.templates.lock().unwrap().clone()
    }
}

impl ResourceFactory for MockResourceFactory {
    fn resource_from_handle(
        &self,
        template: &ResourceTemplate,
        image: ImageHandle,
    ) -> Result<Arc<dyn RenderResource>> {
        self.device.check_op(MockOp::WrapImage)?;

        self.created.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        self.templates.lock().unwrap().push(*template);
        self.device.record(MockCall::WrapImage(image));

        Ok(Arc::new(MockResource {
            template: *template,
            image,
            device: Arc::clone(&self.device),
            live: Arc::clone(&self.live),
        }))
    }
}

// ============================================================================
// Mock Render Context
// ============================================================================

/// Render context whose flush returns a fence (unless `without_fence`)
pub struct MockRenderContext {
    device: Arc<MockDevice>,
    returns_fence: bool,
    next_fence: u64,
    pub flushes: usize,
    pub finished: Vec<ContextFence>,
    pub fail_flush: bool,
}

impl MockRenderContext {
    pub fn new(device: Arc<MockDevice>) -> Self {
        Self {
            device,
            returns_fence: true,
            next_fence: 0,
            flushes: 0,
            finished: Vec::new(),
            fail_flush: false,
        }
    }

    /// Flush reports no submitted work
    pub fn without_fence(mut self) -> Self {
        self.returns_fence = false;
        self
    }
}

impl RenderContext for MockRenderContext {
    fn flush(&mut self) -> Result<Option<ContextFence>> {
        if self.fail_flush {
            return Err(Error::DeviceLost);
        }
        self.flushes += 1;
        self.device.record(MockCall::ContextFlush);
        if !self.returns_fence {
            return Ok(None);
        }
        self.next_fence += 1;
        Ok(Some(ContextFence(self.next_fence)))
    }

    fn fence_finish(&mut self, fence: ContextFence, _timeout: u64) -> Result<()> {
        self.finished.push(fence);
        self.device.record(MockCall::ContextFenceFinish(fence));
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Window target with dummy Win32 handles
pub fn mock_window() -> WindowTarget {
    use raw_window_handle::{
        RawDisplayHandle, RawWindowHandle, Win32WindowHandle, WindowsDisplayHandle,
    };
    use std::num::NonZeroIsize;

    let hwnd = NonZeroIsize::new(0x1234).unwrap();
    WindowTarget::new(
        RawWindowHandle::Win32(Win32WindowHandle::new(hwnd)),
        RawDisplayHandle::Windows(WindowsDisplayHandle::new()),
    )
}
