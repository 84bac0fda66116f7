/// Initialization parameters for the GPU layer.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Prefer an sRGB surface format when available.
    ///
    /// Off by default: batch colors are 8-bit sRGB values written as-is, and an sRGB
    /// surface would encode them a second time.
    pub prefer_srgb: bool,

    /// FIFO is supported everywhere.
    pub present_mode: wgpu::PresentMode,

    /// Falls back to the first supported mode when unset or unsupported.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Backends the instance may pick from.
    pub backends: wgpu::Backends,

    pub power_preference: wgpu::PowerPreference,

    pub required_features: wgpu::Features,

    pub required_limits: wgpu::Limits,

    /// Hint; support depends on platform/backend.
    pub desired_maximum_frame_latency: u32,
}

impl GpuInit {
    /// Narrows `backends` from `WGPU_BACKEND` (e.g. `vulkan`, `gl`) when it is set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(backends) = wgpu::Backends::from_env() {
            log::info!("backends restricted by WGPU_BACKEND: {backends:?}");
            self.backends = backends;
        }
        self
    }
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: false,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

