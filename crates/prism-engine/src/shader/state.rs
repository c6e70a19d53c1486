/// Stencil behavior of a pipeline. The reference value is set when the
/// program is bound.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StencilMode {
    /// Stencil neither tested nor written.
    Disabled,
    /// Always passes; writes `reference` wherever depth passes.
    Write { reference: u32 },
    /// Draws only where the stored value differs from `reference`; never writes.
    NotEqual { reference: u32 },
}

impl StencilMode {
    pub fn reference(self) -> u32 {
        match self {
            StencilMode::Disabled => 0,
            StencilMode::Write { reference } | StencilMode::NotEqual { reference } => reference,
        }
    }

    fn to_wgpu(self) -> wgpu::StencilState {
        let face = |compare, pass_op| wgpu::StencilFaceState {
            compare,
            fail_op: wgpu::StencilOperation::Keep,
            depth_fail_op: wgpu::StencilOperation::Keep,
            pass_op,
        };

        match self {
            StencilMode::Disabled => wgpu::StencilState::default(),
            StencilMode::Write { .. } => {
                let f = face(wgpu::CompareFunction::Always, wgpu::StencilOperation::Replace);
                wgpu::StencilState { front: f, back: f, read_mask: 0xff, write_mask: 0xff }
            }
            StencilMode::NotEqual { .. } => {
                let f = face(wgpu::CompareFunction::NotEqual, wgpu::StencilOperation::Keep);
                wgpu::StencilState { front: f, back: f, read_mask: 0xff, write_mask: 0x00 }
            }
        }
    }
}

/// Color blending of a pipeline.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BlendMode {
    Opaque,
    /// Straight alpha: `src * a + dst * (1 - a)`.
    Alpha,
}

impl BlendMode {
    pub(crate) fn to_wgpu(self) -> Option<wgpu::BlendState> {
        match self {
            BlendMode::Opaque => Some(wgpu::BlendState::REPLACE),
            BlendMode::Alpha => Some(wgpu::BlendState::ALPHA_BLENDING),
        }
    }
}

/// Fixed-function state baked into a shader's pipeline.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PipelineState {
    pub depth_test: bool,
    /// Ignored when `depth_test` is off; an untested fragment never writes depth.
    pub depth_write: bool,
    pub stencil: StencilMode,
    pub blend: BlendMode,
    pub cull_mode: Option<wgpu::Face>,
}

impl Default for PipelineState {
    fn default() -> Self {
        Self {
            depth_test: true,
            depth_write: true,
            stencil: StencilMode::Disabled,
            blend: BlendMode::Opaque,
            cull_mode: None,
        }
    }
}

impl PipelineState {
    pub fn with_stencil(mut self, stencil: StencilMode) -> Self {
        self.stencil = stencil;
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    pub fn without_depth_test(mut self) -> Self {
        self.depth_test = false;
        self
    }

    pub(crate) fn depth_stencil(&self, format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
        let stencil = if format.has_stencil_aspect() {
            self.stencil.to_wgpu()
        } else {
            wgpu::StencilState::default()
        };

        wgpu::DepthStencilState {
            format,
            depth_write_enabled: self.depth_test && self.depth_write,
            depth_compare: if self.depth_test {
                wgpu::CompareFunction::Less
            } else {
                wgpu::CompareFunction::Always
            },
            stencil,
            bias: wgpu::DepthBiasState::default(),
        }
    }
}
