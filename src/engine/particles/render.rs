// Renderer seam for particle drawing
//
// The kernel only packs floats. Uploading them to the GPU, binding textures
// and issuing draw calls belongs to whatever graphics backend implements
// `ParticleRenderer`.

/// Opaque id of a texture owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(u64);

impl TextureHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Per-instance attribute streams produced by a particle pool.
///
/// Every stream carries four floats per instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceStream {
    /// xyz = position, w = size
    PositionSize,

    /// rgba
    Colour,

    /// Atlas cell as top, left, bottom, right
    Uv,
}

impl InstanceStream {
    /// Floats per instance in every stream
    pub const COMPONENTS: usize = 4;
}

/// Backend that draws instanced particle quads
pub trait ParticleRenderer {
    /// Upload `data` (`COMPONENTS` floats per instance) as an instance stream
    fn upload_instances(&mut self, stream: InstanceStream, data: &[f32]);

    /// Bind the particle texture; `None` selects a flat blank texture
    fn bind_texture(&mut self, texture: Option<TextureHandle>);

    /// Issue a single instanced draw
    fn draw_instanced(&mut self, instance_count: usize);
}
