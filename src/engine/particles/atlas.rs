// Texture atlas used for animated particles

use glam::Vec2;

use super::render::TextureHandle;
use crate::engine::error::{SimError, SimResult};

/// A single frame within a texture atlas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasRegion {
    /// Top-left UV coordinate (0.0 to 1.0)
    pub uv_min: Vec2,

    /// Bottom-right UV coordinate (0.0 to 1.0)
    pub uv_max: Vec2,
}

impl AtlasRegion {
    /// The whole texture
    pub const FULL: Self = Self {
        uv_min: Vec2::ZERO,
        uv_max: Vec2::ONE,
    };

    /// Region for a cell of a `columns` x `rows` grid
    pub fn from_grid(column: u32, row: u32, columns: u32, rows: u32) -> Self {
        let cell = Vec2::new(1.0 / columns as f32, 1.0 / rows as f32);
        let uv_min = Vec2::new(column as f32, row as f32) * cell;
        Self {
            uv_min,
            uv_max: uv_min + cell,
        }
    }

    /// UV bounds packed as `[top, left, bottom, right]`
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.uv_min.y, self.uv_min.x, self.uv_max.y, self.uv_max.x]
    }
}

/// Grid texture atlas whose cells are played back as animation frames.
///
/// Frames are numbered row-major starting at the top-left cell.
#[derive(Debug, Clone)]
pub struct TextureAtlas {
    columns: u32,
    rows: u32,

    /// Texture bound when drawing (None = renderer's blank texture)
    texture: Option<TextureHandle>,

    /// All frames, precomputed
    regions: Vec<AtlasRegion>,
}

impl TextureAtlas {
    /// Create an atlas of `columns` x `rows` frames
    pub fn grid(columns: u32, rows: u32) -> SimResult<Self> {
        if columns == 0 || rows == 0 {
            return Err(SimError::InvalidAtlas { columns, rows });
        }

        let regions = (0..rows)
            .flat_map(|row| {
                (0..columns).map(move |column| AtlasRegion::from_grid(column, row, columns, rows))
            })
            .collect();

        Ok(Self {
            columns,
            rows,
            texture: None,
            regions,
        })
    }

    /// Attach the texture to bind when this atlas is drawn
    pub fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of animation frames
    pub fn frame_count(&self) -> usize {
        self.regions.len()
    }

    /// Region for a frame index, clamped to the last frame
    pub fn region(&self, index: usize) -> AtlasRegion {
        self.regions[index.min(self.regions.len() - 1)]
    }

    /// Get all regions
    pub fn regions(&self) -> &[AtlasRegion] {
        &self.regions
    }

    /// Frame for a particle of the given age.
    ///
    /// Maps elapsed time linearly onto the frames:
    /// `floor(frames / lifespan * (lifespan - life))`, clamped to the valid
    /// range.
    pub fn frame_for_age(&self, lifespan: f32, life: f32) -> usize {
        let frames = self.frame_count();
        let frame = (frames as f32 / lifespan * (lifespan - life)).floor();
        if frame <= 0.0 {
            0
        } else {
            (frame as usize).min(frames - 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atlas_region_uv() {
        let region = AtlasRegion::from_grid(1, 2, 4, 4);

        assert_eq!(region.uv_min, Vec2::new(0.25, 0.5));
        assert_eq!(region.uv_max, Vec2::new(0.5, 0.75));
        assert_eq!(region.to_tlbr(), [0.5, 0.25, 0.75, 0.5]);
    }

    #[test]
    fn test_atlas_grid_row_major() {
        let atlas = TextureAtlas::grid(2, 3).unwrap();

        assert_eq!(atlas.frame_count(), 6);
        assert_eq!(atlas.region(1).uv_min, Vec2::new(0.5, 0.0));
        assert_eq!(atlas.region(2).uv_min.x, 0.0);
        assert!(atlas.region(2).uv_min.y > 0.3);
        // Out of range clamps to the last frame
        assert_eq!(atlas.region(99), atlas.region(5));
    }

    #[test]
    fn test_atlas_rejects_empty_grid() {
        assert_eq!(
            TextureAtlas::grid(0, 4).unwrap_err(),
            SimError::InvalidAtlas {
                columns: 0,
                rows: 4
            }
        );
    }

    #[test]
    fn test_frame_for_age() {
        let atlas = TextureAtlas::grid(4, 1).unwrap();

        // lifespan 2s, 4 frames -> one frame every 0.5s of age
        assert_eq!(atlas.frame_for_age(2.0, 2.0), 0);
        assert_eq!(atlas.frame_for_age(2.0, 1.6), 0);
        assert_eq!(atlas.frame_for_age(2.0, 1.4), 1);
        assert_eq!(atlas.frame_for_age(2.0, 0.9), 2);
        assert_eq!(atlas.frame_for_age(2.0, 0.0), 3);
        // Life beyond the lifespan stays on the first frame
        assert_eq!(atlas.frame_for_age(2.0, 3.0), 0);
    }

    #[test]
    fn test_texture_handle() {
        let atlas = TextureAtlas::grid(1, 1).unwrap();
        assert_eq!(atlas.texture(), None);

        let atlas = atlas.with_texture(TextureHandle::new(7));
        assert_eq!(atlas.texture(), Some(TextureHandle::new(7)));
    }
}
