// Per-particle lifetime effects

use glam::Vec4;

use super::particle::Particle;
use crate::core::math::lerp;

/// Mutates a live particle once per frame.
///
/// `life_fraction` is the remaining share of the particle's lifespan: 1.0 at
/// spawn, 0.0 at death.
pub trait Effect {
    fn apply(&self, particle: &mut Particle, life_fraction: f32);
}

/// Interpolates colour from `start` at spawn to `end` at death
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColourFade {
    pub start: Vec4,
    pub end: Vec4,
}

impl ColourFade {
    pub fn new(start: Vec4, end: Vec4) -> Self {
        Self { start, end }
    }

    /// Fade the alpha of `colour` out over the lifetime
    pub fn fade_out(colour: Vec4) -> Self {
        Self {
            start: colour,
            end: colour.truncate().extend(0.0),
        }
    }
}

impl Effect for ColourFade {
    fn apply(&self, particle: &mut Particle, life_fraction: f32) {
        particle.colour = self.end.lerp(self.start, life_fraction);
    }
}

/// Interpolates size from `start` at spawn to `end` at death
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeFade {
    pub start: f32,
    pub end: f32,
}

impl SizeFade {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }
}

impl Effect for SizeFade {
    fn apply(&self, particle: &mut Particle, life_fraction: f32) {
        particle.size = lerp(self.end, self.start, life_fraction);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_colour_fade_endpoints() {
        let fade = ColourFade::new(Vec4::new(1.0, 0.0, 0.0, 1.0), Vec4::new(0.0, 0.0, 1.0, 0.0));
        let mut p = Particle::DEAD;

        fade.apply(&mut p, 1.0);
        assert_eq!(p.colour, fade.start);

        fade.apply(&mut p, 0.0);
        assert_eq!(p.colour, fade.end);

        fade.apply(&mut p, 0.25);
        assert_relative_eq!(p.colour.x, 0.25);
        assert_relative_eq!(p.colour.z, 0.75);
    }

    #[test]
    fn test_fade_out_keeps_rgb() {
        let fade = ColourFade::fade_out(Vec4::new(0.2, 0.4, 0.6, 0.8));
        assert_eq!(fade.end, Vec4::new(0.2, 0.4, 0.6, 0.0));
    }

    #[test]
    fn test_size_fade() {
        let shrink = SizeFade::new(2.0, 0.0);
        let mut p = Particle::DEAD;

        shrink.apply(&mut p, 0.5);
        assert_relative_eq!(p.size, 1.0);
    }
}
