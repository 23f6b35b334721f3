// Configuration errors for the simulation kernel
//
// Only construction and configuration can fail. Per-frame updates operate on
// already validated data and never return errors.

/// Simulation configuration errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    #[error("Particle pool capacity must be at least 1")]
    InvalidCapacity,

    #[error("Invalid body mass: {0} (must be greater than zero)")]
    InvalidMass(f32),

    #[error("Invalid restitution: {0} (must be within 0.0..=1.0)")]
    InvalidRestitution(f32),

    #[error("Invalid spawn rate: {0} particles/sec")]
    InvalidSpawnRate(f32),

    #[error("Invalid particle lifespan: {0} seconds")]
    InvalidLifespan(f32),

    #[error("Invalid collider size: {0}")]
    InvalidColliderSize(f32),

    #[error("Invalid texture atlas grid: {columns}x{rows}")]
    InvalidAtlas { columns: u32, rows: u32 },
}

/// Convenience result alias for fallible configuration calls
pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_error_display() {
        let err = SimError::InvalidMass(-2.0);
        assert_eq!(
            err.to_string(),
            "Invalid body mass: -2 (must be greater than zero)"
        );

        let err = SimError::InvalidAtlas {
            columns: 0,
            rows: 4,
        };
        assert_eq!(err.to_string(), "Invalid texture atlas grid: 0x4");
    }
}
