//! Freestream conditions.

use crate::units::{Angle, Velocity, deg, mps};
use crate::{BfError, BfResult, Real, Vec3, ensure_finite};

/// Onset flow seen by the body.
///
/// `alpha` is the angle of attack and `beta` the sideslip. The body frame has
/// x pointing forward (towards the nose), so the air moves along -x for zero
/// angles:
///
/// `V∞ = (−U cosβ cosα, −U sinβ cosα, U sinα)`
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlowConditions {
    pub speed: Velocity,
    pub alpha: Angle,
    pub beta: Angle,
}

impl FlowConditions {
    pub fn new(speed: Velocity, alpha: Angle, beta: Angle) -> Self {
        Self { speed, alpha, beta }
    }

    /// Convenience constructor from plain numbers (m/s and degrees).
    pub fn from_degrees(speed_mps: Real, alpha_deg: Real, beta_deg: Real) -> Self {
        Self::new(mps(speed_mps), deg(alpha_deg), deg(beta_deg))
    }

    /// Freestream speed in m/s.
    pub fn speed_mps(&self) -> Real {
        self.speed.value
    }

    pub fn validate(&self) -> BfResult<()> {
        let u = ensure_finite(self.speed.value, "freestream speed")?;
        if u <= 0.0 {
            return Err(BfError::InvalidArg {
                what: "freestream speed must be positive",
            });
        }
        ensure_finite(self.alpha.value, "angle of attack")?;
        ensure_finite(self.beta.value, "sideslip angle")?;
        Ok(())
    }

    /// Freestream velocity vector in the body frame.
    pub fn freestream(&self) -> Vec3 {
        let u = self.speed.value;
        let (sa, ca) = self.alpha.value.sin_cos();
        let (sb, cb) = self.beta.value.sin_cos();
        Vec3::new(-u * cb * ca, -u * sb * ca, u * sa)
    }
}
