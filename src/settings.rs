//! Pipeline configuration (§6's settings table).

use std::f64::consts::PI;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::geom::GeomKernel;

/// Selects an input pre-transform. The transform itself is out of scope
/// for this crate (§1) and delegated to the host/collaborator; selecting
/// anything other than `None` here is accepted but has no built-in effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Preprocessor {
    None,
    Com,
    Pca,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Preprocessor::None
    }
}

/// Pipeline configuration. `T` is the coordinate [`crate::scalar::Scalar`]
/// so that the area/angle/shell thresholds are expressed in the caller's
/// own units.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Settings<T: GeomKernel> {
    pub preprocessor: Preprocessor,
    pub auto_holes_and_boundary: bool,
    pub restore_boundary: bool,
    pub refine_mesh: bool,
    pub validate_input: bool,
    pub sloan_max_iters: u32,
    pub concentric_shells_parameter: T,
    /// Compared against twice a triangle's area (§4.6's `area2Threshold`),
    /// not the area itself — a triangle is bad when `2*area > threshold`.
    pub refinement_threshold_area: T,
    pub refinement_threshold_angle: T,
    /// Routes every pushed error through `log::error!` (§7). Default off,
    /// matching "default off in library builds".
    pub verbose: bool,
    /// Checked at the top of the ConstraintApplier pass loop and the
    /// Refiner main loop (§5).
    #[cfg_attr(feature = "serde", serde(skip))]
    pub cancellation_flag: Option<Arc<AtomicBool>>,
}

impl<T: GeomKernel> Default for Settings<T> {
    fn default() -> Self {
        Settings {
            preprocessor: Preprocessor::None,
            auto_holes_and_boundary: false,
            restore_boundary: false,
            refine_mesh: false,
            validate_input: true,
            sloan_max_iters: 1_000_000,
            concentric_shells_parameter: T::from_f64(1e-3),
            refinement_threshold_area: T::from_f64(f64::INFINITY),
            refinement_threshold_angle: T::from_f64(PI / 6.0),
            verbose: false,
            cancellation_flag: None,
        }
    }
}

impl<T: GeomKernel> Settings<T> {
    pub fn is_cancelled(&self) -> bool {
        self.cancellation_flag
            .as_ref()
            .map(|flag| flag.load(std::sync::atomic::Ordering::Relaxed))
            .unwrap_or(false)
    }

    /// Angle thresholds above π/4 are rejected at validation (§4.6): Ruppert
    /// termination with concentric shells is only proven for ≲ 20.7°, and
    /// this crate refuses anything that can't even be a valid triangle
    /// minimum angle three times over.
    pub fn max_refinement_threshold_angle() -> f64 {
        PI / 4.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::<f64>::default();
        assert!(settings.validate_input);
        assert!(!settings.refine_mesh);
        assert_eq!(settings.sloan_max_iters, 1_000_000);
        assert!(!settings.is_cancelled());
    }

    #[test]
    fn test_cancellation_flag() {
        use std::sync::atomic::{AtomicBool, Ordering};
        let flag = Arc::new(AtomicBool::new(false));
        let mut settings = Settings::<f64>::default();
        settings.cancellation_flag = Some(flag.clone());
        assert!(!settings.is_cancelled());
        flag.store(true, Ordering::Relaxed);
        assert!(settings.is_cancelled());
    }
}
