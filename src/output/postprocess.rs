//! Derived quantities from simulation results
//!
//! All functions are pure: they read a [`SimulationResult`] (or plain arrays)
//! and return new arrays. Two quantities are floored to stay finite:
//!
//! - OIT is zero everywhere when the antioxidant reference is `≤ 1e-12`,
//!   and negative antioxidant excursions count as zero.
//! - The inverse molar mass is kept `≥ 1e-6`, so `Mw ≤ 1e6`.
//!
//! Flooring never fails; the number of affected entries is logged at `warn`.

use std::str::FromStr;

use log::warn;
use ndarray::{Array, Array1, Array2, ArrayBase, ArrayView1, Axis, Data, Dimension, Zip};

use crate::error::DegradationError;
use crate::models::SimulationResult;
use crate::physics::Species;
use crate::solver::Face;

/// Antioxidant reference below which OIT is reported as zero
pub const OIT_REFERENCE_FLOOR: f64 = 1e-12;

/// Floor on `1/Mw` (mol/kg)
pub const INVERSE_MOLAR_MASS_FLOOR: f64 = 1e-6;

// =================================================================================================
// Oxidation induction time
// =================================================================================================

/// OIT proportional to the local antioxidant concentration
///
/// ```text
/// OIT = OIT₀ · max(0, AH) / AH_ref
/// ```
///
/// # Example
///
/// ```rust
/// use degrad_rs::output::calculate_oit;
/// use ndarray::array;
///
/// let oit = calculate_oit(&array![1.8e-3, 0.9e-3, -1e-9], 1.8e-3, 200.0);
/// assert_eq!(oit, array![200.0, 100.0, 0.0]);
/// ```
pub fn calculate_oit<S, D>(antioxidant: &ArrayBase<S, D>, reference: f64, initial_oit: f64) -> Array<f64, D>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    if reference <= OIT_REFERENCE_FLOOR {
        warn!("antioxidant reference {reference:e} below floor, OIT reported as zero");
        return Array::zeros(antioxidant.raw_dim());
    }
    let clamped = antioxidant.iter().filter(|c| **c < 0.0).count();
    if clamped > 0 {
        warn!("{clamped} negative antioxidant values clamped to zero in OIT");
    }
    antioxidant.mapv(|c| initial_oit * c.max(0.0) / reference)
}

/// OIT at every node and output time, `[node, time]`
pub fn oit_profiles(result: &SimulationResult, initial_oit: f64) -> Array2<f64> {
    calculate_oit(&result.species(Species::Antioxidant), result.initial_antioxidant, initial_oit)
}

/// Node-averaged OIT at every output time
pub fn average_oit(result: &SimulationResult, initial_oit: f64) -> Array1<f64> {
    let profiles = oit_profiles(result, initial_oit);
    profiles
        .mean_axis(Axis(0))
        .unwrap_or_else(|| Array1::zeros(result.n_times()))
}

// =================================================================================================
// Molar mass
// =================================================================================================

/// Weight-average molar mass from scission and crosslink densities (Saito)
///
/// ```text
/// 1/Mw = 1/Mw₀ + S/2 − 2X
/// ```
pub fn calculate_molar_mass<S1, S2, D>(
    scission: &ArrayBase<S1, D>,
    crosslink: &ArrayBase<S2, D>,
    initial_molar_mass: f64,
) -> Array<f64, D>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    D: Dimension,
{
    let inverse = Zip::from(scission)
        .and(crosslink)
        .map_collect(|s, x| 1.0 / initial_molar_mass + s / 2.0 - 2.0 * x);

    let floored = inverse.iter().filter(|v| !(**v >= INVERSE_MOLAR_MASS_FLOOR)).count();
    if floored > 0 {
        warn!("{floored} molar-mass entries hit the inverse floor {INVERSE_MOLAR_MASS_FLOOR:e}");
    }
    inverse.mapv(|v| 1.0 / v.max(INVERSE_MOLAR_MASS_FLOOR))
}

/// Molar mass at every node and output time, `[node, time]`
pub fn molar_mass_profiles(result: &SimulationResult, initial_molar_mass: f64) -> Array2<f64> {
    calculate_molar_mass(
        &result.species(Species::ChainScission),
        &result.species(Species::Crosslink),
        initial_molar_mass,
    )
}

// =================================================================================================
// Surface values
// =================================================================================================

/// Time history of `species` at one face
pub fn surface_concentration(result: &SimulationResult, species: Species, face: Face) -> Array1<f64> {
    let node = face.node(result.nodes());
    result.species(species).row(node).to_owned()
}

// =================================================================================================
// Interpolation
// =================================================================================================

/// Piecewise-linear interpolation of `(xp, fp)` at `x`
///
/// `xp` must be increasing. Values outside the sampled range take the nearest
/// edge value. NaN for empty samples or a NaN target.
pub fn interpolate(xp: ArrayView1<'_, f64>, fp: ArrayView1<'_, f64>, x: f64) -> f64 {
    let n = xp.len().min(fp.len());
    if n == 0 || x.is_nan() {
        return f64::NAN;
    }
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }
    // first index with xp[i] > x
    let upper = xp.iter().take(n).position(|v| *v > x).unwrap_or(n - 1);
    let (x0, x1) = (xp[upper - 1], xp[upper]);
    let (f0, f1) = (fp[upper - 1], fp[upper]);
    if x1 == x0 {
        return f1;
    }
    f0 + (x - x0) * (f1 - f0) / (x1 - x0)
}

/// [`interpolate`] at several points
pub fn interpolate_series(xp: ArrayView1<'_, f64>, fp: ArrayView1<'_, f64>, targets: &[f64]) -> Array1<f64> {
    targets.iter().map(|&x| interpolate(xp, fp, x)).collect()
}

/// Derived series available through [`interpolate_at_times`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DerivedQuantity {
    /// Node-averaged OIT (min)
    AverageOit,
    /// OIT at the water face (min)
    SurfaceOit,
    /// Carbonyl concentration at the water face (mol/L)
    SurfaceCarbonyl,
}

impl FromStr for DerivedQuantity {
    type Err = DegradationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "oit_avg" => Ok(DerivedQuantity::AverageOit),
            "oit_surface" => Ok(DerivedQuantity::SurfaceOit),
            "co_surface" => Ok(DerivedQuantity::SurfaceCarbonyl),
            other => Err(DegradationError::InvalidParameter(format!("unknown derived quantity '{other}'"))),
        }
    }
}

/// Series of `quantity` evaluated at `targets_months`
pub fn derived_series(result: &SimulationResult, initial_oit: f64, quantity: DerivedQuantity) -> Array1<f64> {
    match quantity {
        DerivedQuantity::AverageOit => average_oit(result, initial_oit),
        DerivedQuantity::SurfaceOit => calculate_oit(
            &surface_concentration(result, Species::Antioxidant, Face::Inner),
            result.initial_antioxidant,
            initial_oit,
        ),
        DerivedQuantity::SurfaceCarbonyl => surface_concentration(result, Species::Carbonyl, Face::Inner),
    }
}

/// Interpolates a derived series at times given in months
pub fn interpolate_at_times(
    result: &SimulationResult,
    initial_oit: f64,
    targets_months: &[f64],
    quantity: DerivedQuantity,
) -> Array1<f64> {
    let months = result.times_months();
    let series = derived_series(result, initial_oit, quantity);
    interpolate_series(months.view(), series.view(), targets_months)
}

// =================================================================================================
// Threshold crossing
// =================================================================================================

/// First time `values` drops below `threshold`, linearly interpolated
///
/// Returns `times[0]` if the first sample is already below, `None` if the
/// threshold is never crossed.
pub fn time_to_threshold(times: ArrayView1<'_, f64>, values: ArrayView1<'_, f64>, threshold: f64) -> Option<f64> {
    let first_below = values.iter().position(|v| *v < threshold)?;
    if first_below == 0 {
        return times.first().copied();
    }
    let (t1, t2) = (times[first_below - 1], times[first_below]);
    let (v1, v2) = (values[first_below - 1], values[first_below]);
    if (v2 - v1).abs() < 1e-12 {
        return Some(t1);
    }
    Some(t1 + (threshold - v1) * (t2 - t1) / (v2 - v1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array3, array};

    use crate::models::SimulationParams;
    use crate::physics::SPECIES_COUNT;

    fn synthetic_result() -> SimulationResult {
        // 3 nodes, 3 times: AH decays at the water face only
        let mut c = Array3::zeros((SPECIES_COUNT, 3, 3));
        for k in 0..3 {
            c[[Species::Antioxidant.index(), 0, k]] = 2e-3 * (1.0 - 0.5 * k as f64);
            c[[Species::Antioxidant.index(), 1, k]] = 2e-3;
            c[[Species::Antioxidant.index(), 2, k]] = 2e-3;
            c[[Species::Carbonyl.index(), 0, k]] = 1e-4 * k as f64;
        }
        let params = SimulationParams::new(40.0, 0.0, 1.0);
        SimulationResult {
            success: true,
            times: array![0.0, 0.5, 1.0] * crate::models::SECONDS_PER_YEAR,
            concentrations: c,
            initial_antioxidant: 2e-3,
            disinfectant_boundary: 0.0,
            params,
            message: None,
            statistics: None,
        }
    }

    #[test]
    fn test_oit_zero_reference() {
        let oit = calculate_oit(&array![1.0, 2.0], 0.0, 200.0);
        assert_eq!(oit, array![0.0, 0.0]);
        let oit = calculate_oit(&array![1.0, 2.0], 1e-13, 200.0);
        assert_eq!(oit, array![0.0, 0.0]);
    }

    #[test]
    fn test_oit_clamps_negative_antioxidant() {
        let oit = calculate_oit(&array![[-1e-6, 1e-3], [2e-3, 0.0]], 2e-3, 100.0);
        assert_eq!(oit, array![[0.0, 50.0], [100.0, 0.0]]);
        assert!(oit.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn test_average_and_surface_oit() {
        let r = synthetic_result();
        let avg = average_oit(&r, 300.0);
        assert_relative_eq!(avg[0], 300.0);
        assert_relative_eq!(avg[1], (150.0 + 300.0 + 300.0) / 3.0);
        assert_relative_eq!(avg[2], 200.0);

        let surface = derived_series(&r, 300.0, DerivedQuantity::SurfaceOit);
        assert_eq!(surface, array![300.0, 150.0, 0.0]);

        let outer = surface_concentration(&r, Species::Antioxidant, Face::Outer);
        assert_eq!(outer, array![2e-3, 2e-3, 2e-3]);
    }

    #[test]
    fn test_molar_mass_floor() {
        // massive crosslinking: inverse goes negative and is floored
        let mw = calculate_molar_mass(&array![0.0], &array![1.0], 150.0);
        assert_eq!(mw[0], 1e6);

        // massive scission: tiny but finite positive Mw
        let mw = calculate_molar_mass(&array![2e6], &array![0.0], 150.0);
        assert!(mw[0] > 0.0 && mw[0].is_finite());
        assert!(mw[0] < 1e-5);

        let mw = calculate_molar_mass(&array![0.0, 0.002], &array![0.0, 0.0], 150.0);
        assert_relative_eq!(mw[0], 150.0);
        assert_relative_eq!(mw[1], 1.0 / (1.0 / 150.0 + 0.001));
    }

    #[test]
    fn test_interpolate_clamps_like_numpy() {
        let xp = array![0.0, 1.0, 3.0];
        let fp = array![10.0, 20.0, 0.0];
        assert_eq!(interpolate(xp.view(), fp.view(), -5.0), 10.0);
        assert_eq!(interpolate(xp.view(), fp.view(), 0.5), 15.0);
        assert_eq!(interpolate(xp.view(), fp.view(), 2.0), 10.0);
        assert_eq!(interpolate(xp.view(), fp.view(), 1.0), 20.0);
        assert_eq!(interpolate(xp.view(), fp.view(), 99.0), 0.0);
        assert!(interpolate(Array1::zeros(0).view(), Array1::zeros(0).view(), 1.0).is_nan());
    }

    #[test]
    fn test_interpolate_nan_target() {
        assert!(interpolate(array![1.0].view(), array![2.0].view(), f64::NAN).is_nan());
        let xp = array![0.0, 1.0, 3.0];
        let fp = array![10.0, 20.0, 0.0];
        assert!(interpolate(xp.view(), fp.view(), f64::NAN).is_nan());
        assert_eq!(interpolate(array![1.0].view(), array![2.0].view(), 5.0), 2.0);
    }

    #[test]
    fn test_interpolate_at_months() {
        let r = synthetic_result();
        let co = interpolate_at_times(&r, 300.0, &[3.0, 24.0], DerivedQuantity::SurfaceCarbonyl);
        assert_relative_eq!(co[0], 0.5e-4, max_relative = 1e-12);
        assert_relative_eq!(co[1], 2e-4);
        assert_eq!("oit_avg".parse::<DerivedQuantity>().unwrap(), DerivedQuantity::AverageOit);
        assert!("oit".parse::<DerivedQuantity>().is_err());
    }

    #[test]
    fn test_time_to_threshold() {
        let t = array![0.0, 1.0, 2.0, 3.0];
        let v = array![100.0, 80.0, 40.0, 20.0];
        assert_relative_eq!(time_to_threshold(t.view(), v.view(), 60.0).unwrap(), 1.5);
        assert_eq!(time_to_threshold(t.view(), v.view(), 10.0), None);
        assert_eq!(time_to_threshold(t.view(), v.view(), 150.0), Some(0.0));
    }
}
