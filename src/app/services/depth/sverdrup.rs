//! Depth by integration of in-situ density
//!
//! Sverdrup, H. U., Johnson, M. W. and Fleming, R. H., 1942. The Oceans,
//! Their Physics, Chemistry and General Biology.

use crate::constants::DGRAV_DPRES;

/// Integrate depth (m) from pressure (dbar) and in-situ density (kg/m^3)
///
/// `gravity` is the local surface gravity. A cast starting at or above
/// `shallow_start_dbar` gets its first depth from a single surface step;
/// deeper starts are integrated relative to the first level, which is 0.
/// The two series must have the same length.
pub fn integrate_depth(
    gravity: f64,
    pressures: &[f64],
    densities: &[f64],
    shallow_start_dbar: f64,
) -> Vec<f64> {
    debug_assert_eq!(pressures.len(), densities.len());
    let levels = pressures.len().min(densities.len());
    let mut depths = Vec::with_capacity(levels);
    if levels == 0 {
        return depths;
    }

    let p0 = pressures[0];
    let first = if p0 > shallow_start_dbar {
        0.0
    } else {
        p0 / (densities[0] * 1.0e4 * (gravity + DGRAV_DPRES * p0)) * 1.0e8
    };
    depths.push(first);

    for j in 1..levels {
        let i = j - 1;
        let step = (pressures[j] - pressures[i])
            / ((densities[j] + densities[i]) * 5000.0 * (gravity + DGRAV_DPRES * pressures[j]))
            * 1.0e8;
        depths.push(depths[i] + step);
    }

    depths
}
