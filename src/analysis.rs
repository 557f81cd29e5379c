//! Reference values for the 2D ferromagnetic Ising model (J = 1, k_B = 1).

use crate::sweep::SweepResult;

/// Critical temperature for the 2D Ising model (exact result)
/// T_c = 2J / (k_B * ln(1 + √2)) ≈ 2.269 J/k_B
pub fn critical_temperature() -> f64 {
    2.0 / (1.0 + 2.0_f64.sqrt()).ln()
}

/// Magnetization per site at T=0 (all spins aligned)
pub fn magnetization_per_site_at_zero_temp() -> f64 {
    1.0
}

/// Energy per site at T=0
pub fn energy_per_site_at_zero_temp() -> f64 {
    // Each spin has 4 aligned neighbors, E = -J * 4 / 2 = -2J per site
    -2.0
}

/// Divide the magnetization and energy of a result by the number of sites.
pub fn per_site(result: &SweepResult, lattice_size: usize) -> SweepResult {
    let sites = (lattice_size * lattice_size) as f64;
    SweepResult {
        temperature: result.temperature,
        magnetization: result.magnetization / sites,
        energy: result.energy / sites,
    }
}

/// Whether a temperature lies in the ordered (ferromagnetic) phase.
pub fn is_ordered_phase(temperature: f64) -> bool {
    temperature < critical_temperature()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::*;

    #[test]
    fn test_critical_temperature() {
        assert_relative_eq!(critical_temperature(), 2.269, epsilon = 0.001);
        assert!(is_ordered_phase(2.0));
        assert!(!is_ordered_phase(2.5));
    }

    #[test]
    fn test_per_site_normalisation() {
        let result = SweepResult {
            temperature: 0.1,
            magnetization: 64.0,
            energy: -128.0,
        };
        let normalised = per_site(&result, 8);
        assert_relative_eq!(normalised.magnetization, magnetization_per_site_at_zero_temp());
        assert_relative_eq!(normalised.energy, energy_per_site_at_zero_temp());
        assert_eq!(normalised.temperature, 0.1);
    }
}
