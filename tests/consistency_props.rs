//! Running totals must always agree with a full recomputation.

use ising_sweep::{Simulation, UpdateRule};
use proptest::prelude::*;

fn rule_strategy() -> impl Strategy<Value = UpdateRule> {
    prop_oneof![Just(UpdateRule::Metropolis), Just(UpdateRule::Cascade)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn totals_match_lattice(
        seed in any::<u64>(),
        n in 1usize..10,
        beta in 0.0f64..3.0,
        steps in 1usize..60,
        rule in rule_strategy(),
    ) {
        let mut sim = Simulation::new(n, rule, seed).unwrap();
        for _ in 0..steps {
            let outcome = sim.step(beta).unwrap();
            prop_assert!(outcome.flipped <= outcome.candidates);
            prop_assert!(outcome.flipped <= n * n);
            prop_assert_eq!(sim.total_energy(), sim.lattice().total_energy());
            prop_assert_eq!(sim.total_magnetization(), sim.lattice().total_magnetization());
        }
    }

    #[test]
    fn reset_restores_ground_state(
        seed in any::<u64>(),
        n in 1usize..8,
        rule in rule_strategy(),
    ) {
        let mut sim = Simulation::new(n, rule, seed).unwrap();
        sim.evolve(20, 0.3).unwrap();
        sim.reset(seed);
        let sites = (n * n) as i64;
        prop_assert_eq!(sim.total_magnetization(), sites);
        prop_assert_eq!(sim.total_energy(), -2 * sites);
    }
}
