//! # Property Tests
//!
//! Invariants every pipeline stage must hold for arbitrary rounds.

use consensus_engine::{
    derive_reward, extract, impute, normalize, rescale, score_participation, DecisionBound,
    Reputation, VoteMatrix,
};
use consensus_linalg::JacobiSolver;
use proptest::prelude::*;

/// A binary round where every column keeps at least one vote (row 0 is complete).
fn binary_round() -> impl Strategy<Value = (Vec<Vec<Option<f64>>>, Vec<f64>)> {
    (2usize..7, 1usize..5).prop_flat_map(|(reporters, decisions)| {
        let first = prop::collection::vec(prop_oneof![Just(0.0), Just(1.0)], decisions)
            .prop_map(|row| row.into_iter().map(Some).collect::<Vec<_>>());
        let cell = prop_oneof![
            3 => Just(Some(1.0)),
            3 => Just(Some(0.0)),
            1 => Just(Some(0.5)),
            2 => Just(None),
        ];
        let rest = prop::collection::vec(prop::collection::vec(cell, decisions), reporters - 1);
        let weights = prop::collection::vec(0.0f64..10.0, reporters);
        (first, rest, weights).prop_map(|(first, mut rest, weights)| {
            rest.insert(0, first);
            (rest, weights)
        })
    })
}

fn on_simplex(w: &[f64]) -> bool {
    w.iter().all(|x| *x >= 0.0) && (w.iter().sum::<f64>() - 1.0).abs() < 1e-9
}

proptest! {
    #[test]
    fn normalize_lands_on_simplex(values in prop::collection::vec(-100.0f64..100.0, 1..20)) {
        prop_assert!(on_simplex(&normalize(&values)));
    }

    #[test]
    fn rescale_maps_into_unit_interval(
        (min, span) in (-1000.0f64..1000.0, 0.01f64..1000.0),
        fractions in prop::collection::vec(0.0f64..=1.0, 1..10),
    ) {
        let max = min + span;
        let bound = DecisionBound::scaled(min, max);
        let rows = fractions.iter().map(|f| vec![Some(min + f * span)]).collect();
        let raw = VoteMatrix::new(rows).unwrap();
        let scaled = rescale(&raw, &[bound]).unwrap();
        for (i, f) in fractions.iter().enumerate() {
            let v = scaled.get(i, 0).unwrap();
            prop_assert!((v - f).abs() < 1e-9);
            prop_assert!((bound.unscale(v) - (min + f * span)).abs() < 1e-6 * span.max(1.0));
        }
    }

    #[test]
    fn imputation_is_idempotent((rows, weights) in binary_round()) {
        let votes = VoteMatrix::new(rows).unwrap();
        let bounds = vec![DecisionBound::binary(); votes.decisions()];
        let rep = Reputation::from_weights(&weights).unwrap();
        let once = impute(&votes, &bounds, &rep, 0.1).unwrap();
        let twice = impute(&VoteMatrix::from(&once), &bounds, &rep, 0.1).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn imputed_binary_cells_are_caught((rows, weights) in binary_round()) {
        let votes = VoteMatrix::new(rows).unwrap();
        let bounds = vec![DecisionBound::binary(); votes.decisions()];
        let rep = Reputation::from_weights(&weights).unwrap();
        let filled = impute(&votes, &bounds, &rep, 0.1).unwrap();
        for i in 0..votes.reporters() {
            for j in 0..votes.decisions() {
                match votes.get(i, j) {
                    Some(v) => prop_assert_eq!(filled[(i, j)], v),
                    None => prop_assert!([0.0, 0.5, 1.0].contains(&filled[(i, j)])),
                }
            }
        }
    }

    #[test]
    fn reputation_stays_on_simplex((rows, weights) in binary_round(), alpha in 0.0f64..=1.0) {
        let votes = VoteMatrix::new(rows).unwrap();
        let bounds = vec![DecisionBound::binary(); votes.decisions()];
        let old = Reputation::from_weights(&weights).unwrap();
        let filled = impute(&votes, &bounds, &old, 0.1).unwrap();
        let loading = extract(&filled, &old, &JacobiSolver::default()).unwrap();
        let reward = derive_reward(&loading.first_score, &old, &filled, alpha).unwrap();

        prop_assert!(on_simplex(reward.this_reputation.as_slice()));
        prop_assert!(on_simplex(reward.smoothed_reputation.as_slice()));
    }

    #[test]
    fn bonuses_stay_on_simplex((rows, weights) in binary_round()) {
        let votes = VoteMatrix::new(rows).unwrap();
        let bounds = vec![DecisionBound::binary(); votes.decisions()];
        let old = Reputation::from_weights(&weights).unwrap();
        let filled = impute(&votes, &bounds, &old, 0.1).unwrap();
        let loading = extract(&filled, &old, &JacobiSolver::default()).unwrap();
        let reward = derive_reward(&loading.first_score, &old, &filled, 0.1).unwrap();
        let certainty = vec![0.5; votes.decisions()];
        let p = score_participation(&votes.missing_mask(), &reward, &certainty).unwrap();

        prop_assert!((0.0..=1.0).contains(&p.percent_na));
        prop_assert!(p.per_decision.iter().all(|x| (0.0..=1.0).contains(x)));
        prop_assert!(on_simplex(&p.row_bonus));
        prop_assert!(on_simplex(&p.col_bonus));
    }
}
