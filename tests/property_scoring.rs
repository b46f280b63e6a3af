use crucible::domain::models::{
    aggregate, DimensionScores, JudgeVerdict, RefinementHistory, TerminationConfig,
};
use crucible::services::{StopReason, TerminationPolicy, TerminationVerdict};
use proptest::prelude::*;

fn verdict(c: f64, p: f64, e: f64, s: f64) -> JudgeVerdict {
    JudgeVerdict::scored(DimensionScores::new(c, p, e, s), "prop", "prop-backend")
}

fn dim_score() -> impl Strategy<Value = f64> {
    0.0f64..=100.0
}

proptest! {
    /// Property: a single verdict carries zero coherence penalty
    ///
    /// Disagreement needs at least two perspectives; one verdict's
    /// adjusted score always equals its mean.
    #[test]
    fn prop_single_verdict_has_no_penalty(
        c in dim_score(), p in dim_score(), e in dim_score(), s in dim_score(),
        weight in 0.0f64..=1.0,
    ) {
        let agg = aggregate(&[verdict(c, p, e, s)], weight);
        prop_assert_eq!(agg.coherence_penalty, 0.0);
        prop_assert!((agg.adjusted - agg.mean).abs() < 1e-9);
        prop_assert_eq!(agg.verdict_count, 1);
    }

    /// Property: the adjusted score stays in range and never exceeds the mean
    ///
    /// The penalty only ever subtracts, and the floor at zero keeps the
    /// adjusted score from going negative no matter how wild the
    /// disagreement is.
    #[test]
    fn prop_adjusted_bounded_and_below_mean(
        scores in prop::collection::vec((dim_score(), dim_score(), dim_score(), dim_score()), 1..6),
        weight in 0.0f64..=1.0,
    ) {
        let verdicts: Vec<JudgeVerdict> = scores
            .into_iter()
            .map(|(c, p, e, s)| verdict(c, p, e, s))
            .collect();
        let agg = aggregate(&verdicts, weight);

        prop_assert!(agg.adjusted >= 0.0);
        prop_assert!(agg.adjusted <= 100.0);
        prop_assert!(agg.adjusted <= agg.mean + 1e-9);
    }

    /// Property: unanimous verdicts are never penalized
    #[test]
    fn prop_unanimous_verdicts_have_no_penalty(
        c in dim_score(), p in dim_score(), e in dim_score(), s in dim_score(),
        count in 2usize..6,
        weight in 0.0f64..=1.0,
    ) {
        let verdicts: Vec<JudgeVerdict> = (0..count).map(|_| verdict(c, p, e, s)).collect();
        let agg = aggregate(&verdicts, weight);
        prop_assert!(agg.coherence_penalty.abs() < 1e-9);
    }

    /// Property: wider disagreement never lowers the penalty
    ///
    /// Two verdicts split symmetrically around 50; growing the split
    /// grows (or keeps) the penalty.
    #[test]
    fn prop_penalty_monotone_in_disagreement(
        half_spread in 0.0f64..=50.0,
        extra in 0.0f64..=25.0,
    ) {
        let penalty_at = |spread: f64| {
            let lo = 50.0 - spread;
            let hi = 50.0 + spread;
            aggregate(
                &[verdict(lo, lo, lo, lo), verdict(hi, hi, hi, hi)],
                0.15,
            )
            .coherence_penalty
        };

        let narrow = penalty_at(half_spread);
        let wide = penalty_at((half_spread + extra).min(50.0));
        prop_assert!(wide >= narrow - 1e-9);
    }

    /// Property: a steadily improving line runs to the round cap
    ///
    /// As long as every round gains at least a solid step, neither the
    /// plateau, degradation, nor improvement rule may stop the line; only
    /// the hard cap does.
    #[test]
    fn prop_strict_improvement_runs_to_max_rounds(
        start in 0.0f64..=40.0,
        step in 6.0f64..=12.0,
    ) {
        let config = TerminationConfig::default();
        let max_rounds = config.max_rounds;
        let policy = TerminationPolicy::new(config);

        let scores: Vec<f64> = (0..max_rounds).map(|i| start + step * i as f64).collect();
        for end in 1..max_rounds {
            let verdict = policy.evaluate(&RefinementHistory::from_scores(&scores[..end]));
            prop_assert_eq!(verdict, TerminationVerdict::Continue);
        }

        let verdict = policy.evaluate(&RefinementHistory::from_scores(&scores));
        prop_assert_eq!(verdict, TerminationVerdict::Stop(StopReason::MaxRounds));
    }

    /// Property: three strictly declining recent scores always stop the line
    #[test]
    fn prop_strict_decline_stops(
        peak in 50.0f64..=100.0,
        drop1 in 1.0f64..=10.0,
        drop2 in 1.0f64..=10.0,
    ) {
        let policy = TerminationPolicy::new(TerminationConfig::default());
        let scores = [40.0, peak, peak - drop1, peak - drop1 - drop2];
        let verdict = policy.evaluate(&RefinementHistory::from_scores(&scores));
        prop_assert_eq!(verdict, TerminationVerdict::Stop(StopReason::Degradation));
    }
}
