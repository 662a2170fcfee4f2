#[cfg(test)]
mod logtoku_scenarios {
    use approx::assert_abs_diff_eq;

    use crate::*;

    fn trace(steps: Vec<(u32, Vec<f32>)>) -> GenerationTrace {
        GenerationTrace::new(
            steps
                .into_iter()
                .map(|(id, scores)| StepRecord::new(id, scores))
                .collect(),
        )
        .unwrap()
    }

    /// Five steps over a vocabulary of eight with varying sharpness
    fn mixed_trace() -> GenerationTrace {
        trace(vec![
            (0, vec![9.0, 0.5, 0.2, -1.0, -2.0, -3.0, -4.0, -5.0]),
            (2, vec![2.0, 1.9, 2.1, 1.8, -1.0, -1.0, -1.0, -1.0]),
            (1, vec![0.3, 4.0, 3.5, 0.1, 0.0, -0.5, -0.5, -0.5]),
            (5, vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]),
            (7, vec![-2.0, -2.0, 0.0, 12.0, 6.0, -8.0, 0.0, 3.0]),
        ])
    }

    #[test]
    fn test_two_candidate_scenario() {
        let t = trace(vec![(1, vec![-1.0, 3.0, -4.0, 1.0, -2.0])]);
        let report = log_tok_u(&t, 2, None).unwrap();

        let step = report.per_step[0];
        assert_abs_diff_eq!(step.epistemic, 1.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(step.aleatoric, 0.458_333, epsilon = 1e-3);
        assert_abs_diff_eq!(report.unreliability_total, step.unreliability, epsilon = 1e-15);
        assert_eq!(step.total_evidence, 4.0);
        assert_eq!(report.kappa, 2);
        assert_eq!(report.selected_steps, vec![0]);
    }

    #[test]
    fn test_empty_generation_is_malformed() {
        let output = GenerationOutput {
            sequences: vec![vec![4, 2]],
            scores: vec![],
            prompt_len: 2,
        };
        assert!(matches!(
            trace_from_output(output),
            Err(UncertaintyError::MalformedTrace(_))
        ));
    }

    #[test]
    fn test_kappa_larger_than_vocabulary_is_invalid() {
        let t = trace(vec![(0, vec![1.0, 2.0, 3.0])]);
        assert!(matches!(
            log_tok_u(&t, 4, None),
            Err(UncertaintyError::InvalidParameter(_))
        ));
        assert!(matches!(
            log_tok_u(&t, 0, None),
            Err(UncertaintyError::InvalidParameter(_))
        ));
        assert!(matches!(
            log_tok_u(&t, 2, Some(0)),
            Err(UncertaintyError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_all_negative_step_uses_fallback() {
        let t = trace(vec![
            (0, vec![3.0, 1.0, -1.0, -2.0]),
            (2, vec![-0.5, -0.25, -3.0, -9.0]),
        ]);
        let report = log_tok_u(&t, 2, None).unwrap();

        let degenerate = report.per_step[1];
        assert!(degenerate.degenerate);
        assert_eq!(degenerate.epistemic, 1.0);
        assert_eq!(degenerate.aleatoric, 0.0);
        assert!(report.unreliability_total.is_finite());
        assert_abs_diff_eq!(
            report.unreliability_total,
            report.per_step[0].unreliability / 2.0,
            epsilon = 1e-15
        );
        assert_eq!(report.degenerate_steps(), vec![1]);
    }

    #[test]
    fn test_reject_policy_surfaces_degenerate_step() {
        let t = trace(vec![
            (0, vec![3.0, 1.0, -1.0]),
            (0, vec![-1.0, -2.0, -3.0]),
        ]);
        let config = LogTokUConfig::new(2, None)
            .unwrap()
            .with_degenerate_policy(DegeneratePolicy::Reject);
        let err = LogTokU::new(config).unwrap().evaluate(&t).unwrap_err();
        assert_eq!(err, UncertaintyError::DegenerateEvidence { step: 1, kappa: 2 });
    }

    #[test]
    fn test_single_inconfident_step_is_the_maximum() {
        let t = mixed_trace();
        let full = log_tok_u(&t, 3, None).unwrap();
        let top = log_tok_u(&t, 3, Some(1)).unwrap();

        let (argmax, max) = full
            .per_step
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (i, s)| {
                if s.unreliability > best.1 {
                    (i, s.unreliability)
                } else {
                    best
                }
            });

        assert_eq!(top.selected_steps, vec![argmax]);
        assert_eq!(top.unreliability_total, max);
        assert_eq!(top.most_unreliable_step(), Some(argmax));
        assert!(top.unreliability_total >= full.unreliability_total);
    }

    #[test]
    fn test_tied_steps_resolve_to_lowest_index() {
        let scores = vec![2.0, 1.0, 0.5, -1.0];
        let t = trace(vec![
            (3, vec![5.0, -1.0, -1.0, -1.0]),
            (0, scores.clone()),
            (1, scores),
        ]);
        let report = log_tok_u(&t, 3, Some(1)).unwrap();
        assert_eq!(report.selected_steps, vec![1]);
    }

    #[test]
    fn test_zero_unreliability_ties_keep_step_order() {
        // One surviving score gives zero spread; the all-negative step falls back to zero too
        let t = trace(vec![(0, vec![5.0, -1.0, -1.0]), (0, vec![-1.0, -2.0, -3.0])]);
        let report = log_tok_u(&t, 2, Some(1)).unwrap();

        assert_eq!(report.selected_steps, vec![0]);
        assert!(report.per_step[1].degenerate);
        for step in &report.per_step {
            assert!(step.aleatoric.is_sign_positive());
            assert!(step.unreliability.is_sign_positive());
        }
        assert!(report.unreliability_total.is_sign_positive());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let t = mixed_trace();
        let sequential = LogTokU::new(LogTokUConfig::new(4, Some(2)).unwrap())
            .unwrap()
            .evaluate(&t)
            .unwrap();
        let parallel = LogTokU::new(LogTokUConfig::new(4, Some(2)).unwrap().with_parallel(true))
            .unwrap()
            .evaluate(&t)
            .unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_report_bounds_on_mixed_trace() {
        let report = log_tok_u(&mixed_trace(), 5, None).unwrap();

        assert!((0.0..=1.0).contains(&report.naive));
        assert!((0.0..=1.0).contains(&report.vanilla));
        assert!(report.unreliability_total >= 0.0);
        assert_eq!(report.per_step.len(), 5);
        for step in &report.per_step {
            assert!(step.epistemic > 0.0 && step.epistemic <= 1.0);
            assert!(step.aleatoric >= 0.0);
            assert_abs_diff_eq!(
                step.unreliability,
                step.epistemic * step.aleatoric,
                epsilon = 1e-15
            );
        }
        assert_eq!(report.reliability(), -report.unreliability_total);
    }

    #[test]
    fn test_report_baselines_match_free_functions() {
        let t = mixed_trace();
        let report = log_tok_u(&t, 2, None).unwrap();
        assert_eq!(report.naive, naive_uncertainty(&t));
        assert_eq!(report.vanilla, vanilla_uncertainty(&t));
    }

    #[test]
    fn test_one_hot_trace_baselines_are_zero() {
        let t = trace(vec![
            (1, vec![f32::NEG_INFINITY, 4.0, f32::NEG_INFINITY]),
            (0, vec![2.0, f32::NEG_INFINITY, f32::NEG_INFINITY]),
        ]);
        let report = log_tok_u(&t, 2, None).unwrap();
        assert_eq!(report.naive, 0.0);
        assert_eq!(report.vanilla, 0.0);
        // A single surviving candidate carries no aleatoric spread
        assert!(report.per_step.iter().all(|s| s.aleatoric == 0.0));
    }

    #[test]
    fn test_scorers_rank_uniformly() {
        let scorers: Vec<Box<dyn SequenceScorer>> = vec![
            Box::new(NaiveScorer),
            Box::new(VanillaScorer),
            Box::new(LogTokU::new(LogTokUConfig::new(3, None).unwrap()).unwrap()),
        ];

        let sharp = trace(vec![(0, vec![20.0, 0.0, 0.0, 0.0]); 3]);
        let flat = trace(vec![(0, vec![3.0, 3.0, 3.0, 3.0]); 3]);

        for scorer in &scorers {
            let s = scorer.score(&sharp).unwrap();
            let f = scorer.score(&flat).unwrap();
            assert!(f > s, "{} ranked the flat trace as more certain", scorer.name());
        }
    }

    #[test]
    fn test_json_round_trip_of_generation_output() {
        let json = r#"{
            "sequences": [[101, 7, 2, 0]],
            "scores": [[[0.1, 0.2, 3.0, -1.0]], [[2.5, 0.0, 0.3, 0.1]]],
            "prompt_len": 2
        }"#;
        let output: GenerationOutput = serde_json::from_str(json).unwrap();
        let t = trace_from_output(output).unwrap();
        let report = log_tok_u(&t, 2, Some(1)).unwrap();

        let encoded = serde_json::to_value(&report).unwrap();
        assert_eq!(encoded["kappa"], 2);
        assert_eq!(encoded["per_step"].as_array().map(|a| a.len()), Some(2));

        let decoded: SequenceUncertainty = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded.selected_steps, report.selected_steps);
        assert_abs_diff_eq!(
            decoded.unreliability_total,
            report.unreliability_total,
            epsilon = 1e-12
        );
    }
}
