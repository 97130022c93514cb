//! End-to-end generator and session properties.

use anomtrain_core::op::{OpKind, Operation, Txn};
use anomtrain_core::rules::{AnomalyRuleSet, PrecedenceRule};
use anomtrain_core::score::Answer;
use anomtrain_gen::generator::{self, generate};
use anomtrain_gen::session::{self, Trainer};
use anomtrain_gen::spec::ScheduleSpec;
use hashbrown::HashSet;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn rule(before: &str, after: &str) -> PrecedenceRule {
    PrecedenceRule::new(before.parse().unwrap(), after.parse().unwrap())
}

#[test]
fn generated_schedules_respect_the_precedence_rules() {
    let spec = ScheduleSpec::default();
    let mut rng = StdRng::seed_from_u64(11);
    let history = HashSet::new();

    for _ in 0..50 {
        let section = generate(&spec, &history, &mut rng).unwrap();
        for rule in &spec.rules {
            let position =
                |op: &Operation| section.steps.iter().position(|step| step == op);
            if let (Some(before), Some(after)) = (position(&rule.before), position(&rule.after)) {
                assert!(before < after, "rule {rule:?} violated in {:?}", section.steps);
            }
        }
    }
}

#[test]
fn sections_of_one_session_have_unique_fingerprints() {
    let spec = ScheduleSpec::builder().rounds(Some(10)).build();
    let mut trainer = Trainer::new(spec);
    let mut rng = StdRng::seed_from_u64(3);

    for _ in 0..10 {
        let section = trainer.next(&mut rng).unwrap().clone();
        let answers = vec![Some(Answer::Neither); section.verdicts.len()];
        trainer.submit(answers).unwrap();
    }

    let fingerprints = trainer.state.fingerprints();
    assert_eq!(fingerprints.len(), trainer.state.sections.len());
}

#[test]
fn rollback_truncates_the_rest_of_the_transaction() {
    let spec = ScheduleSpec::builder().rollback(1.0).build();
    let mut rng = StdRng::seed_from_u64(23);
    let history = HashSet::new();

    for _ in 0..50 {
        let section = generate(&spec, &history, &mut rng).unwrap();
        for txn in Txn::BOTH {
            if let Some(rollback) = section
                .steps
                .iter()
                .position(|step| step.txn == txn && step.kind == OpKind::Rollback)
            {
                assert!(
                    section.steps[rollback + 1..].iter().all(|step| step.txn != txn),
                    "steps of {txn:?} after its rollback in {:?}",
                    section.steps
                );
            }
        }
    }
}

#[test]
fn summands_are_always_distinct() {
    let spec = ScheduleSpec::default();
    let mut rng = StdRng::seed_from_u64(5);
    let history = HashSet::new();

    for _ in 0..50 {
        let section = generate(&spec, &history, &mut rng).unwrap();
        assert_ne!(section.t1.summand, section.t2.summand);
    }
}

#[test]
fn full_anomaly_bias_yields_anomalies_when_attributes_match() {
    let spec = ScheduleSpec::builder()
        .anomaly_bias(1.0)
        .second_attribute(0.0)
        .build();
    let mut rng = StdRng::seed_from_u64(17);
    let history = HashSet::new();

    for _ in 0..30 {
        let section = generate(&spec, &history, &mut rng).unwrap();
        assert!(section.verdicts.contains(&true), "{:?}", section.steps);
    }
}

#[test]
fn attribute_mismatch_blanks_the_verdicts() {
    // A 0.5 second-attribute probability makes mismatches common; the
    // invariant must hold for every mismatched section.
    let spec = ScheduleSpec::builder()
        .second_attribute(0.5)
        .anomaly_bias(0.0)
        .build();
    let mut rng = StdRng::seed_from_u64(29);
    let history = HashSet::new();

    for _ in 0..100 {
        let section = generate(&spec, &history, &mut rng).unwrap();
        if !section.attributes_match() {
            assert!(section.verdicts.iter().all(|verdict| !verdict));
        }
    }
}

#[test]
fn exhausted_budget_with_fixed_rounds_accepts_the_last_candidate() {
    // A serial-only rule chain admits exactly one schedule, so the second
    // request can never find a novel one.
    let rules = vec![
        rule("T1,read", "T1,add"),
        rule("T1,add", "T1,write"),
        rule("T2,read", "T2,add"),
        rule("T2,add", "T2,write"),
        rule("T1,write", "T2,read"),
    ];

    let spec = ScheduleSpec::builder()
        .txn_ops(Some([
            vec![OpKind::Read, OpKind::Add, OpKind::Write],
            vec![OpKind::Read, OpKind::Add, OpKind::Write],
        ]))
        .rules(rules)
        .rule_sets(Vec::new())
        .rounds(Some(5))
        .build();

    let mut rng = StdRng::seed_from_u64(41);
    let first = generate(&spec, &HashSet::new(), &mut rng).unwrap();

    let mut history = HashSet::new();
    history.insert(first.fingerprint());
    let err = generate(&spec, &history, &mut rng).unwrap_err();
    let generator::Error::RetryBudgetExhausted { last } = err else {
        panic!("expected budget exhaustion");
    };
    assert_eq!(last.fingerprint(), first.fingerprint());

    // The trainer applies the escape valve and accepts it.
    let mut trainer = Trainer::resume(spec, {
        let mut state = anomtrain_core::section::SessionState::new(Some(5));
        state.sections.push(first);
        state
    });
    let accepted = trainer.next(&mut rng).unwrap().clone();
    assert_eq!(trainer.state.sections.len(), 2);
    assert!(!accepted.steps.is_empty());
}

#[test]
fn open_ended_session_restarts_on_exhaustion() {
    let spec = ScheduleSpec::builder()
        .txn_ops(Some([vec![OpKind::Read], vec![OpKind::Read]]))
        .rules(vec![rule("T1,read", "T2,read")])
        .rule_sets(Vec::new())
        .rounds(None)
        .build();

    let mut rng = StdRng::seed_from_u64(43);
    let mut trainer = Trainer::new(spec);
    trainer.next(&mut rng).unwrap();
    assert_eq!(trainer.state.sections.len(), 1);

    // Only one schedule exists, so the next reveal must exhaust and reset.
    let err = trainer.next(&mut rng).unwrap_err();
    assert!(matches!(err, session::Error::SessionRestarted));
    assert!(trainer.state.sections.is_empty());
}

#[test]
fn quiz_session_blocks_next_until_submission() {
    let spec = ScheduleSpec::default();
    let mut rng = StdRng::seed_from_u64(47);
    let mut trainer = Trainer::new(spec);

    let section = trainer.next(&mut rng).unwrap().clone();
    assert!(matches!(
        trainer.next(&mut rng),
        Err(session::Error::Unanswered)
    ));

    let answers = vec![Some(Answer::Neither); section.verdicts.len()];
    trainer.submit(answers).unwrap();
    trainer.next(&mut rng).unwrap();
    assert_eq!(trainer.state.sections.len(), 2);
}

#[test]
fn fixed_schedules_bypass_generation() {
    let fixed = anomtrain_gen::spec::FixedSchedule {
        a: 32,
        b: 58,
        steps: ["T1,read", "T2,read", "T2,add", "T2,write", "T1,add", "T1,write"]
            .iter()
            .map(|token| token.parse().unwrap())
            .collect(),
        t1: anomtrain_core::section::TxnParams {
            attribute: anomtrain_core::op::Attribute::A,
            summand: 4,
        },
        t2: anomtrain_core::section::TxnParams {
            attribute: anomtrain_core::op::Attribute::A,
            summand: 5,
        },
    };
    let spec = ScheduleSpec::builder()
        .rule_sets(vec![AnomalyRuleSet::new(
            "Lost Update",
            vec![vec![
                rule("T1,read", "T2,write"),
                rule("T2,write", "T1,write"),
            ]],
        )])
        .fixed(vec![fixed.clone()])
        .build();

    let mut rng = StdRng::seed_from_u64(53);
    let mut trainer = Trainer::new(spec);
    let section = trainer.next(&mut rng).unwrap();
    assert_eq!(section.steps, fixed.steps);
    assert_eq!(section.verdicts, [true]);
}

#[test]
fn finished_session_still_accepts_the_pending_submission() {
    let spec = ScheduleSpec::builder().rounds(Some(1)).build();
    let mut rng = StdRng::seed_from_u64(59);
    let mut trainer = Trainer::new(spec);

    let section = trainer.next(&mut rng).unwrap().clone();
    assert!(trainer.state.finished());
    assert!(matches!(
        trainer.next(&mut rng),
        Err(session::Error::Finished)
    ));

    // The round target is reached, but the last section is unanswered; a
    // resumed caller must still be able to submit it.
    let answers = vec![Some(Answer::Neither); section.verdicts.len()];
    let score = trainer.submit(answers).unwrap();
    assert_eq!(score.total, section.verdicts.len());
    assert!(trainer.state.sections[0].score.is_some());
}

#[test]
fn batch_generation_produces_independent_sessions() {
    let spec = ScheduleSpec::builder()
        .rounds(Some(3))
        .rule_sets(Vec::new())
        .build();
    let sessions = session::generate_sessions(&spec, 4).unwrap();
    assert_eq!(sessions.len(), 4);
    for stored in &sessions {
        assert_eq!(stored.state.sections.len(), 3);
        assert_eq!(stored.state.fingerprints().len(), 3);
    }
}
