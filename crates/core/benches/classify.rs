use anomtrain_core::classify::classify;
use anomtrain_core::op::{OpKind, Operation, Txn};
use anomtrain_core::rules::{AnomalyRuleSet, PrecedenceRule};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn rule(before: &str, after: &str) -> PrecedenceRule {
    PrecedenceRule::new(before.parse().unwrap(), after.parse().unwrap())
}

fn trainer_rule_sets() -> Vec<AnomalyRuleSet> {
    vec![
        AnomalyRuleSet::new(
            "Lost Update",
            vec![
                vec![rule("T1,read", "T2,write"), rule("T2,write", "T1,write")],
                vec![rule("T2,read", "T1,write"), rule("T1,write", "T2,write")],
            ],
        ),
        AnomalyRuleSet::new(
            "Non-Repeatable Read",
            vec![
                vec![rule("T1,read0", "T2,write"), rule("T2,write", "T1,read")],
                vec![rule("T2,read0", "T1,write"), rule("T1,write", "T2,read")],
            ],
        ),
        AnomalyRuleSet::new(
            "Dirty Read",
            vec![
                vec![rule("T1,write", "T2,read"), rule("T2,read", "T1,rollback")],
                vec![rule("T2,write", "T1,read"), rule("T1,read", "T2,rollback")],
            ],
        ),
    ]
}

fn full_interleaving() -> Vec<Operation> {
    let mut steps = Vec::new();
    for kind in OpKind::ALL {
        for txn in Txn::BOTH {
            steps.push(Operation::new(txn, kind));
        }
    }
    steps
}

fn bench_classify(c: &mut Criterion) {
    let steps = full_interleaving();
    let rule_sets = trainer_rule_sets();
    c.bench_function("classify_trainer_rule_sets", |b| {
        b.iter(|| classify(black_box(&steps), true, black_box(&rule_sets)));
    });
}

criterion_group!(benches, bench_classify);
criterion_main!(benches);
