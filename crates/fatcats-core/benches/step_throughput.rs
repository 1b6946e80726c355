use criterion::{Criterion, criterion_group, criterion_main};
use fatcats_core::config::GameConfig;
use fatcats_core::game::action::Action;
use fatcats_core::game::env::FatCatsEnv;
use std::hint::black_box;

const STEPS_PER_ITER: usize = 1_000;

fn run_steps(env: &mut FatCatsEnv, actions: &[Action]) {
    for action in actions.iter().cycle().take(STEPS_PER_ITER) {
        let step = env.step(action).expect("valid action");
        if step.terminated {
            env.reset(None);
        }
        black_box(step.observation);
    }
}

fn step_throughput_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("step_throughput");

    for multi in [false, true] {
        let mut cfg = GameConfig::new(3, 5);
        cfg.allow_multi_bid = multi;
        let mut env = FatCatsEnv::new(cfg, Some(0)).expect("valid config");
        env.reset(None);

        let actions = if multi {
            vec![
                Action::mask_from_indices(5, &[0]),
                Action::mask_from_indices(5, &[]),
                Action::mask_from_indices(5, &[1, 3]),
            ]
        } else {
            vec![Action::Index(0), Action::Index(5), Action::Index(2)]
        };

        let label = if multi { "multi_bid" } else { "single_bid" };
        group.bench_function(label, |b| b.iter(|| run_steps(&mut env, &actions)));
    }

    group.finish();
}

criterion_group!(benches, step_throughput_bench);
criterion_main!(benches);
