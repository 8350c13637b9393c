use std::time::Duration;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use hotkey_cache::{Config, HotKeyCache, RuleConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Zipf};

const TTL: Duration = Duration::from_millis(100);

fn zipf_keys(count: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let zipf = Zipf::new(1_000, 2.0).expect("zipf parameters");
    (0..count)
        .map(|_| (zipf.sample(&mut rng) as u64).to_string())
        .collect()
}

fn detector(auto_cache: bool, whitelist: Vec<RuleConfig>) -> HotKeyCache<String> {
    HotKeyCache::new(&Config {
        hot_key_count: 100,
        local_cache_cap: 100,
        auto_cache,
        ttl: TTL,
        whitelist,
        ..Config::default()
    })
    .expect("valid configuration")
}

fn run_mixed(detector: &HotKeyCache<String>, keys: &[String], write_ratio: f64) {
    let mut rng = StdRng::seed_from_u64(7);
    for key in keys {
        if rng.gen_bool(write_ratio) {
            detector.add_with_value(key, key.clone(), 1);
        } else {
            black_box(detector.get(key));
        }
    }
}

fn bench_auto_cache_writes(c: &mut Criterion) {
    let keys = zipf_keys(10_000, 1234);
    for (name, ratio) in [
        ("hotkey_auto_cache_write_1pct", 0.01),
        ("hotkey_auto_cache_write_10pct", 0.1),
        ("hotkey_auto_cache_write_50pct", 0.5),
        ("hotkey_auto_cache_write_100pct", 1.0),
    ] {
        c.bench_function(name, |b| {
            let detector = detector(true, Vec::new());
            b.iter(|| run_mixed(&detector, &keys, ratio));
        });
    }
}

fn bench_whitelist(c: &mut Criterion) {
    let keys = zipf_keys(10_000, 2024);
    let one_rule = vec![pattern_rule("[0-9]{1,3}")];
    let many_rules = vec![
        pattern_rule("[0-1]{1,3}"),
        pattern_rule("[2-3]{1,3}"),
        pattern_rule("[4-5]{1,3}"),
        pattern_rule(".*"),
    ];
    for (name, rules) in [
        ("hotkey_whitelist_1_rule_write_10pct", one_rule),
        ("hotkey_whitelist_4_rules_write_10pct", many_rules),
    ] {
        c.bench_function(name, |b| {
            let detector = detector(false, rules.clone());
            b.iter(|| run_mixed(&detector, &keys, 0.1));
        });
    }
}

fn bench_fading(c: &mut Criterion) {
    let keys = zipf_keys(50_000, 99);
    let detector = detector(true, Vec::new());
    for key in &keys {
        detector.add_with_value(key, key.clone(), 1);
    }
    c.bench_function("hotkey_fading", |b| {
        b.iter(|| detector.fading());
    });
}

fn pattern_rule(value: &str) -> RuleConfig {
    RuleConfig {
        mode: "pattern".to_owned(),
        value: value.to_owned(),
        ttl: Some(TTL),
    }
}

criterion_group!(
    benches,
    bench_auto_cache_writes,
    bench_whitelist,
    bench_fading
);
criterion_main!(benches);
