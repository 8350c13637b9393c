use std::time::Duration;

use hotkey_cache::{Config, HotKeyCache};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Zipf};

fn main() {
    let detector = HotKeyCache::new(&Config {
        hot_key_count: 10,
        local_cache_cap: 10,
        auto_cache: true,
        ttl: Duration::from_secs(1),
        ..Config::default()
    })
    .expect("valid configuration");

    // Feed a skewed stream: a handful of keys receive most of the traffic.
    let mut rng = StdRng::seed_from_u64(7);
    let zipf = Zipf::new(1_000, 1.5).expect("zipf parameters");
    for _ in 0..100_000 {
        let key = (zipf.sample(&mut rng) as u64).to_string();
        detector.add_with_value(&key, key.clone(), 1);
    }

    println!("Hottest keys:");
    for item in detector.list() {
        let cached = detector.get(&item.key).is_some();
        println!("  {:<6} count {:<8} cached {}", item.key, item.count, cached);
    }
}
