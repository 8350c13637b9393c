use std::time::Duration;

use hotkey_cache::{Config, HotKeyCache, RuleConfig};

fn main() {
    // Sketch disabled: caching here is driven purely by the whitelist rules.
    let detector = HotKeyCache::new(&Config {
        local_cache_cap: 100,
        ttl: Duration::from_millis(500),
        whitelist: vec![
            RuleConfig {
                mode: "pattern".to_owned(),
                value: "^session:".to_owned(),
                ttl: Some(Duration::from_secs(2)),
            },
            RuleConfig {
                mode: "key".to_owned(),
                value: "page:home".to_owned(),
                // No TTL of its own: inherits the default above.
                ttl: None,
            },
        ],
        ..Config::default()
    })
    .expect("valid configuration");

    detector.add_with_value("session:42", "alice".to_owned(), 1);
    detector.add_with_value("metrics:internal", "counters".to_owned(), 1);
    detector.add_with_value("page:home", "<html>".to_owned(), 1);

    for key in ["session:42", "metrics:internal", "page:home"] {
        match detector.get(key) {
            Some(value) => println!("{key} -> {value}"),
            None => println!("{key} -> (not cached)"),
        }
    }
}
