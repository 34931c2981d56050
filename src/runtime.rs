//! Physical thread-pool setup. The logical worker grid W (segment count) is
//! chosen separately by the solver; this only sizes the rayon pool backing it.

use rayon::ThreadPoolBuilder;
use std::sync::Once;

struct ThreadConfig {
    count: usize,
    source: String,
}

fn parse_env_threads(keys: &[&str]) -> Option<ThreadConfig> {
    for &key in keys {
        if let Ok(v) = std::env::var(key) {
            if let Ok(val) = v.parse::<usize>() {
                if val > 0 {
                    return Some(ThreadConfig {
                        count: val,
                        source: key.to_string(),
                    });
                }
            }
        }
    }
    None
}

fn detect_thread_config() -> ThreadConfig {
    const ENV_HINTS: [&str; 4] = [
        "COPA_THREADS",
        "RAYON_NUM_THREADS",
        "SLURM_CPUS_PER_TASK",
        "OMP_NUM_THREADS",
    ];

    if let Some(cfg) = parse_env_threads(&ENV_HINTS) {
        return cfg;
    }

    let fallback = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .max(1);

    ThreadConfig {
        count: fallback,
        source: "available_parallelism".to_string(),
    }
}

pub fn configure_thread_pool() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let cfg = detect_thread_config();
        match ThreadPoolBuilder::new()
            .num_threads(cfg.count)
            .thread_name(|i| format!("copa-worker-{i}"))
            .build_global()
        {
            Ok(_) => {
                eprintln!(
                    "[threads] rayon pool = {} threads (hint: {})",
                    cfg.count, cfg.source
                );
            }
            Err(err) => {
                eprintln!(
                    "[threads] warn: failed to configure rayon pool ({err}); continuing with default"
                );
            }
        }
    });
}

/// Default logical worker count: the thread hint rounded down to a power of
/// two. The grid must be a power of two for the halving merge network.
pub fn default_worker_count() -> usize {
    let threads = detect_thread_config().count;
    if threads.is_power_of_two() {
        threads
    } else {
        threads.next_power_of_two() >> 1
    }
}
