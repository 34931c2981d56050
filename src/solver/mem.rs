//! Memory budget rail for the exponential buffers.
//!
//! Budget comes from `COPA_MAX_RSS_BYTES` / `COPA_MAX_RSS_MB` / `COPA_MAX_RSS_GB`;
//! unset means no limit. The estimate check runs before the 2^k buffers are
//! allocated, the RSS probe after each half is generated.

use anyhow::{Result, bail};

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

fn parse_budget_var(var: &str, multiplier: u64) -> Option<u64> {
    let raw = std::env::var(var).ok()?;
    if raw.trim().is_empty() {
        return None;
    }
    raw.trim()
        .parse::<u64>()
        .ok()
        .map(|v| v.saturating_mul(multiplier))
}

pub fn budget_bytes() -> Option<u64> {
    parse_budget_var("COPA_MAX_RSS_BYTES", 1)
        .or_else(|| parse_budget_var("COPA_MAX_RSS_MB", MB))
        .or_else(|| parse_budget_var("COPA_MAX_RSS_GB", GB))
}

pub fn current_rss_bytes() -> Option<u64> {
    let contents = std::fs::read_to_string("/proc/self/statm").ok()?;
    let mut parts = contents.split_whitespace();
    let _total = parts.next()?;
    let resident_pages: u64 = parts.next()?.parse().ok()?;
    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if page_size <= 0 {
        return None;
    }
    Some(resident_pages.saturating_mul(page_size as u64))
}

fn bytes_to_gib(bytes: u64) -> f64 {
    bytes as f64 / GB as f64
}

/// Fails up front if the planned buffer footprint alone exceeds the budget.
pub fn check_estimate(label: &str, estimated: u64) -> Result<()> {
    if let Some(limit) = budget_bytes() {
        if estimated > limit {
            bail!(
                "{}: estimated {:.2} GiB of buffers exceeds budget {:.2} GiB (set via COPA_MAX_RSS_*)",
                label,
                bytes_to_gib(estimated),
                bytes_to_gib(limit)
            );
        }
    }
    Ok(())
}

/// Probes resident set size against the budget, if one is configured.
pub fn report_rss(label: &str) -> Result<()> {
    let Some(limit) = budget_bytes() else {
        return Ok(());
    };
    if let Some(rss) = current_rss_bytes() {
        eprintln!(
            "[mem] {} rss={:.2} GiB (limit {:.2} GiB)",
            label,
            bytes_to_gib(rss),
            bytes_to_gib(limit)
        );
        if rss > limit {
            bail!(
                "RSS {:.2} GiB exceeded budget {:.2} GiB at {} (set via COPA_MAX_RSS_*)",
                bytes_to_gib(rss),
                bytes_to_gib(limit),
                label
            );
        }
    }
    Ok(())
}
