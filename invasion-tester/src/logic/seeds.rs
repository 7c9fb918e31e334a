use anyhow::{Context, Result, bail};
use std::collections::HashSet;

/// Widest span a single `a..b` token may expand to.
const MAX_RANGE_SPAN: u64 = 10_000;

/// A resolved seed plus the CLI token it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub source: String,
}

impl SeedInfo {
    #[must_use]
    pub fn new(seed: u64, source: impl Into<String>) -> Self {
        Self {
            seed,
            source: source.into(),
        }
    }
}

fn parse_single(token: &str) -> Option<u64> {
    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        return u64::from_str_radix(&hex.replace('_', ""), 16).ok();
    }
    if let Ok(value) = token.parse::<u64>() {
        return Some(value);
    }
    token.parse::<i64>().ok().map(i64::unsigned_abs)
}

fn parse_range(token: &str) -> Result<Option<Vec<u64>>> {
    let Some((start, end)) = token.split_once("..") else {
        return Ok(None);
    };
    let start = parse_single(start).with_context(|| format!("bad range start in {token}"))?;
    let end = parse_single(end).with_context(|| format!("bad range end in {token}"))?;
    if end <= start {
        bail!("Empty seed range: {token}");
    }
    if end - start > MAX_RANGE_SPAN {
        bail!("Seed range {token} spans more than {MAX_RANGE_SPAN} seeds");
    }
    Ok(Some((start..end).collect()))
}

/// Resolve CLI seed tokens into concrete seeds.
///
/// Accepts decimal integers (negatives fold to their magnitude), `0x` hex,
/// and half-open `a..b` ranges. Duplicates keep their first position.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut resolved = Vec::new();
    let mut seen = HashSet::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }
        let seeds = match parse_range(token)? {
            Some(range) => range,
            None => match parse_single(token) {
                Some(seed) => vec![seed],
                None => bail!("Unrecognized seed token: {token}"),
            },
        };
        for seed in seeds {
            if seen.insert(seed) {
                resolved.push(SeedInfo::new(seed, token.clone()));
            }
        }
    }

    if resolved.is_empty() {
        bail!("No seeds provided");
    }
    Ok(resolved)
}
