//! Admission grouper.
//!
//! # Responsibilities
//! - Pull whitelisted endpoints into a single trusted group (never probed)
//! - Bucket everything else by origin host
//! - Split hosts with more than `max_channels_per_host` endpoints into
//!   several groups keyed `host#1`, `host#2`, ...
//!
//! # Design Decisions
//! - Pure partition over disjoint `&mut` borrows; each record lands in
//!   exactly one group, so exactly one task can write it
//! - Unparseable URLs share the `unknown` bucket instead of failing
//! - Groups keep the first-seen order of their hosts

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use crate::model::Endpoint;

/// Host bucket for URLs whose authority cannot be parsed.
pub const UNKNOWN_HOST: &str = "unknown";

/// Endpoints sharing one origin host, at most `max_channels_per_host` long.
#[derive(Debug)]
pub struct OriginGroup<'a> {
    /// Unique group key (host, plus `#n` when the host was split).
    pub key: String,
    /// Origin host used for breaker and cooldown bookkeeping.
    pub host: String,
    pub members: Vec<&'a mut Endpoint>,
}

impl OriginGroup<'_> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Result of partitioning one run's endpoints.
#[derive(Debug)]
pub struct Admission<'a> {
    /// Whitelisted endpoints, bypassing every probe.
    pub trusted: Vec<&'a mut Endpoint>,
    pub groups: Vec<OriginGroup<'a>>,
}

/// Extract the origin host from a URL authority.
///
/// Bracketed IPv6 literals keep their brackets; otherwise everything
/// before the first colon is the host. Userinfo is dropped and the
/// result is lowercased.
pub fn extract_host(url: &str) -> String {
    let Some((_, rest)) = url.trim().split_once("://") else {
        return UNKNOWN_HOST.to_string();
    };

    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let authority = match authority.rfind('@') {
        Some(at) => &authority[at + 1..],
        None => authority,
    };

    let host = if authority.starts_with('[') {
        match authority.find(']') {
            Some(end) => &authority[..=end],
            None => return UNKNOWN_HOST.to_string(),
        }
    } else {
        authority.split(':').next().unwrap_or_default()
    };

    if host.is_empty() || host == "[]" {
        UNKNOWN_HOST.to_string()
    } else {
        host.to_lowercase()
    }
}

/// Partition endpoints into the trusted group and origin groups.
pub fn partition<'a>(
    endpoints: &'a mut [Endpoint],
    whitelist: &HashSet<String>,
    max_channels_per_host: usize,
) -> Admission<'a> {
    let cap = max_channels_per_host.max(1);
    let mut trusted = Vec::new();
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<&'a mut Endpoint>> = HashMap::new();

    for endpoint in endpoints.iter_mut() {
        if endpoint.is_whitelisted(whitelist) {
            trusted.push(endpoint);
            continue;
        }

        match buckets.entry(extract_host(&endpoint.url)) {
            Entry::Occupied(mut entry) => entry.get_mut().push(endpoint),
            Entry::Vacant(entry) => {
                order.push(entry.key().clone());
                entry.insert(vec![endpoint]);
            }
        }
    }

    let mut groups = Vec::with_capacity(order.len());
    for host in order {
        let Some(mut rest) = buckets.remove(&host) else {
            continue;
        };

        if rest.len() <= cap {
            groups.push(OriginGroup {
                key: host.clone(),
                host,
                members: rest,
            });
            continue;
        }

        let mut ordinal = 1;
        while !rest.is_empty() {
            let tail = rest.split_off(cap.min(rest.len()));
            groups.push(OriginGroup {
                key: format!("{}#{}", host, ordinal),
                host: host.clone(),
                members: rest,
            });
            rest = tail;
            ordinal += 1;
        }
    }

    Admission { trusted, groups }
}
