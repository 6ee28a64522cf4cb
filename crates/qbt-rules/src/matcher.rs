//! First-match rule evaluation over tracker hostnames.

use std::fmt;

use tracing::debug;

use crate::rules::RuleSet;

/// Settings chosen for a torrent. Both may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decision {
    /// Category to assign.
    pub category: Option<String>,
    /// Upload limit in KiB/s.
    pub up_limit_kib: Option<i64>,
}

impl Decision {
    /// Returns true if nothing is to be applied.
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.up_limit_kib.is_none()
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("no rules applied");
        }
        let mut applied = Vec::with_capacity(2);
        if let Some(category) = &self.category {
            applied.push(format!("category={category}"));
        }
        if let Some(limit) = self.up_limit_kib {
            applied.push(format!("up_limit_kib={limit}"));
        }
        f.write_str(&applied.join(", "))
    }
}

/// Picks the settings for a torrent whose trackers resolve to `hosts`.
///
/// Hosts are scanned in order and, for each host, rules in priority order. The first host that
/// matches any rule decides, so a lower priority rule hit by an earlier host wins over a higher
/// priority rule hit by a later host. Without any hit the defaults apply.
pub fn match_rules(hosts: &[String], rule_set: &RuleSet) -> Decision {
    for host in hosts {
        for (index, rule) in rule_set.rules().iter().enumerate() {
            if rule.matches(host) {
                debug!("Host {host} matched rule #{index}");
                return Decision {
                    category: rule.category.clone(),
                    up_limit_kib: rule.up_limit_kib,
                };
            }
        }
    }

    debug!("No rule matched {hosts:?}, using defaults");
    let defaults = rule_set.defaults();
    Decision {
        category: defaults.category.clone(),
        up_limit_kib: defaults.up_limit_kib,
    }
}

/// Converts KiB/s to the bytes/s the WebUI expects. Negative limits floor at 0 (unlimited).
pub fn kib_to_bytes(kib: i64) -> u64 {
    u64::try_from(kib).unwrap_or(0).saturating_mul(1024)
}
