//! Tracker hostname extraction.

use std::collections::HashSet;

use url::{Host, Url};

use qbt_rules_types::Tracker;

/// Returns the hostnames of `trackers`, deduplicated in order of first appearance.
///
/// Entries whose URL does not parse or carries no host (DHT/PeX/LSD pseudo-trackers, bare
/// hostnames without a scheme) are skipped.
pub fn tracker_hostnames(trackers: &[Tracker]) -> Vec<String> {
    let mut seen = HashSet::new();
    trackers
        .iter()
        .filter_map(|tracker| hostname(&tracker.url))
        .filter(|host| seen.insert(host.clone()))
        .collect()
}

/// Brings a hostname to the form [`tracker_hostnames`] reports: lowercase, with internationalized
/// labels in punycode (`bücher.example` becomes `xn--bcher-kva.example`).
pub fn normalize_hostname(host: &str) -> String {
    if host.is_ascii() && !host.contains('%') {
        return host.to_ascii_lowercase();
    }
    // Non-special schemes such as udp:// keep the host opaque, http:// applies IDNA.
    Url::parse(&format!("http://{host}/"))
        .ok()
        .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
        .unwrap_or_else(|| host.to_lowercase())
}

fn hostname(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let host = match url.host()? {
        Host::Domain(domain) => normalize_hostname(domain),
        Host::Ipv4(addr) => addr.to_string(),
        Host::Ipv6(addr) => addr.to_string(),
    };
    (!host.is_empty()).then_some(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trackers(urls: &[&str]) -> Vec<Tracker> {
        urls.iter()
            .map(|url| Tracker {
                url: url.to_string(),
            })
            .collect()
    }

    #[test]
    fn duplicates_keep_first_appearance_order() {
        let hosts = tracker_hostnames(&trackers(&[
            "udp://b.example.org:6969/announce",
            "https://a.example.com/announce?passkey=1",
            "http://b.example.org:80/announce",
            "udp://A.Example.com:1337",
            "https://c.example.net/announce",
        ]));

        assert_eq!(
            hosts,
            vec!["b.example.org", "a.example.com", "c.example.net"]
        );
    }

    #[test]
    fn malformed_urls_are_skipped() {
        let hosts = tracker_hostnames(&trackers(&[
            "",
            "** [DHT] **",
            "** [PeX] **",
            "** [LSD] **",
            "tracker.example.com/announce",
            "http://",
            "http://[::1",
            "udp://tracker.example.com:6969",
        ]));

        assert_eq!(hosts, vec!["tracker.example.com"]);
    }

    #[test]
    fn ip_hosts() {
        let hosts = tracker_hostnames(&trackers(&[
            "http://10.0.0.1:8080/announce",
            "udp://[2001:db8::1]:6969/announce",
        ]));

        assert_eq!(hosts, vec!["10.0.0.1", "2001:db8::1"]);
    }

    #[test]
    fn internationalized_hosts_use_punycode() {
        let hosts = tracker_hostnames(&trackers(&[
            "http://bücher.example/announce",
            "udp://BÜCHER.example:6969/announce",
            "udp://b%C3%BCcher.example:6969",
            "https://xn--bcher-kva.example/announce",
        ]));

        assert_eq!(hosts, vec!["xn--bcher-kva.example"]);
    }

    #[test]
    fn normalization() {
        assert_eq!(normalize_hostname("bücher.example"), "xn--bcher-kva.example");
        assert_eq!(normalize_hostname("Tracker.Example.com"), "tracker.example.com");
        assert_eq!(normalize_hostname("10.0.0.1"), "10.0.0.1");
    }

    #[test]
    fn empty_input() {
        assert!(tracker_hostnames(&[]).is_empty());
    }
}
