//! Bucketing of raw click attributes into breakdown categories

use url::Url;
use woothee::parser::Parser;

use super::models::DeviceClass;

pub const DIRECT: &str = "Direct";
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Well-known referrer sources, matched on the registrable host
const KNOWN_SOURCES: &[(&str, &[&str])] = &[
    ("LinkedIn", &["linkedin.com", "lnkd.in"]),
    ("Facebook", &["facebook.com", "fb.com", "fb.me"]),
    ("Twitter", &["twitter.com", "t.co", "x.com"]),
    ("Bitly", &["bit.ly", "bitly.com"]),
    ("Instagram", &["instagram.com"]),
    ("Reddit", &["reddit.com", "redd.it"]),
    ("YouTube", &["youtube.com", "youtu.be"]),
];

impl DeviceClass {
    /// Classify a `User-Agent` header using woothee's device categories
    pub fn from_user_agent(ua: Option<&str>) -> Self {
        let ua = match ua {
            Some(s) if !s.trim().is_empty() => s,
            _ => return DeviceClass::Unknown,
        };

        let Some(result) = Parser::new().parse(ua) else {
            return DeviceClass::Unknown;
        };

        match result.category {
            "pc" => DeviceClass::Desktop,
            "smartphone" | "mobilephone" => {
                if result.os == "iPad" || ua.contains("Tablet") {
                    DeviceClass::Tablet
                } else {
                    DeviceClass::Mobile
                }
            }
            "appliance" | "crawler" | "misc" => DeviceClass::Other,
            _ => DeviceClass::Unknown,
        }
    }
}

/// Map a referrer to the source name shown in the referrer breakdown.
///
/// Missing or blank referrers are direct traffic. Known sources collapse to
/// their brand name, any other host is reported as-is and anything that does
/// not parse as a host lands in `Other`.
pub fn referrer_source(referrer: Option<&str>) -> String {
    let raw = match referrer.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return DIRECT.to_string(),
    };

    let Some(host) = referrer_host(raw) else {
        return super::CategoryBreakdown::OTHER.to_string();
    };

    if host.split('.').any(|label| label == "google") {
        return "Google".to_string();
    }

    for (name, domains) in KNOWN_SOURCES {
        let matched = domains
            .iter()
            .any(|d| host == *d || host.ends_with(&format!(".{d}")));
        if matched {
            return (*name).to_string();
        }
    }

    host
}

fn referrer_host(raw: &str) -> Option<String> {
    let parsed = if raw.contains("://") {
        Url::parse(raw).ok()?
    } else {
        Url::parse(&format!("https://{raw}")).ok()?
    };

    let host = parsed.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    if host.contains('.') {
        Some(host)
    } else {
        None
    }
}

/// Country label, `Unknown` when unresolved
pub fn country_label(country: Option<&str>) -> String {
    match country.map(str::trim) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => UNKNOWN_COUNTRY.to_string(),
    }
}
