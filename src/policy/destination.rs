use std::fmt;

/// One `host:path` entry of the destination tag. The tag spells the target
/// path with `-` in place of `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub host: String,
    pub path: String,
}

impl Destination {
    pub fn parse(entry: &str) -> Result<Self, String> {
        let entry = entry.trim();
        let (host, path) = entry
            .split_once(':')
            .ok_or_else(|| format!("destination {:?} is missing the host:path separator", entry))?;
        let (host, path) = (host.trim(), path.trim());
        if host.is_empty() {
            return Err(format!("destination {:?} has an empty host", entry));
        }
        if path.is_empty() {
            return Err(format!("destination {:?} has an empty path", entry));
        }
        Ok(Destination {
            host: host.to_string(),
            path: path.replace('-', "/"),
        })
    }

    /// Tag spelling of this entry.
    pub fn to_tag(&self) -> String {
        format!("{}:{}", self.host, self.path.replace('/', "-"))
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.path)
    }
}

/// Splits a raw destination tag into entries, in tag order. Surrounding
/// brackets, spaces and newlines are stripped first.
pub fn split_destinations(raw: &str) -> Vec<Result<Destination, String>> {
    let cleaned = raw.trim_matches(|c| c == '[' || c == ']' || c == ' ' || c == '\n');
    if cleaned.is_empty() {
        return Vec::new();
    }
    cleaned.split(',').map(Destination::parse).collect()
}

pub fn join_destinations(destinations: &[Destination]) -> String {
    destinations
        .iter()
        .map(Destination::to_tag)
        .collect::<Vec<_>>()
        .join(",")
}
