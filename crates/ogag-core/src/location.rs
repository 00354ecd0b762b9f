//! Page URL state: path, ordered query parameters and history replacement.

use std::fmt;

/// Ordered, repeatable query parameters (`application/x-www-form-urlencoded`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string, with or without the leading `?`.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = query
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((k, v)) => (decode(k), decode(v)),
                None => (decode(part), String::new()),
            })
            .collect();
        Self { pairs }
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `name`, in order.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn has(&self, name: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == name)
    }

    pub fn append(&mut self, name: &str, value: &str) {
        self.pairs.push((name.to_string(), value.to_string()));
    }

    /// Replace every value for `name` with a single one, keeping the position
    /// of the first occurrence.
    pub fn set(&mut self, name: &str, value: &str) {
        match self.pairs.iter().position(|(k, _)| k == name) {
            Some(first) => {
                self.pairs[first].1 = value.to_string();
                let mut index = 0;
                self.pairs.retain(|(k, _)| {
                    let keep = k != name || index == first;
                    index += 1;
                    keep
                });
            }
            None => self.append(name, value),
        }
    }

    pub fn delete(&mut self, name: &str) {
        self.pairs.retain(|(k, _)| k != name);
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded: Vec<String> = self
            .pairs
            .iter()
            .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
            .collect();
        write!(f, "{}", encoded.join("&"))
    }
}

/// The page URL plus a log of non-navigating history replacements.
#[derive(Debug, Clone, Default)]
pub struct Location {
    path: String,
    query: QueryParams,
    replaced: Vec<String>,
}

impl Location {
    /// Parse a path with optional query, e.g. `/collections/rings?tag=gold`.
    /// Any fragment is dropped.
    pub fn parse(url: &str) -> Self {
        let url = url.split('#').next().unwrap_or_default();
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path, QueryParams::parse(query)),
            None => (url, QueryParams::new()),
        };
        Self {
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            query,
            replaced: Vec::new(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    /// Path plus query string.
    pub fn href(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }

    /// Swap the query without navigating (`history.replaceState`).
    pub fn replace_query(&mut self, query: QueryParams) {
        self.query = query;
        self.replaced.push(self.href());
    }

    /// Every URL written by [`Location::replace_query`], oldest first.
    pub fn replaced_urls(&self) -> &[String] {
        &self.replaced
    }
}

fn encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'*' => out.push(b as char),
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}

fn decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => match (hex(bytes[i + 1]), hex(bytes[i + 2])) {
                (Some(hi), Some(lo)) => {
                    out.push(hi << 4 | lo);
                    i += 2;
                }
                _ => out.push(b'%'),
            },
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repeated_params() {
        let q = QueryParams::parse("?tag=gold&tag=rings&price_min=10");
        assert_eq!(q.get_all("tag"), vec!["gold", "rings"]);
        assert_eq!(q.get("price_min"), Some("10"));
        assert_eq!(q.get("price_max"), None);
    }

    #[test]
    fn test_decode() {
        let q = QueryParams::parse("tag=rose+gold&metal=18k%20white&bad=%zz&trail=%4");
        assert_eq!(q.get("tag"), Some("rose gold"));
        assert_eq!(q.get("metal"), Some("18k white"));
        assert_eq!(q.get("bad"), Some("%zz"));
        assert_eq!(q.get("trail"), Some("%4"));
    }

    #[test]
    fn test_encode_roundtrip_of_special_characters() {
        let mut q = QueryParams::new();
        q.append("tag", "rose gold & co");
        let s = q.to_string();
        assert_eq!(s, "tag=rose+gold+%26+co");
        assert_eq!(QueryParams::parse(&s).get("tag"), Some("rose gold & co"));
    }

    #[test]
    fn test_set_replaces_all_values() {
        let mut q = QueryParams::parse("sort=a&tag=x&sort=b");
        q.set("sort", "price");
        assert_eq!(q.to_string(), "sort=price&tag=x");
    }

    #[test]
    fn test_location_replace_query() {
        let mut loc = Location::parse("/collections/rings?page=2#top");
        assert_eq!(loc.path(), "/collections/rings");
        assert_eq!(loc.href(), "/collections/rings?page=2");

        let mut q = loc.query().clone();
        q.append("tag", "gold");
        loc.replace_query(q);
        assert_eq!(loc.href(), "/collections/rings?page=2&tag=gold");
        assert_eq!(loc.replaced_urls().len(), 1);

        loc.replace_query(QueryParams::new());
        assert_eq!(loc.href(), "/collections/rings");
    }
}
