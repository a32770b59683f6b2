use anyhow::{anyhow, Result};

#[derive(Debug, PartialEq, Default)]
pub struct ParsedInput {
    pub name: String,
    /// `key:value` pairs in the order given; keys may repeat (e.g. `tag:`).
    pub metadata: Vec<(String, String)>,
}

impl ParsedInput {
    /// Last value given for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.metadata
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Rewrites every key to its full name among `candidates`. Keys that do
    /// not expand are dropped and reported as warnings.
    pub fn normalize_keys(&mut self, candidates: &[&str]) -> Vec<String> {
        let mut warnings = Vec::new();
        let metadata = std::mem::take(&mut self.metadata);
        for (key, value) in metadata {
            match expand_key(&key, candidates) {
                Ok(full_key) => self.metadata.push((full_key, value)),
                Err(e) => warnings.push(e.to_string()),
            }
        }
        warnings
    }
}

pub fn parse_args(args: &[String]) -> ParsedInput {
    let mut name_parts = Vec::new();
    let mut metadata = Vec::new();

    for arg in args {
        if let Some((key, value)) = arg.split_once(':') {
            if !key.is_empty() && !key.contains(char::is_whitespace) {
                metadata.push((key.to_string(), value.to_string()));
                continue;
            }
        }
        name_parts.push(arg.as_str());
    }

    ParsedInput {
        name: name_parts.join(" "),
        metadata,
    }
}

pub fn expand_key(key: &str, candidates: &[&str]) -> Result<String> {
    // 1. Exact match
    if candidates.contains(&key) {
        return Ok(key.to_string());
    }

    // 2. Prefix match
    let matches: Vec<&str> = candidates
        .iter()
        .filter(|&&c| c.starts_with(key))
        .cloned()
        .collect();

    match matches.len() {
        1 => Ok(matches[0].to_string()),
        0 => Err(anyhow!("Unknown key: '{}'", key)),
        _ => Err(anyhow!("Ambiguous key: '{}' matches {:?}", key, matches)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_simple() {
        let parsed = parse_args(&args(&["Buy", "milk", "desc:two liters", "status:doing"]));
        assert_eq!(parsed.name, "Buy milk");
        assert_eq!(parsed.get("desc"), Some("two liters"));
        assert_eq!(parsed.get("status"), Some("doing"));
    }

    #[test]
    fn test_repeated_keys_are_kept() {
        let parsed = parse_args(&args(&["Idea", "tag:work", "tag:later"]));
        assert_eq!(parsed.get_all("tag").collect::<Vec<_>>(), vec!["work", "later"]);
        assert_eq!(parsed.get("tag"), Some("later"));
    }

    #[test]
    fn test_leading_colon_stays_in_name() {
        let parsed = parse_args(&args(&[":)", "smile"]));
        assert_eq!(parsed.name, ":) smile");
        assert!(parsed.metadata.is_empty());
    }

    #[test]
    fn test_normalize_keys() {
        let mut parsed = parse_args(&args(&["x", "d:text", "t:a", "zz:1"]));
        let warnings = parsed.normalize_keys(&["description", "tag", "status"]);
        assert_eq!(parsed.get("description"), Some("text"));
        assert_eq!(parsed.get("tag"), Some("a"));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_expand_key() {
        let candidates = vec!["description", "status", "stamp"];

        assert_eq!(expand_key("d", &candidates).unwrap(), "description");
        assert_eq!(expand_key("desc", &candidates).unwrap(), "description");
        assert_eq!(expand_key("stat", &candidates).unwrap(), "status");

        // Ambiguous
        assert!(expand_key("st", &candidates).is_err());

        // Unknown
        assert!(expand_key("x", &candidates).is_err());
    }
}
