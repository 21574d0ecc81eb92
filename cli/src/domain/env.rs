//! Environment variable resolution for `--env NAME[=VALUE]`.

use std::collections::BTreeMap;

/// Build the app environment from `NAME` / `NAME=VALUE` tokens.
///
/// A token without a value (or with an empty one) takes its value from the
/// first `process_env` entry that *starts with* `NAME`, so `--env BAZ` also
/// matches `BAZINGA=1`. Later tokens overwrite earlier ones.
#[must_use]
pub fn resolve_environment<S: AsRef<str>>(
    tokens: &[S],
    process_env: &[String],
) -> BTreeMap<String, String> {
    let mut environment = BTreeMap::new();
    for token in tokens {
        let (name, value) = split_pair(token.as_ref());
        let value = if value.is_empty() {
            lookup_prefix(name, process_env)
        } else {
            value
        };
        environment.insert(name.to_string(), value.to_string());
    }
    environment
}

fn lookup_prefix<'a>(name: &str, process_env: &'a [String]) -> &'a str {
    process_env
        .iter()
        .find(|entry| entry.starts_with(name))
        .map_or("", |entry| split_pair(entry).1)
}

fn split_pair(pair: &str) -> (&str, &str) {
    pair.split_once('=').unwrap_or((pair, ""))
}
