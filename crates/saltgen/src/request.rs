//! Grain request lists (`--attributes`, `--tags`)

use crate::record::is_reserved;
use tracing::debug;

/// Split `--attributes`/`--tags` option values into grain paths.
///
/// A value containing a comma is split on commas with all spaces removed;
/// otherwise it is split on whitespace. Repeated paths are kept once, in
/// first-seen order.
pub fn split_grain_list<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    for value in values {
        let value = value.as_ref();
        let parts: Vec<String> = if value.contains(',') {
            value
                .replace(' ', "")
                .split(',')
                .map(str::to_string)
                .collect()
        } else {
            value.split_whitespace().map(str::to_string).collect()
        };
        for part in parts {
            if !part.is_empty() && !paths.contains(&part) {
                paths.push(part);
            }
        }
    }
    paths
}

/// Remove paths that name a reserved record field.
pub fn without_reserved(paths: Vec<String>) -> Vec<String> {
    paths
        .into_iter()
        .filter(|path| {
            let reserved = is_reserved(path);
            if reserved {
                debug!("Ignoring request for reserved field '{}'", path);
            }
            !reserved
        })
        .collect()
}
