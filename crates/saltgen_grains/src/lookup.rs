//! Delimited path lookups into a grain tree
//!
//! `"os:family"` resolves to `tree["os"]["family"]`. When the walk reaches
//! a sequence, an integer segment indexes into it (negative values count
//! from the end) and any other segment selects the first embedded mapping
//! that carries that key.

use crate::value::{FactTree, Grain};

/// Delimiter used by Salt for nested grain paths.
pub const DEFAULT_DELIMITER: &str = ":";

/// Resolve `path` against `tree`. Returns `None` if any segment is missing.
pub fn lookup<'a>(tree: &'a FactTree, path: &str, delimiter: &str) -> Option<&'a Grain> {
    let mut segments = split_path(path, delimiter);
    let first = segments.next()?;
    let mut node = tree.get(first)?;
    for segment in segments {
        node = descend(node, segment)?;
    }
    Some(node)
}

/// Resolve `path` against `tree`, falling back to `default`.
pub fn lookup_or<'a>(
    tree: &'a FactTree,
    path: &str,
    default: &'a Grain,
    delimiter: &str,
) -> &'a Grain {
    lookup(tree, path, delimiter).unwrap_or(default)
}

fn split_path<'p>(path: &'p str, delimiter: &'p str) -> Box<dyn Iterator<Item = &'p str> + 'p> {
    if delimiter.is_empty() {
        Box::new(std::iter::once(path))
    } else {
        Box::new(path.split(delimiter))
    }
}

fn descend<'a>(node: &'a Grain, segment: &str) -> Option<&'a Grain> {
    match node {
        Grain::Map(map) => map.get(segment),
        Grain::List(items) => match segment.parse::<i64>() {
            Ok(index) => index_sequence(items, index),
            Err(_) => items.iter().find_map(|item| match item {
                Grain::Map(map) => map.get(segment),
                _ => None,
            }),
        },
        _ => None,
    }
}

fn index_sequence(items: &[Grain], index: i64) -> Option<&Grain> {
    let len = i64::try_from(items.len()).ok()?;
    let resolved = if index < 0 { len + index } else { index };
    if resolved < 0 {
        return None;
    }
    items.get(usize::try_from(resolved).ok()?)
}
