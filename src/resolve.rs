//! Cross-field path resolution.
//!
//! A variable-length node may declare its length as a path to another field
//! of the same document. Resolution walks the context chain built up by the
//! recursive codec calls: leading `^`/`~` sentinels ascend the chain, then
//! the remaining segments descend through the (partially) known container
//! values. The definition-order invariant is enforced at the first descent
//! step: a node may only reference keys/elements defined strictly before its
//! own position in the container where resolution lands. Anything earlier is
//! fully decoded (or fully supplied) by the time the reference is needed, so
//! the invariant is exactly what rules out infinite regress.

use crate::context::{format_path, Container, Context, Segment};
use crate::error::Error;
use crate::value::Value;

/// Resolves `path` against `ctx`. An empty path (after sentinel stripping)
/// yields the landing container's value itself.
pub(crate) fn resolve(path: &[Segment], ctx: &Context) -> Result<Value, Error> {
    // Strip leading ascension sentinels by walking the parent chain. A
    // context without a container is the synthetic root of the call and
    // cannot host resolution.
    let mut cur: &Context = ctx;
    let mut rest: &[Segment] = path;
    loop {
        match rest.first() {
            Some(Segment::Parent) => {
                rest = &rest[1..];
                match cur.parent {
                    Some(parent) if !matches!(parent.container, Container::None) => cur = parent,
                    _ => return Err(no_parent(path, ctx)),
                }
            }
            Some(Segment::Root) => {
                rest = &rest[1..];
                while let Some(parent) = cur.parent {
                    if matches!(parent.container, Container::None) {
                        break;
                    }
                    cur = parent;
                }
            }
            _ => break,
        }
    }
    if matches!(cur.container, Container::None) {
        return Err(no_parent(path, ctx));
    }

    let Some(first) = rest.first() else {
        return Ok(cur.value.cloned().unwrap_or(Value::Undefined));
    };

    // First descent step: enforce the definition-order invariant against the
    // landing context's own position in its container.
    let start = match cur.container {
        Container::None => return Err(no_parent(path, ctx)),
        Container::Object(fields) => {
            let Segment::Key(target) = first else {
                return Err(ctx.error(format!(
                    "Invalid key {first} in path {}, key of an object must be a string",
                    format_path(rest)
                )));
            };
            let keys = fields
                .iter()
                .map(|(k, _)| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let not_found = || {
                ctx.error(format!(
                    "Failed to resolve {} on {{ {keys} }}, key not found",
                    format_path(rest)
                ))
            };
            let target_idx = fields
                .iter()
                .position(|(k, _)| k == target)
                .ok_or_else(not_found)?;
            let own = match cur.path.last() {
                Some(Segment::Key(k)) => k.clone(),
                _ => return Err(not_found()),
            };
            let own_idx = fields
                .iter()
                .position(|(k, _)| *k == own)
                .ok_or_else(not_found)?;
            if target_idx >= own_idx {
                return Err(ctx.error(format!(
                    "Failed to resolve {} on {{ {keys} }} from element {own}, \
                     you can only reference keys defined before the current one.",
                    format_path(rest)
                )));
            }
            cur.value
                .and_then(Value::as_object)
                .and_then(|map| map.get(target))
                .ok_or_else(not_found)?
        }
        Container::Array => {
            let Segment::Index(target) = first else {
                return Err(ctx.error(format!(
                    "Invalid key {first} in path {}, key of an array must be a number",
                    format_path(rest)
                )));
            };
            let own = match cur.path.last() {
                Some(Segment::Index(i)) => *i,
                _ => return Err(no_parent(path, ctx)),
            };
            if *target >= own {
                return Err(ctx.error(format!(
                    "Failed to resolve {} from index {own}, \
                     you can only reference elements defined before the current one",
                    format_path(rest)
                )));
            }
            cur.value
                .and_then(Value::as_array)
                .and_then(|items| items.get(*target))
                .ok_or_else(|| {
                    ctx.error(format!(
                        "Failed to resolve {}, index {target} out of bounds",
                        format_path(rest)
                    ))
                })?
        }
    };

    descend(start, &rest[1..], ctx)
}

/// Walks the remaining segments through plain values. Everything below the
/// first step is strictly earlier in the document, so no ordering checks are
/// needed here.
fn descend(start: &Value, mut rest: &[Segment], ctx: &Context) -> Result<Value, Error> {
    let mut data = start;
    while let Some(segment) = rest.first() {
        data = match data {
            Value::Object(map) => {
                let Segment::Key(key) = segment else {
                    return Err(ctx.error(format!(
                        "Invalid key {segment} in path {}, key of an object must be a string",
                        format_path(rest)
                    )));
                };
                map.get(key).ok_or_else(|| {
                    ctx.error(format!(
                        "Failed to resolve {} on {data}, key not found",
                        format_path(rest)
                    ))
                })?
            }
            Value::Array(items) => {
                let Segment::Index(index) = segment else {
                    return Err(ctx.error(format!(
                        "Invalid key {segment} in path {}, key of an array must be a number",
                        format_path(rest)
                    )));
                };
                items.get(*index).ok_or_else(|| {
                    ctx.error(format!(
                        "Failed to resolve {}, index {index} out of bounds",
                        format_path(rest)
                    ))
                })?
            }
            other => {
                return Err(ctx.error(format!(
                    "Failed to resolve {}, can't index into value {other}",
                    format_path(rest)
                )))
            }
        };
        rest = &rest[1..];
    }
    Ok(data.clone())
}

fn no_parent(path: &[Segment], ctx: &Context) -> Error {
    ctx.error(format!(
        "Failed to resolve {}, no parent found",
        format_path(path)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Length;
    use crate::path;
    use crate::types::{string, uint8};

    fn shape() -> Vec<(String, crate::Schema)> {
        vec![
            ("a".to_owned(), uint8()),
            ("b".to_owned(), string(Length::Fill)),
        ]
    }

    #[test]
    fn test_no_parent_at_root() {
        let root = Context::root(None, 0);
        let err = resolve(&path!["^"], &root).unwrap_err();
        assert_eq!(err.to_string(), "Failed to resolve .^, no parent found");
    }

    #[test]
    fn test_earlier_sibling() {
        let fields = shape();
        let partial = Value::object([("a", Value::Int(5))]);
        let root = Context::root(None, 0);
        let ctx = root.child(
            Segment::Key("b".into()),
            Container::Object(&fields),
            Some(&partial),
            None,
            1,
        );
        assert_eq!(resolve(&path!["a"], &ctx).unwrap(), Value::Int(5));
        // Empty path yields the container itself.
        assert_eq!(resolve(&[], &ctx).unwrap(), partial);
    }

    #[test]
    fn test_forward_reference_rejected() {
        let fields = shape();
        let partial = Value::object([("a", Value::Int(5))]);
        let root = Context::root(None, 0);
        let ctx = root.child(
            Segment::Key("a".into()),
            Container::Object(&fields),
            Some(&partial),
            None,
            0,
        );
        let err = resolve(&path!["b"], &ctx).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to resolve .b on { a, b } from element a, \
             you can only reference keys defined before the current one."
        );
    }
}
