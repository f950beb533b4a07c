//! JSON Patch (RFC 6902) diffs between flat records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use curator_contracts::Record;

/// One RFC 6902 operation.
///
/// Serializes to the standard wire shape:
/// `{ "op": "add", "path": "/organ", "value": "heart" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOp {
    Add { path: String, value: Value },
    Replace { path: String, value: Value },
    Remove { path: String },
}

impl PatchOp {
    fn op_name(&self) -> &'static str {
        match self {
            PatchOp::Add { .. } => "add",
            PatchOp::Replace { .. } => "replace",
            PatchOp::Remove { .. } => "remove",
        }
    }

    fn path(&self) -> &str {
        match self {
            PatchOp::Add { path, .. }
            | PatchOp::Replace { path, .. }
            | PatchOp::Remove { path } => path,
        }
    }

    fn value_key(&self) -> String {
        match self {
            PatchOp::Add { value, .. } | PatchOp::Replace { value, .. } => value.to_string(),
            PatchOp::Remove { .. } => String::new(),
        }
    }
}

/// Escape a field name for use as a JSON Pointer token: `~` becomes `~0`,
/// `/` becomes `~1`, in that order.
fn pointer(field: &str) -> String {
    format!("/{}", field.replace('~', "~0").replace('/', "~1"))
}

/// The operations turning `before` into `after`.
///
/// Records are flat, so every operation targets a top-level pointer. The
/// result is unsorted; callers concatenate per-phase diffs and sort once
/// with [`sort_ops`].
pub fn diff(before: &Record, after: &Record) -> Vec<PatchOp> {
    let mut ops = Vec::new();

    for (field, old) in before {
        match after.get(field) {
            None => ops.push(PatchOp::Remove {
                path: pointer(field),
            }),
            Some(new) if new != old => ops.push(PatchOp::Replace {
                path: pointer(field),
                value: new.clone(),
            }),
            Some(_) => {}
        }
    }
    for (field, new) in after {
        if !before.contains_key(field) {
            ops.push(PatchOp::Add {
                path: pointer(field),
                value: new.clone(),
            });
        }
    }

    ops
}

/// Sort operations by (op, path, value) for a deterministic wire order.
pub fn sort_ops(ops: &mut [PatchOp]) {
    ops.sort_by(|a, b| {
        (a.op_name(), a.path(), a.value_key()).cmp(&(b.op_name(), b.path(), b.value_key()))
    });
}
