//! The schema-compliance phase: shaping a record to the target schema.

use serde_json::Value;
use tracing::debug;

use curator_contracts::Record;
use curator_provenance::ProcessingLog;

use crate::schema::TargetSchema;

/// Shapes records to the target schema's field set and order.
///
/// Borrows the schema read-only; one shared `TargetSchema` serves any
/// number of concurrent `apply` calls.
#[derive(Debug, Clone, Copy)]
pub struct SchemaApplier<'a> {
    schema: &'a TargetSchema,
}

impl<'a> SchemaApplier<'a> {
    pub fn new(schema: &'a TargetSchema) -> Self {
        Self { schema }
    }

    /// Produce a record holding exactly the schema's fields, in
    /// declaration order.
    ///
    /// A field present in `record` is carried over; a missing field is
    /// filled from its declared default, or `null` when it has none. Input
    /// fields the schema does not declare are dropped and recorded in
    /// `log.excluded_data`.
    pub fn apply(&self, record: &Record, log: &mut ProcessingLog) -> Record {
        let mut shaped = Record::new();
        for spec in self.schema.fields() {
            let value = match record.get(&spec.name) {
                Some(value) => value.clone(),
                None => spec.default_value.clone().unwrap_or(Value::Null),
            };
            shaped.insert(spec.name.clone(), value);
        }

        for (field, value) in record {
            if self.schema.field(field).is_none() {
                debug!(field = %field, "excluding field not in target schema");
                log.add_excluded_field(field, value.clone());
            }
        }

        shaped
    }
}
