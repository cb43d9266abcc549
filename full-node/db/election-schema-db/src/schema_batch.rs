use std::collections::{BTreeMap, HashMap};

use crate::metrics::SCHEMADB_BATCH_PUT_LATENCY_SECONDS;
use crate::schema::{ColumnFamilyName, KeyCodec, ValueCodec};
use crate::{Operation, Schema, SchemaKey};

/// [`SchemaBatch`] holds a collection of updates that can be applied to a DB
/// ([`Schema`]) atomically. Within one column family only the last write to a
/// key is kept.
#[derive(Debug, Default)]
pub struct SchemaBatch {
    pub(crate) last_writes: HashMap<ColumnFamilyName, BTreeMap<SchemaKey, Operation>>,
}

impl SchemaBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an insert/update operation to the batch.
    pub fn put<S: Schema>(
        &mut self,
        key: &impl KeyCodec<S>,
        value: &impl ValueCodec<S>,
    ) -> anyhow::Result<()> {
        let _timer = SCHEMADB_BATCH_PUT_LATENCY_SECONDS
            .with_label_values(&[S::COLUMN_FAMILY_NAME])
            .start_timer();
        let key = key.encode_key()?;
        let put_operation = Operation::Put {
            value: value.encode_value()?,
        };
        self.insert_operation::<S>(key, put_operation);
        Ok(())
    }

    /// Adds a delete operation to the batch.
    pub fn delete<S: Schema>(&mut self, key: &impl KeyCodec<S>) -> anyhow::Result<()> {
        let key = key.encode_key()?;
        self.insert_operation::<S>(key, Operation::Delete);

        Ok(())
    }

    /// Returns the pending operation for `key`, if the batch touches it.
    pub fn read<S: Schema>(&self, key: &impl KeyCodec<S>) -> anyhow::Result<Option<&Operation>> {
        let key = key.encode_key()?;
        Ok(self
            .last_writes
            .get(&S::COLUMN_FAMILY_NAME)
            .and_then(|column_writes| column_writes.get(&key)))
    }

    /// Moves every write of `other` into `self`; writes in `other` win.
    pub fn merge(&mut self, other: SchemaBatch) {
        for (cf_name, other_cf_map) in other.last_writes {
            let self_cf_map = self.last_writes.entry(cf_name).or_default();

            for (key, operation) in other_cf_map {
                self_cf_map.insert(key, operation);
            }
        }
    }

    /// Number of distinct rows the batch will write.
    pub fn len(&self) -> usize {
        self.last_writes.values().map(BTreeMap::len).sum()
    }

    /// Whether the batch contains no writes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert_operation<S: Schema>(&mut self, key: SchemaKey, operation: Operation) {
        let column_writes = self.last_writes.entry(S::COLUMN_FAMILY_NAME).or_default();
        column_writes.insert(key, operation);
    }
}
