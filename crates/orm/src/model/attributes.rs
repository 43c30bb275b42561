//! Attribute Store
//!
//! Raw attribute values of one entity instance. Reads go through the cast and
//! accessor of the column, writes through the write guard and the mutator.
//! The `*_raw` methods bypass every transform and exist for hydration.

use serde_json::Value;

use super::descriptor::ModelDescriptor;
use crate::backends::Record;
use crate::error::ModelResult;

/// Column -> value storage bound to a descriptor
#[derive(Debug, Clone)]
pub struct AttributeStore {
    descriptor: &'static ModelDescriptor,
    values: Record,
}

impl AttributeStore {
    pub fn new(descriptor: &'static ModelDescriptor) -> Self {
        Self {
            descriptor,
            values: Record::new(),
        }
    }

    /// Store hydrated from a backend row without guards or mutators
    pub fn from_record(descriptor: &'static ModelDescriptor, values: Record) -> Self {
        Self { descriptor, values }
    }

    pub fn descriptor(&self) -> &'static ModelDescriptor {
        self.descriptor
    }

    /// Cast and accessor transformed value, null when absent
    pub fn get(&self, column: &str) -> Value {
        let mut value = self.get_raw(column);
        if let Some(cast) = self.descriptor.casts.get(column) {
            value = cast.apply(value);
        }
        if let Some(accessor) = self.descriptor.accessors.get(column) {
            value = accessor(value);
        }
        value
    }

    /// Guarded write; the mutator runs before the value is stored
    pub fn set(&mut self, column: &str, value: Value) -> ModelResult<()> {
        self.descriptor.check_writable(column)?;
        let value = match self.descriptor.mutators.get(column) {
            Some(mutator) => mutator(value),
            None => value,
        };
        self.values.insert(column.to_string(), value);
        Ok(())
    }

    /// Stored value without any transform
    pub fn get_raw(&self, column: &str) -> Value {
        self.values.get(column).cloned().unwrap_or(Value::Null)
    }

    /// Store a value without guard or mutator
    pub fn set_raw(&mut self, column: &str, value: Value) {
        self.values.insert(column.to_string(), value);
    }

    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.values.remove(column)
    }

    /// Guarded write of every pair; stops at the first rejected column
    pub fn fill(&mut self, attributes: Record) -> ModelResult<()> {
        for (column, value) in attributes {
            self.set(&column, value)?;
        }
        Ok(())
    }

    /// Raw write of every pair
    pub fn force_fill(&mut self, attributes: Record) {
        self.values.extend(attributes);
    }

    /// Every column with its transformed value
    pub fn transformed(&self) -> Record {
        self.values
            .keys()
            .map(|column| (column.clone(), self.get(column)))
            .collect()
    }

    pub fn raw(&self) -> &Record {
        &self.values
    }

    pub fn into_raw(self) -> Record {
        self.values
    }
}
