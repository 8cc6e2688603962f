//! Enrollment fields looked up in a tabular row

use std::collections::HashMap;

use csv::StringRecord;

use crate::enrollment::{Field, FieldRequest};
use crate::error::{Error, Result};
use crate::workflow::Driver;

/// Where each enrollment field lives in a header row.
///
/// Columns are matched by name (case-insensitive, surrounding spaces
/// ignored), so their order does not matter and extra columns are allowed.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    indices: HashMap<Field, usize>,
}

impl ColumnMap {
    /// Locate every enrollment field in `headers`
    pub fn from_headers(headers: &StringRecord) -> Result<Self> {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

        let mut indices = HashMap::new();
        for field in Field::ORDER {
            let index = names
                .iter()
                .position(|name| name == field.column())
                .ok_or_else(|| Error::missing_field(field.column()))?;
            indices.insert(field, index);
        }
        Ok(Self { indices })
    }

    fn index(&self, field: Field) -> Option<usize> {
        self.indices.get(&field).copied()
    }
}

/// Supplies enrollment fields from one row.
///
/// A row has exactly one value per field, so a re-request after a rejection
/// cannot be answered and is reported as `InvalidField`.
pub struct RowDriver<'a> {
    columns: &'a ColumnMap,
    record: &'a StringRecord,
}

impl<'a> RowDriver<'a> {
    pub fn new(columns: &'a ColumnMap, record: &'a StringRecord) -> Self {
        Self { columns, record }
    }
}

impl Driver<FieldRequest, String> for RowDriver<'_> {
    fn supply(&mut self, request: &FieldRequest) -> Result<String> {
        let field = request.field;

        if let Some(reason) = &request.rejection {
            return Err(Error::invalid_field(field.column(), reason.clone()));
        }

        let value = self
            .columns
            .index(field)
            .and_then(|i| self.record.get(i))
            .ok_or_else(|| Error::missing_field(field.column()))?;

        // Preferences may legitimately be empty
        if value.trim().is_empty() && field != Field::InitialPreferences {
            return Err(Error::missing_field(field.column()));
        }
        Ok(value.to_string())
    }
}
