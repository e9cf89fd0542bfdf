//! Serialized parameter state.
//!
//! A [`StateDict`] is an ordered list of `(child module, parameter label, array)`
//! entries. On disk it is a pretty-printed JSON object mapping each child module
//! name to an object mapping each parameter label to its values as nested arrays.
//! Keys keep registration order:
//!
//! ```json
//! {
//!     "linear": {
//!         "weights": [[0.1, 0.2], [0.3, 0.4]],
//!         "bias": [[0.0, 0.0]]
//!     }
//! }
//! ```

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Number, Value};

use crate::error::FastRnnError;

/// One stored parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct StateEntry {
    pub module: String,
    pub label: String,
    pub values: ArrayD<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StateDict {
    entries: Vec<StateEntry>,
}

impl StateDict {
    pub fn new() -> Self {
        StateDict::default()
    }

    pub fn push(&mut self, module: impl Into<String>, label: impl Into<String>, values: ArrayD<f64>) {
        self.entries.push(StateEntry {
            module: module.into(),
            label: label.into(),
            values,
        });
    }

    pub fn get(&self, module: &str, label: &str) -> Option<&ArrayD<f64>> {
        self.entries
            .iter()
            .find(|e| e.module == module && e.label == label)
            .map(|e| &e.values)
    }

    pub fn contains(&self, module: &str, label: &str) -> bool {
        self.get(module, label).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StateEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds every entry of `other`, replacing entries with the same module and label.
    pub fn extend(&mut self, other: StateDict) {
        for entry in other.entries {
            match self
                .entries
                .iter_mut()
                .find(|e| e.module == entry.module && e.label == entry.label)
            {
                Some(existing) => existing.values = entry.values,
                None => self.entries.push(entry),
            }
        }
    }

    // --- JSON codec ---

    pub fn to_json(&self) -> Result<Value, FastRnnError> {
        let mut root = Map::new();
        for entry in &self.entries {
            let params = root
                .entry(entry.module.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(params) = params {
                params.insert(entry.label.clone(), array_to_json(&entry.values.view())?);
            }
        }
        Ok(Value::Object(root))
    }

    pub fn from_json(value: &Value) -> Result<Self, FastRnnError> {
        let root = value
            .as_object()
            .ok_or_else(|| FastRnnError::InvalidStateFormat("top level must be an object".to_string()))?;
        let mut state = StateDict::new();
        for (module, params) in root {
            let params = params.as_object().ok_or_else(|| {
                FastRnnError::InvalidStateFormat(format!("entry '{module}' must be an object"))
            })?;
            for (label, values) in params {
                let values = json_to_array(values).map_err(|e| {
                    FastRnnError::InvalidStateFormat(format!("{module}.{label}: {e}"))
                })?;
                state.push(module.clone(), label.clone(), values);
            }
        }
        Ok(state)
    }

    /// JSON text indented by four spaces.
    pub fn to_json_string_pretty(&self) -> Result<String, FastRnnError> {
        let value = self.to_json()?;
        let mut buffer = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"    "));
        value.serialize(&mut serializer)?;
        String::from_utf8(buffer).map_err(|e| FastRnnError::InvalidStateFormat(e.to_string()))
    }

    pub fn from_json_str(text: &str) -> Result<Self, FastRnnError> {
        let value: Value = serde_json::from_str(text)?;
        StateDict::from_json(&value)
    }
}

impl<'a> IntoIterator for &'a StateDict {
    type Item = &'a StateEntry;
    type IntoIter = std::slice::Iter<'a, StateEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn array_to_json(array: &ArrayViewD<'_, f64>) -> Result<Value, FastRnnError> {
    if array.ndim() == 0 {
        let value = array.iter().next().copied().unwrap_or_default();
        return Number::from_f64(value)
            .map(Value::Number)
            .ok_or_else(|| FastRnnError::InvalidStateFormat(format!("{value} cannot be stored as JSON")));
    }
    array
        .axis_iter(Axis(0))
        .map(|sub| array_to_json(&sub))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

/// Rebuilds an array from nested JSON lists. Every list at the same depth must have the
/// same length, and all leaves must be numbers.
///
/// An empty list carries no inner dimensions: `[0, 3]` is stored as `[]` and read back
/// as `[0]`. Loading into a module restores the live shape of such parameters.
fn json_to_array(value: &Value) -> Result<ArrayD<f64>, String> {
    let mut shape = Vec::new();
    let mut cursor = value;
    while let Value::Array(items) = cursor {
        shape.push(items.len());
        match items.first() {
            Some(first) => cursor = first,
            None => break,
        }
    }

    let mut flat = Vec::with_capacity(shape.iter().product());
    flatten_into(value, &shape, &mut flat)?;
    ArrayD::from_shape_vec(IxDyn(&shape), flat).map_err(|e| e.to_string())
}

fn flatten_into(value: &Value, shape: &[usize], out: &mut Vec<f64>) -> Result<(), String> {
    match (value, shape.split_first()) {
        (Value::Array(items), Some((&len, rest))) => {
            if items.len() != len {
                return Err(format!("ragged nesting: expected {len} items, found {}", items.len()));
            }
            items.iter().try_for_each(|item| flatten_into(item, rest, out))
        }
        (Value::Number(n), None) => {
            let v = n.as_f64().ok_or_else(|| format!("{n} is not a float"))?;
            out.push(v);
            Ok(())
        }
        (other, _) => Err(format!("unexpected value {other}")),
    }
}

/// `YYYYMMDD-HHMMSS.json` for the current UTC time, in the working directory.
pub fn default_checkpoint_path() -> PathBuf {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    PathBuf::from(checkpoint_file_name(secs))
}

fn checkpoint_file_name(unix_secs: u64) -> String {
    let (year, month, day) = days_to_date(unix_secs / 86400);
    let time_of_day = unix_secs % 86400;
    format!(
        "{:04}{:02}{:02}-{:02}{:02}{:02}.json",
        year,
        month,
        day,
        time_of_day / 3600,
        (time_of_day % 3600) / 60,
        time_of_day % 60
    )
}

/// Civil date from days since 1970-01-01 (Howard Hinnant's algorithm).
fn days_to_date(days: u64) -> (u64, u64, u64) {
    let z = days + 719468;
    let era = z / 146097;
    let doe = z - era * 146097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}

#[cfg(test)]
#[path = "state_dict_test.rs"]
mod tests;
