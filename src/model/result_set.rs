use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StatsError;
use crate::model::StatRow;

/// One named table of an upstream response.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ResultSet {
    pub name: String,
    pub headers: Vec<String>,
    #[serde(rename = "rowSet")]
    pub row_set: Vec<Vec<Value>>,
}

impl ResultSet {
    #[must_use]
    pub fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            headers: Vec::new(),
            row_set: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_set.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.row_set.len()
    }

    #[must_use]
    pub fn rows(&self) -> Vec<StatRow> {
        self.row_set
            .iter()
            .map(|values| {
                let map: Map<String, Value> = self
                    .headers
                    .iter()
                    .cloned()
                    .zip(values.iter().cloned())
                    .collect();
                StatRow::from(map)
            })
            .collect()
    }
}

/// All result sets of one upstream call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatsResponse {
    pub result_sets: Vec<ResultSet>,
}

impl StatsResponse {
    /// Most endpoints answer with a `resultSets` array; a few answer with a
    /// single `resultSet` object instead.
    ///
    /// # Errors
    ///
    /// Will return `Err` if neither key is present or a table is malformed
    pub fn from_json(value: &Value) -> Result<Self, StatsError> {
        let raw = value
            .get("resultSets")
            .or_else(|| value.get("resultSet"))
            .ok_or_else(|| StatsError::Parse("response has no resultSets".into()))?;

        let result_sets = match raw {
            Value::Array(items) => items
                .iter()
                .map(|item| serde_json::from_value::<ResultSet>(item.clone()))
                .collect::<Result<Vec<_>, _>>()?,
            Value::Object(_) => vec![serde_json::from_value::<ResultSet>(raw.clone())?],
            _ => {
                return Err(StatsError::Parse(
                    "resultSets is neither an array nor an object".into(),
                ));
            }
        };

        Ok(Self { result_sets })
    }

    #[must_use]
    pub fn result_set(&self, name: &str) -> Option<&ResultSet> {
        self.result_sets.iter().find(|rs| rs.name == name)
    }

    /// Takes the named table, or the first one if no table carries that name.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the response holds no tables at all
    pub fn into_result_set(mut self, name: &str) -> Result<ResultSet, StatsError> {
        if let Some(idx) = self.result_sets.iter().position(|rs| rs.name == name) {
            return Ok(self.result_sets.swap_remove(idx));
        }
        if self.result_sets.is_empty() {
            Err(StatsError::Parse(format!("response has no {name} table")))
        } else {
            Ok(self.result_sets.swap_remove(0))
        }
    }
}
