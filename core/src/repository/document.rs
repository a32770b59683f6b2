use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::model::Entity;

const LAST_MODIFIED_KEY: &str = "lastModified";

/// The persisted form of one entity collection.
///
/// On disk this is `{ "<collection>": [...], "lastModified": "<rfc3339>" }`,
/// where the collection key comes from [`Entity::COLLECTION`].
#[derive(Debug, Clone, PartialEq)]
pub struct Document<E> {
    pub entities: Vec<E>,
    pub last_modified: DateTime<Utc>,
}

impl<E: Entity> Document<E> {
    /// Snapshot of `entities` stamped with the current time.
    pub fn new(entities: Vec<E>) -> Self {
        Self {
            entities,
            last_modified: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        let mut map = Map::new();
        map.insert(E::COLLECTION.to_string(), serde_json::to_value(&self.entities)?);
        map.insert(
            LAST_MODIFIED_KEY.to_string(),
            serde_json::to_value(self.last_modified)?,
        );
        Ok(serde_json::to_string_pretty(&Value::Object(map))?)
    }

    pub fn from_json(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input)?;
        let Value::Object(mut map) = value else {
            return Err(anyhow!("Expected a JSON object"));
        };

        let entities = map
            .remove(E::COLLECTION)
            .ok_or_else(|| anyhow!("Missing `{}` list", E::COLLECTION))?;
        let entities: Vec<E> = serde_json::from_value(entities)
            .with_context(|| format!("Invalid `{}` list", E::COLLECTION))?;

        let last_modified = match map.remove(LAST_MODIFIED_KEY) {
            Some(v) => serde_json::from_value(v).context("Invalid `lastModified`")?,
            None => DateTime::<Utc>::UNIX_EPOCH,
        };

        Ok(Self {
            entities,
            last_modified,
        })
    }
}
