//! Entity identifier strategies.
//!
//! The strategy is picked once at startup from [`IdStrategy`] and handed to
//! the stores; store code never probes for a generator itself.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_SUFFIX_LEN: usize = 9;

pub trait IdGenerator: Send + Sync {
    /// Returns a new id of the form `<prefix>-<unique part>`.
    fn generate(&self, prefix: &str) -> String;
}

/// `<prefix>-<uuid v4>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn generate(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, Uuid::new_v4())
    }
}

/// `<prefix>-<unix nanos>-<random base36>`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimestampIdGenerator;

impl IdGenerator for TimestampIdGenerator {
    fn generate(&self, prefix: &str) -> String {
        let now = Utc::now();
        let stamp = now
            .timestamp_nanos_opt()
            .unwrap_or_else(|| now.timestamp_millis().saturating_mul(1_000_000));

        let mut rng = rand::thread_rng();
        let suffix: String = (0..RANDOM_SUFFIX_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();

        format!("{}-{}-{}", prefix, stamp, suffix)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    Uuid,
    Timestamp,
}

impl Default for IdStrategy {
    fn default() -> Self {
        IdStrategy::Uuid
    }
}

impl IdStrategy {
    pub fn generator(self) -> Arc<dyn IdGenerator> {
        match self {
            IdStrategy::Uuid => Arc::new(UuidIdGenerator),
            IdStrategy::Timestamp => Arc::new(TimestampIdGenerator),
        }
    }
}
