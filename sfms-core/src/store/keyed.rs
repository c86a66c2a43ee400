//! Serde adapter storing an [`IndexMap`] as a JSON array of its values.
//!
//! Each record carries its own identifier, so the map key is rebuilt from
//! the record on load. Insertion order is the array order.

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::Display;
use std::hash::Hash;
use uuid::Uuid;

use crate::models::{Goal, NutritionEntry, User, UserId, Workout};

/// A record that knows its own identifier.
pub trait Keyed {
    type Key: Clone + Eq + Hash + Display;

    fn key(&self) -> Self::Key;
}

impl Keyed for User {
    type Key = UserId;

    fn key(&self) -> UserId {
        self.username.clone()
    }
}

impl Keyed for Workout {
    type Key = Uuid;

    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for NutritionEntry {
    type Key = Uuid;

    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for Goal {
    type Key = Uuid;

    fn key(&self) -> Uuid {
        self.id
    }
}

pub fn serialize<S, V>(map: &IndexMap<V::Key, V>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Keyed + Serialize,
{
    serializer.collect_seq(map.values())
}

pub fn deserialize<'de, D, V>(deserializer: D) -> Result<IndexMap<V::Key, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Keyed + Deserialize<'de>,
{
    let records = Vec::<V>::deserialize(deserializer)?;
    let mut map = IndexMap::with_capacity(records.len());
    for record in records {
        let key = record.key();
        if map.contains_key(&key) {
            return Err(D::Error::custom(format!("duplicate identifier '{}'", key)));
        }
        map.insert(key, record);
    }
    Ok(map)
}
