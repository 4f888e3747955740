//! Configuration de pmoqueue
//!
//! La configuration par défaut est embarquée (`pmoqueue.yaml`). Elle peut être
//! complétée par un fichier YAML externe puis surchargée par des variables
//! d'environnement de la forme `PMOQUEUE_CONFIG__CACHE__PARALLELISM=4`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::{env, fs, path::Path};
use tracing::info;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("pmoqueue.yaml");

const ENV_PREFIX: &str = "PMOQUEUE_CONFIG__";

/// Nombre de chargements simultanés dans un épisode de cache
pub const DEFAULT_CACHE_PARALLELISM: usize = 3;

/// Capacité par défaut du canal d'évènements du worker
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Borne haute de `cache.parallelism` (limite des permis d'un `Semaphore`)
pub const MAX_CACHE_PARALLELISM: usize = tokio::sync::Semaphore::MAX_PERMITS;

/// Borne haute de `cache.event_capacity`
pub const MAX_EVENT_CAPACITY: usize = 1 << 16;

/// Configuration complète de la crate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub cache: CacheSettings,
}

/// Réglages du worker de cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub parallelism: usize,
    pub event_capacity: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            parallelism: DEFAULT_CACHE_PARALLELISM,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl QueueConfig {
    /// Charge la configuration
    ///
    /// 1. Configuration embarquée
    /// 2. Fusion avec le fichier `path` s'il existe
    /// 3. Surcharges `PMOQUEUE_CONFIG__*`
    /// 4. Validation
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut value = lower_keys_value(parse_yaml(DEFAULT_CONFIG)?);

        if let Some(path) = path {
            match fs::read_to_string(path) {
                Ok(data) => {
                    info!(config_file=%path.display(), "Loaded queue config file");
                    let external = lower_keys_value(parse_yaml(&data)?);
                    merge_yaml(&mut value, &external);
                }
                Err(_) => {
                    info!(config_file=%path.display(), "Queue config file not found, using embedded defaults");
                }
            }
        }

        apply_env_overrides(&mut value, env::vars());
        Self::from_value(value)
    }

    /// Construit une configuration depuis un document YAML
    ///
    /// Les clés absentes prennent leur valeur par défaut.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Self::from_value(lower_keys_value(parse_yaml(yaml)?))
    }

    /// Vérifie la cohérence des valeurs
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_CACHE_PARALLELISM).contains(&self.cache.parallelism) {
            return Err(Error::Config(format!(
                "cache.parallelism must be between 1 and {}",
                MAX_CACHE_PARALLELISM
            )));
        }
        if !(1..=MAX_EVENT_CAPACITY).contains(&self.cache.event_capacity) {
            return Err(Error::Config(format!(
                "cache.event_capacity must be between 1 and {}",
                MAX_EVENT_CAPACITY
            )));
        }
        Ok(())
    }

    fn from_value(value: Value) -> Result<Self> {
        let value = match value {
            Value::Null => Value::Mapping(Mapping::new()),
            other => other,
        };
        let config: Self =
            serde_yaml::from_value(value).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

fn parse_yaml(yaml: &str) -> Result<Value> {
    serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))
}

fn apply_env_overrides<I>(config: &mut Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        if let Some(path) = key.strip_prefix(ENV_PREFIX) {
            let key_path: Vec<&str> = path.split("__").collect();
            if let Err(e) = set_value(config, &key_path, convert_env_value(&value)) {
                tracing::warn!("Ignoring environment override {}: {}", key, e);
            }
        }
    }
}

fn set_value(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
    if path.is_empty() {
        *data = value;
        return Ok(());
    }
    if let Value::Mapping(map) = data {
        let key = Value::String(path[0].to_lowercase());
        if path.len() == 1 {
            map.insert(key, value);
        } else {
            let entry = map.entry(key).or_insert(Value::Mapping(Mapping::new()));
            set_value(entry, &path[1..], value)?;
        }
        Ok(())
    } else {
        Err(Error::Config("Current node is not a map".into()))
    }
}

fn convert_env_value(value: &str) -> Value {
    serde_yaml::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

fn lower_keys_value(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut new_map = Mapping::new();
            for (k, v) in map {
                let key = match k {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                new_map.insert(key, lower_keys_value(v));
            }
            Value::Mapping(new_map)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys_value).collect()),
        _ => value,
    }
}

/// Fusionne le fichier utilisateur dans la configuration embarquée
///
/// Un fichier qui ne fixe que `cache.event_capacity` garde ainsi le
/// `cache.parallelism` par défaut. Les mappings sont fusionnés clé par clé,
/// toute autre valeur externe remplace la valeur par défaut.
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(target) => merge_yaml(target, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (target, value) => *target = value.clone(),
    }
}
