//! Text renderings of the effective configuration.

use serde::Serialize;
use serde_json::Value;
use spark_error::{OutputError, SparkResult};
use spark_resilience::{BatchConfig, CallConfig, ENV_PREFIX};

#[derive(Serialize)]
struct Effective<'a> {
    #[serde(flatten)]
    call: &'a CallConfig,
    #[serde(flatten)]
    batch: &'a BatchConfig,
}

/// Both configurations as one TOML document, in the shape of `spark.toml`.
///
/// # Example
///
/// ```
/// use spark::{BatchConfig, CallConfig, config_toml};
///
/// let toml = config_toml(&CallConfig::default(), &BatchConfig::default()).unwrap();
/// assert!(toml.contains("max_retries = 3"));
/// ```
pub fn config_toml(call: &CallConfig, batch: &BatchConfig) -> SparkResult<String> {
    toml::to_string_pretty(&Effective { call, batch })
        .map_err(|e| OutputError::new(format!("Failed to render configuration: {}", e)).into())
}

/// A `.env` template listing every `SPARK_*` variable with its current value.
///
/// # Example
///
/// ```
/// use spark::{BatchConfig, CallConfig, env_template};
///
/// let template = env_template(&CallConfig::default(), &BatchConfig::default()).unwrap();
/// assert!(template.contains("SPARK_MAX_RETRIES=3"));
/// assert!(template.contains("SPARK_MOCK_MODE=false"));
/// ```
pub fn env_template(call: &CallConfig, batch: &BatchConfig) -> SparkResult<String> {
    let mut out = String::from(
        "# Spark call-layer settings\n\
         # Copy to .env and adjust; these override spark.toml.\n",
    );
    for (section, value) in [("Call wrapper", to_value(call)?), ("Shot batches", to_value(batch)?)] {
        out.push_str(&format!("\n# {}\n", section));
        if let Value::Object(fields) = value {
            for (key, value) in fields {
                out.push_str(&format!(
                    "{}_{}={}\n",
                    ENV_PREFIX,
                    key.to_uppercase(),
                    value
                ));
            }
        }
    }
    Ok(out)
}

fn to_value<T: Serialize>(value: &T) -> SparkResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| OutputError::new(format!("Failed to serialize configuration: {}", e)).into())
}
