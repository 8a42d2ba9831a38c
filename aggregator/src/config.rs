use crate::error::{Result, ServiceError};
use bfv::parameters::{ParametersLiteral, SecurityLevel};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Service configuration, read from a TOML file.
///
/// ```toml
/// [scheme]
/// poly_modulus_degree = 4096
/// coeff_modulus_bits = [36, 36, 37]
/// plain_modulus_bits = 20
/// security_level = "tc128"
///
/// [engine]
/// workers = 8
///
/// [logging]
/// filter = "info"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub scheme: SchemeConfig,
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemeConfig {
    pub poly_modulus_degree: usize,
    pub coeff_modulus_bits: Vec<u32>,
    pub plain_modulus_bits: u32,
    pub security_level: String,
}

impl Default for SchemeConfig {
    fn default() -> Self {
        let literal: ParametersLiteral = ParametersLiteral::default();
        Self {
            poly_modulus_degree: literal.poly_modulus_degree,
            coeff_modulus_bits: literal.coeff_modulus_bits,
            plain_modulus_bits: literal.plain_modulus_bits,
            security_level: literal.security_level.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Worker threads; `None` sizes the pool to the available cores.
    pub workers: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text: String = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        if config.engine.workers == Some(0) {
            return Err(ServiceError::Config(
                "engine.workers must be at least 1".to_string(),
            ));
        }
        Ok(config)
    }

    /// Scheme parameters as understood by the `bfv` crate.
    pub fn to_literal(&self) -> Result<ParametersLiteral> {
        let security_level: SecurityLevel = SecurityLevel::from_str(&self.scheme.security_level)
            .map_err(|err| ServiceError::Config(err.to_string()))?;
        Ok(ParametersLiteral {
            poly_modulus_degree: self.scheme.poly_modulus_degree,
            coeff_modulus_bits: self.scheme.coeff_modulus_bits.clone(),
            plain_modulus_bits: self.scheme.plain_modulus_bits,
            security_level,
        })
    }
}
