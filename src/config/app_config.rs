use serde::{Deserialize, Serialize};

use crate::settings::ClusterSettings;

/// Application-level configuration file (`app.toml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfigFile {
    pub minimum_gas_prices: String,
    pub grpc: GrpcSection,
    pub api: ApiSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrpcSection {
    pub enable: bool,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSection {
    pub enable: bool,
}

impl AppConfigFile {
    pub fn render(settings: &ClusterSettings) -> Self {
        Self {
            minimum_gas_prices: "0.000001stake".to_string(),
            grpc: GrpcSection {
                enable: true,
                address: format!("0.0.0.0:{}", settings.grpc_port),
            },
            api: ApiSection { enable: false },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_exposes_grpc_on_the_configured_port() {
        let config = AppConfigFile::render(&ClusterSettings::default());
        assert!(config.grpc.enable);
        assert_eq!(config.grpc.address, "0.0.0.0:9090");

        let parsed: AppConfigFile = toml::from_str(&toml::to_string(&config).unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
