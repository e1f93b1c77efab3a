//! Configuração do cliente carregada a partir de `functional-jobs.toml`.
//!
//! A struct [`ClientConfig`] descreve o ambiente pré-provisionado (URL do
//! serviço funcional, zona padrão, serviços e direitos por zona) e os
//! parâmetros do transporte HTTP. Valores ausentes usam defaults sensíveis.
//! A variável de ambiente `FUNCTIONAL_JOBS_TOKEN` tem precedência sobre o
//! arquivo para o token de autorização.

use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

use crate::environment::{
    Environment, RightType, RightValue, Rights, ServiceInfo, ServiceType, Zone,
};
use crate::transport::Paging;

const CONFIG_FILE: &str = "functional-jobs.toml";
const TOKEN_ENV: &str = "FUNCTIONAL_JOBS_TOKEN";

/// Um serviço provisionado em uma zona, com os direitos concedidos.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Zona onde o serviço está provisionado.
    pub zone: String,
    /// Nome do recurso (ex.: "gradings").
    pub name: String,
    /// Contexto ao qual o serviço está vinculado, se houver.
    #[serde(default)]
    pub context: Option<String>,
    /// Direitos concedidos.
    #[serde(default)]
    pub permitted: Vec<RightType>,
    /// Direitos explicitamente negados.
    #[serde(default)]
    pub rejected: Vec<RightType>,
}

/// Configuração de nível superior carregada de `functional-jobs.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Identificador da solução no servidor remoto.
    #[serde(default)]
    pub solution_id: String,

    /// Chave da aplicação registrada.
    #[serde(default)]
    pub application_key: String,

    /// Identificador da instância, quando a aplicação roda em várias.
    #[serde(default)]
    pub instance_id: Option<String>,

    /// Token do usuário, quando aplicável.
    #[serde(default)]
    pub user_token: Option<String>,

    /// URL base dos serviços funcionais.
    #[serde(default = "default_service_url")]
    pub service_url: String,

    /// Zona usada quando a requisição não especifica outra.
    #[serde(default)]
    pub default_zone: Option<String>,

    /// Token de autorização enviado como bearer.
    #[serde(default)]
    pub authorisation_token: String,

    /// Timeout de conexão em segundos.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Timeout total de cada requisição em segundos.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Tamanho de página padrão para consultas de coleção.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Serviços provisionados por zona.
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
}

// Valor padrão para a URL base: servidor local.
fn default_service_url() -> String {
    "http://localhost:9000/api/services".to_string()
}

// Valor padrão para o timeout de conexão: 10s.
fn default_connect_timeout_secs() -> u64 {
    10
}

// Valor padrão para o timeout de requisição: 120s.
fn default_request_timeout_secs() -> u64 {
    120
}

// Valor padrão para o tamanho de página: 100.
fn default_page_size() -> u32 {
    100
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            solution_id: String::new(),
            application_key: String::new(),
            instance_id: None,
            user_token: None,
            service_url: default_service_url(),
            default_zone: None,
            authorisation_token: String::new(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            default_page_size: default_page_size(),
            services: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Carrega a configuração de `functional-jobs.toml` no diretório atual.
    /// Usa valores padrão se o arquivo não existir.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Carrega a configuração de um caminho explícito.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<ClientConfig>(&contents)?
        } else {
            Self::default()
        };

        // Variável de ambiente tem precedência sobre o arquivo para o token.
        if let Ok(token) = std::env::var(TOKEN_ENV)
            && !token.is_empty()
        {
            config.authorisation_token = token;
        }

        Ok(config)
    }

    /// Seleção de página usando o tamanho de página configurado.
    pub fn paging(&self, page: u32) -> Paging {
        Paging {
            page,
            page_size: self.default_page_size,
        }
    }

    /// Monta o template de [`Environment`] descrito por esta configuração.
    pub fn environment_template(&self) -> Environment {
        let mut environment = Environment::new(&self.solution_id, &self.application_key)
            .with_service_url(ServiceType::Functional, &self.service_url);
        environment.instance_id = self.instance_id.clone();
        environment.user_token = self.user_token.clone();
        if let Some(zone) = &self.default_zone {
            environment = environment.with_default_zone(Zone::new(zone));
        }

        for service in &self.services {
            let mut rights = Rights::new();
            for right in &service.permitted {
                rights.set(*right, RightValue::Permitted);
            }
            // Negações vencem concessões duplicadas.
            for right in &service.rejected {
                rights.set(*right, RightValue::Rejected);
            }
            environment = environment.provision(
                &Zone::new(&service.zone),
                ServiceInfo {
                    name: service.name.clone(),
                    service_type: ServiceType::Functional,
                    context: service.context.clone(),
                    rights,
                },
            );
        }
        environment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let config = ClientConfig::default();
        assert_eq!(config.service_url, "http://localhost:9000/api/services");
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.request_timeout_secs, 120);
        assert_eq!(config.default_page_size, 100);
        assert!(config.services.is_empty());
        assert_eq!(
            config.paging(3),
            Paging {
                page: 3,
                page_size: 100
            }
        );
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            solution_id = "testSolution"
            default_zone = "school"

            [[services]]
            zone = "school"
            name = "gradings"
            permitted = ["CREATE", "QUERY", "DELETE"]
            rejected = ["DELETE"]
        "#;
        let config: ClientConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.solution_id, "testSolution");
        assert_eq!(config.request_timeout_secs, 120);
        assert_eq!(config.services[0].permitted.len(), 3);

        let env = config.environment_template();
        let zone = Zone::new("school");
        let service = env
            .resolve_service(&zone, "gradings", ServiceType::Functional, None)
            .unwrap();
        assert_eq!(service.rights.get(RightType::Create), Some(RightValue::Permitted));
        assert_eq!(service.rights.get(RightType::Delete), Some(RightValue::Rejected));
        assert_eq!(service.rights.get(RightType::Update), None);
        assert_eq!(env.target_zone(None), Some(&zone));
        assert_eq!(
            env.service_url(ServiceType::Functional),
            Some("http://localhost:9000/api/services")
        );
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "service_url = \"https://jobs.example.org/services/\"").unwrap();
        writeln!(file, "request_timeout_secs = 30").unwrap();

        let config = ClientConfig::load_from(file.path()).unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        let env = config.environment_template();
        assert_eq!(
            env.service_url(ServiceType::Functional),
            Some("https://jobs.example.org/services")
        );
    }

    #[test]
    fn token_env_overrides_file_unless_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "authorisation_token = \"from-file\"").unwrap();

        // Nenhum outro teste verifica o token, então alterar a variável aqui é seguro.
        unsafe { std::env::set_var(TOKEN_ENV, "from-env") };
        let overridden = ClientConfig::load_from(file.path()).unwrap();
        unsafe { std::env::set_var(TOKEN_ENV, "") };
        let kept = ClientConfig::load_from(file.path()).unwrap();
        unsafe { std::env::remove_var(TOKEN_ENV) };

        assert_eq!(overridden.authorisation_token, "from-env");
        assert_eq!(kept.authorisation_token, "from-file");
    }

    #[test]
    fn load_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load_from(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config.default_page_size, 100);
    }
}
