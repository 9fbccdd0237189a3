use crate::domain::{
    CatalogMetadata, CatalogSnapshot, ModuleStatus, RawInProcessModule, RawModule,
    normalize_in_process, normalize_module,
};
use crate::infra::ApiConfig;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fmt;
use thiserror::Error;

const BIN_NAME: &str = "cmvp";
const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Collection {
    Active,
    Historical,
    InProcess,
}

impl Collection {
    pub fn path(self) -> &'static str {
        match self {
            Self::Active => "modules.json",
            Self::Historical => "historical-modules.json",
            Self::InProcess => "modules-in-process.json",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Historical => "historical",
            Self::InProcess => "in-process",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("API returned status {0}")]
    Status(u16),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("invalid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("fetching {collection} modules: {source}")]
    Collection {
        collection: Collection,
        source: RequestError,
    },

    #[error("API returned status {0} for metadata")]
    MetadataStatus(u16),

    #[error("fetching metadata: {0}")]
    Metadata(RequestError),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ModulesResponse {
    modules: Vec<RawModule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InProcessModulesResponse {
    modules: Vec<RawInProcessModule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MetadataResponse {
    generated_at: String,
    total_modules: u64,
    total_historical_modules: u64,
    total_modules_in_process: u64,
    source: String,
    version: String,
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    agent: ureq::Agent,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: agent_config.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches the three collections and merges them in catalog order. The
    /// first failing collection aborts the whole fetch.
    pub fn fetch_all_modules(&self) -> Result<CatalogSnapshot, FetchError> {
        let active: ModulesResponse = self.fetch_collection(Collection::Active)?;
        let historical: ModulesResponse = self.fetch_collection(Collection::Historical)?;
        let in_process: InProcessModulesResponse = self.fetch_collection(Collection::InProcess)?;

        let mut records = Vec::with_capacity(
            active.modules.len() + historical.modules.len() + in_process.modules.len(),
        );
        records.extend(
            active
                .modules
                .into_iter()
                .map(|raw| normalize_module(raw, ModuleStatus::Active)),
        );
        records.extend(
            historical
                .modules
                .into_iter()
                .map(|raw| normalize_module(raw, ModuleStatus::Historical)),
        );
        records.extend(in_process.modules.into_iter().map(normalize_in_process));

        tracing::info!(records = records.len(), "catalog assembled");
        Ok(records)
    }

    pub fn fetch_metadata(&self) -> Result<CatalogMetadata, FetchError> {
        let parsed: MetadataResponse = self
            .get_json("metadata.json")
            .map_err(|error| match error {
                RequestError::Status(code) => FetchError::MetadataStatus(code),
                other => FetchError::Metadata(other),
            })?;
        tracing::debug!(generated_at = %parsed.generated_at, "fetched metadata");

        Ok(CatalogMetadata {
            generated_at: parsed.generated_at,
            total_modules: parsed.total_modules,
            total_historical_modules: parsed.total_historical_modules,
            total_modules_in_process: parsed.total_modules_in_process,
            source: parsed.source,
            version: parsed.version,
        })
    }

    fn fetch_collection<T: DeserializeOwned + HasModuleCount>(
        &self,
        collection: Collection,
    ) -> Result<T, FetchError> {
        match self.get_json::<T>(collection.path()) {
            Ok(parsed) => {
                tracing::debug!(
                    collection = collection.label(),
                    count = parsed.module_count(),
                    "fetched collection"
                );
                Ok(parsed)
            }
            Err(source) => {
                tracing::warn!(collection = collection.label(), error = %source, "collection fetch failed");
                Err(FetchError::Collection { collection, source })
            }
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RequestError> {
        let url = format!("{}/{path}", self.base_url);
        let mut response = self
            .agent
            .get(&url)
            .header(
                "User-Agent",
                &format!("{BIN_NAME}/{}", env!("CARGO_PKG_VERSION")),
            )
            .header("Accept", "application/json")
            .call()
            .map_err(|error| RequestError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RequestError::Status(status.as_u16()));
        }

        let bytes = response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_vec()
            .map_err(|error| RequestError::Body(error.to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

trait HasModuleCount {
    fn module_count(&self) -> usize;
}

impl HasModuleCount for ModulesResponse {
    fn module_count(&self) -> usize {
        self.modules.len()
    }
}

impl HasModuleCount for InProcessModulesResponse {
    fn module_count(&self) -> usize {
        self.modules.len()
    }
}
