use std::path::Path;
use std::sync::Arc;

use co2cast_core::{Co2castConfig, GatewayStatus, LoadError, ModelHandle};
use tracing::{error, info, warn};

use crate::artifact::ArtifactModel;
use crate::fetch::{io_error, ArtifactFetcher};
use crate::source::ArtifactSource;

/// Read and validate an artifact from the local filesystem.
pub async fn load_file(path: &Path) -> Result<ArtifactModel, LoadError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LoadError::NotFound(path.display().to_string()),
        _ => io_error(path, e),
    })?;
    ArtifactModel::from_json(&content)
}

/// Load a model from `source`, downloading remote artifacts into `cache_dir` first.
pub async fn load(source: &ArtifactSource, cache_dir: &Path) -> Result<ModelHandle, LoadError> {
    let path = match source {
        ArtifactSource::Local(path) => path.clone(),
        ArtifactSource::Remote(url) => ArtifactFetcher::new(cache_dir)?.fetch_to_cache(url).await?,
    };

    let model = match load_file(&path).await {
        Ok(model) => model,
        Err(e) => {
            // An unusable cached copy would fail every later run too.
            if source.is_remote() && tokio::fs::remove_file(&path).await.is_ok() {
                warn!(path = %path.display(), "Removed unusable cached artifact");
            }
            return Err(e);
        }
    };
    info!(
        model = %model.name(),
        kind = model.kind(),
        features = model.feature_names().len(),
        "Loaded model artifact from {}",
        path.display()
    );
    Ok(Arc::new(model))
}

/// The single load attempt for a process: resolves the configured source and
/// binds the result to the variant's feature schema.
pub async fn open_gateway(config: &Co2castConfig) -> GatewayStatus {
    let schema = match config.variant.schema() {
        Ok(schema) => schema,
        Err(e) => return GatewayStatus::Unavailable(LoadError::Schema(e.to_string())),
    };

    let location = config.model_source();
    let loaded = match ArtifactSource::parse(&location) {
        Ok(source) => load(&source, &config.cache_dir()).await,
        Err(e) => Err(e),
    };
    if let Err(e) = &loaded {
        error!("Failed to load model from {}: {}", location, e);
    }

    GatewayStatus::from_load(loaded, schema)
}
