pub mod artifact;
pub mod fetch;
pub mod forest;
pub mod linear;
pub mod loader;
pub mod source;

pub use artifact::{ArtifactModel, ArtifactSchema, EstimatorSchema, FORMAT_VERSION};
pub use fetch::ArtifactFetcher;
pub use loader::{load, load_file, open_gateway};
pub use source::{resolve_download_url, ArtifactSource};
