//! Optional sentence-embedding capability for section detection

use crate::config::EmbeddingConfig;
use crate::error::Result;
use log::debug;
#[cfg(feature = "embeddings")]
use log::{info, warn};
use std::sync::Arc;

/// Anything that turns short texts into fixed-size vectors.
///
/// Vectors are expected to be L2-normalized so that a dot product is a cosine
/// similarity.
pub trait TextEncoder: Send + Sync {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

#[cfg(feature = "embeddings")]
pub use self::model2vec::Model2VecEncoder;

#[cfg(feature = "embeddings")]
mod model2vec {
    use super::TextEncoder;
    use crate::error::{CvParserError, Result};
    use log::info;
    use model2vec_rs::model::StaticModel;
    use std::time::Instant;

    /// Static (lookup-table) embeddings from a Model2Vec model.
    pub struct Model2VecEncoder {
        model: StaticModel,
    }

    impl Model2VecEncoder {
        /// Load from a local directory or a HuggingFace repo id.
        pub fn load(model: &str) -> Result<Self> {
            let start_time = Instant::now();

            let model = StaticModel::from_pretrained(
                model,
                None,       // token
                Some(true), // normalize
                None,       // subfolder
            )
            .map_err(|e| CvParserError::Embedding(format!("Failed to load model: {}", e)))?;

            info!("Embedding model loaded in {:.2?}", start_time.elapsed());
            Ok(Self { model })
        }
    }

    impl TextEncoder for Model2VecEncoder {
        fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(self.model.encode(texts))
        }
    }
}

/// Resolve the encoder once, when a pipeline is built.
///
/// Returns `None` when embeddings are off or the model cannot be loaded;
/// section detection then falls back to keywords only.
pub fn resolve_encoder(config: &EmbeddingConfig) -> Option<Arc<dyn TextEncoder>> {
    if !config.enabled {
        debug!("Embeddings disabled; section detection uses keywords only");
        return None;
    }

    load_encoder(&config.model)
}

#[cfg(feature = "embeddings")]
fn load_encoder(model: &str) -> Option<Arc<dyn TextEncoder>> {
    match Model2VecEncoder::load(model) {
        Ok(encoder) => {
            info!("Using embedding model {} for section detection", model);
            Some(Arc::new(encoder))
        }
        Err(e) => {
            warn!("Embedding model unavailable ({}); using keyword matching only", e);
            None
        }
    }
}

#[cfg(not(feature = "embeddings"))]
fn load_encoder(model: &str) -> Option<Arc<dyn TextEncoder>> {
    debug!("Built without the `embeddings` feature; ignoring model {}", model);
    None
}

pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
