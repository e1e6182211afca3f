//! BERT sentence encoder running locally on Candle.
//!
//! Downloads the model (config, tokenizer, safetensors weights) from the
//! Hugging Face Hub on first use and runs it on CPU. Sentence vectors are
//! mean-pooled over the attention mask and L2-normalized, matching the
//! sentence-transformers reference pipeline for the default model.

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config, DTYPE};
use hf_hub::{Repo, RepoType, api::sync::Api};
use tokenizers::{PaddingParams, Tokenizer};

use super::{Embedder, EmbeddingError};

/// Default model: the sentence encoder the catalog corpus is embedded with.
pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Sentence-embedding model loaded from the Hugging Face Hub.
pub struct BertEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dimension: usize,
}

impl BertEmbedder {
    /// Download (if needed) and load the embedding model.
    ///
    /// Blocking: performs network and disk I/O plus weight loading. The
    /// server wraps this in `spawn_blocking` at startup.
    ///
    /// # Errors
    ///
    /// Returns `EmbeddingError::Fetch` if the Hub is unreachable or the
    /// model files are missing, `EmbeddingError::Load` if the downloaded
    /// files cannot be parsed.
    pub fn load(model_id: &str, revision: &str) -> Result<Self, EmbeddingError> {
        let device = Device::Cpu;

        let api = Api::new().map_err(|e| EmbeddingError::Fetch(e.to_string()))?;
        let repo = api.repo(Repo::with_revision(
            model_id.to_owned(),
            RepoType::Model,
            revision.to_owned(),
        ));

        let fetch = |file: &str| {
            repo.get(file)
                .map_err(|e| EmbeddingError::Fetch(format!("{file}: {e}")))
        };
        let config_path = fetch("config.json")?;
        let tokenizer_path = fetch("tokenizer.json")?;
        let weights_path = fetch("model.safetensors")?;

        let config_contents = std::fs::read_to_string(config_path)
            .map_err(|e| EmbeddingError::Load(format!("config.json: {e}")))?;
        let config: Config = serde_json::from_str(&config_contents)
            .map_err(|e| EmbeddingError::Load(format!("config.json: {e}")))?;

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| EmbeddingError::Load(format!("tokenizer.json: {e}")))?;
        // Pad to the longest sequence in each batch so one forward pass
        // covers the whole corpus.
        tokenizer.with_padding(Some(PaddingParams::default()));

        let tensors = candle_core::safetensors::load(&weights_path, &device)
            .map_err(|e| EmbeddingError::Load(format!("model.safetensors: {e}")))?;
        let vb = VarBuilder::from_tensors(tensors, DTYPE, &device);
        let model = BertModel::load(vb, &config)
            .map_err(|e| EmbeddingError::Load(format!("model.safetensors: {e}")))?;

        let dimension = config.hidden_size;

        Ok(Self {
            model,
            tokenizer,
            device,
            dimension,
        })
    }

    /// Tokenize, run the encoder, pool and normalize a batch of texts.
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| EmbeddingError::Tokenize(e.to_string()))?;

        let batch = encodings.len();
        let seq_len = encodings.first().map_or(0, |e| e.get_ids().len());

        let mut ids = Vec::with_capacity(batch * seq_len);
        let mut mask = Vec::with_capacity(batch * seq_len);
        for encoding in &encodings {
            ids.extend_from_slice(encoding.get_ids());
            mask.extend_from_slice(encoding.get_attention_mask());
        }

        let token_ids = Tensor::from_vec(ids, (batch, seq_len), &self.device)?;
        let attention_mask = Tensor::from_vec(mask, (batch, seq_len), &self.device)?;
        let token_type_ids = token_ids.zeros_like()?;

        let hidden = self
            .model
            .forward(&token_ids, &token_type_ids, Some(&attention_mask))?;

        let pooled = mean_pool(&hidden, &attention_mask)?;
        let normalized = l2_normalize(&pooled)?;

        Ok(normalized.to_vec2::<f32>()?)
    }
}

impl Embedder for BertEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vectors = self.encode(std::slice::from_ref(&text.to_owned()))?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::Tokenize("encoder produced no output".to_owned()))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.encode(texts)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Mean pooling over the sequence dimension, weighted by the attention mask
/// so padding tokens do not dilute the sentence vector.
fn mean_pool(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor, candle_core::Error> {
    let mask = attention_mask.unsqueeze(2)?.to_dtype(hidden.dtype())?;
    let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
    let counts = mask.sum(1)?.clamp(1e-9, f64::MAX)?;
    summed.broadcast_div(&counts)
}

/// Scale each row to unit L2 norm.
fn l2_normalize(vectors: &Tensor) -> Result<Tensor, candle_core::Error> {
    vectors.broadcast_div(&vectors.sqr()?.sum_keepdim(1)?.sqrt()?)
}
