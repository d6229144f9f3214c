pub mod dsp;
pub mod fbank;
pub mod spectral;
pub mod tdnn;

pub use spectral::SpectralEmbeddingAdapter;
pub use tdnn::{TdnnAdapterConfig, TdnnEmbeddingAdapter};
