pub mod decode;
pub mod transform;

pub use decode::SymphoniaDecoderAdapter;
pub use transform::RubatoTransformAdapter;
