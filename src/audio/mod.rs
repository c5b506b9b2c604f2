pub mod decode;
pub mod source;
pub mod stream;
pub mod tone;

pub use decode::FileSource;
pub use source::{chunk_mean, SampleSource};
pub use stream::StreamSource;
pub use tone::ToneSource;
