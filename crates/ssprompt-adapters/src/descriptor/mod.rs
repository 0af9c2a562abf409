//! Descriptor codecs.

mod yaml;

pub use yaml::YamlDescriptorCodec;
