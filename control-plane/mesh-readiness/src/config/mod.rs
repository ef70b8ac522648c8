mod types;

pub use types::{FeaturesConfig, LabelConfig, ReadinessConfig};
