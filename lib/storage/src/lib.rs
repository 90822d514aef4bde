pub mod encoder;
pub mod store;
pub mod table_io;

pub use encoder::{
    default_encoder_specs, CategoricalEncoderManager, EncoderSpec, OneHotEncoder,
    MISSING_TEXT_LABEL, MISSING_VALUE_LABEL,
};
pub use store::{EncoderStore, ARTIFACT_VERSION};
pub use table_io::{read_parquet, write_parquet};
