mod imprint;
pub mod output;
pub mod prep;
pub mod settings;

pub use imprint::{config_imprint, write_header};
pub use output::{format_sample, write_result, SnapshotWriter};
pub use prep::{write_preparation, xgtopw_deck};
pub use settings::{
    CapConfig, ConfigError, Configuration, IntegralConfig, OutputConfig, PropagationConfig, PulseConfig,
};
