pub mod load;
pub mod model;

pub use load::{load_config, CONFIG_FILE};
pub use model::{BackupTypes, RuntimeConfig};
