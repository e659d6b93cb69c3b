use thiserror::Error;

use crate::settings::StorageError;
use crate::weapon::DataError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("weapon not found: {0}")]
    WeaponNotFound(String),

    #[error("magazine {index} not available for {weapon}")]
    MagazineNotFound { weapon: String, index: usize },

    #[error("invalid numeric setting {key}: {value:?}")]
    InvalidNumericSetting { key: String, value: String },

    #[error(transparent)]
    DataIntegrity(#[from] DataError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
