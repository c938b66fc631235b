use crate::modal::ModalDescriptor;
use crate::page::PropertyPageConfig;
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SerializationResult<T> = Result<T, SerializationError>;

pub fn parse_page(json: &str) -> SerializationResult<PropertyPageConfig> {
    Ok(serde_json::from_str(json)?)
}

pub fn load_page(path: impl AsRef<Path>) -> SerializationResult<PropertyPageConfig> {
    let json = fs::read_to_string(path)?;
    parse_page(&json)
}

pub fn load_modal(path: impl AsRef<Path>) -> SerializationResult<ModalDescriptor> {
    let json = fs::read_to_string(path)?;
    let modal = serde_json::from_str(&json)?;
    Ok(modal)
}
