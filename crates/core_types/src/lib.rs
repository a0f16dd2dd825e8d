pub mod note;
pub mod query;
pub mod timestamp;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use note::{Note, NoteId, NotePatch};
pub use query::{SearchQuery, listing_order};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UiLanguage {
    #[default]
    EnUs,
    ZhCn,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown ui language `{0}`")]
pub struct UnknownLanguage(pub String);

impl FromStr for UiLanguage {
    type Err = UnknownLanguage;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "en" | "en_us" => Ok(Self::EnUs),
            "zh" | "zh_cn" => Ok(Self::ZhCn),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

impl fmt::Display for UiLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnUs => f.write_str("en_us"),
            Self::ZhCn => f.write_str("zh_cn"),
        }
    }
}
