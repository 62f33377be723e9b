//! Format adapters

mod json;
mod scan;
mod toml;

pub use self::json::JsonAdapter;
pub use self::toml::TomlAdapter;
