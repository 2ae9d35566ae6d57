//! Code registries backing result annotation and filtering.
//!
//! Two dictionaries come from the gazetteer's definition endpoints: concise
//! type codes (`CITY` -> "City") and province codes (`35` -> Ontario). Both
//! are loaded once per language and cached behind an explicit store object
//! owned by the searcher facade; nothing here is process-global.

mod provinces;
mod types;

pub use provinces::{Province, ProvinceRegistry, ProvinceStore, fsa_to_province_abbrs};
pub use types::{TypeRegistry, TypeStore};
