//! Built-in vindex types and the registry that instantiates them by name.

mod binary;
mod lookup;
mod numeric;

use std::sync::Arc;

use rustc_hash::FxHashMap;
use vgate_result::{Error, Result};

pub use binary::Binary;
pub use lookup::LookupVindex;
pub use numeric::Numeric;

use crate::vindex::Vindex;

/// Vindex type names accepted in a vschema document.
pub const VINDEX_TYPES: &[&str] = &["binary", "numeric", "lookup", "lookup_unique"];

/// Instantiate a vindex of type `vindex_type` declared as `name`.
pub fn create_vindex(
    vindex_type: &str,
    name: &str,
    params: &FxHashMap<String, String>,
) -> Result<Arc<dyn Vindex>> {
    let vindex: Arc<dyn Vindex> = match vindex_type {
        "binary" => Arc::new(Binary::new(name)),
        "numeric" => Arc::new(Numeric::new(name)),
        "lookup" => Arc::new(LookupVindex::from_params(name, params, false)?),
        "lookup_unique" => Arc::new(LookupVindex::from_params(name, params, true)?),
        other => {
            return Err(Error::ConfigError(format!(
                "vindex type {other} not found (known types: {})",
                VINDEX_TYPES.join(", ")
            )));
        }
    };
    Ok(vindex)
}
