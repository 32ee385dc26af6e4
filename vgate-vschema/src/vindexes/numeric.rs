use vgate_result::Result;
use vgate_types::{Destination, Value, uint64_key};

use crate::vindex::{VCursor, Vindex};

/// Maps an unsigned integer column to its 8-byte big-endian encoding.
///
/// Values that are not unsigned integers map to [`Destination::None`].
#[derive(Debug, Clone)]
pub struct Numeric {
    name: String,
}

impl Numeric {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Vindex for Numeric {
    fn name(&self) -> &str {
        &self.name
    }

    fn cost(&self) -> u32 {
        1
    }

    fn is_unique(&self) -> bool {
        true
    }

    fn map(&self, _cursor: Option<&dyn VCursor>, ids: &[Value]) -> Result<Vec<Destination>> {
        Ok(ids
            .iter()
            .map(|id| match id.to_u64() {
                Ok(num) => Destination::KeyspaceId(uint64_key(num)),
                Err(_) => Destination::None,
            })
            .collect())
    }
}
