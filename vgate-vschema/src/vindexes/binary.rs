use vgate_result::Result;
use vgate_types::{Destination, KeyspaceId, Value};

use crate::vindex::{VCursor, Vindex};

/// Identity vindex: the column value is the keyspace id.
#[derive(Debug, Clone)]
pub struct Binary {
    name: String,
}

impl Binary {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Vindex for Binary {
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
            .map(|id| Destination::KeyspaceId(KeyspaceId::new(id.to_bytes())))
            .collect())
    }
}
