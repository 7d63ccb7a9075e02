//! Logical query key identifying one cacheable warehouse query.

use crate::{validate_client_data_type, Client, DataType, RostergapResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The (client, data type) pair identifying a logical cacheable query.
///
/// Equality is structural; a `QueryKey` can only be built for a combination
/// the client registry supports, so downstream layers never re-validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryKey {
    client: Client,
    data_type: DataType,
}

impl QueryKey {
    /// Creates a key after checking the combination against the registry.
    pub fn new(client: Client, data_type: DataType) -> RostergapResult<Self> {
        validate_client_data_type(client, data_type)?;
        Ok(Self { client, data_type })
    }

    #[must_use]
    pub const fn client(&self) -> Client {
        self.client
    }

    #[must_use]
    pub const fn data_type(&self) -> DataType {
        self.data_type
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.client, self.data_type)
    }
}
