//! Client and data type value objects plus the supported-combination registry.

use crate::RostergapError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Clients whose rosters can be compared against the enrollment warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Client {
    MatoGrosso,
    Parana,
    Goias,
}

/// Kinds of roster data a client can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Students,
    Teachers,
    TeachersTec,
    TeachersWithGls,
    OtherComponents,
}

/// Where a client's source-of-truth roster lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    GoogleSheets,
    GoogleDrive,
    Ftp,
}

impl Client {
    /// Returns all supported clients.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::MatoGrosso, Self::Parana, Self::Goias]
    }

    /// The company name this client is registered under in the enrollment
    /// warehouse.
    #[must_use]
    pub const fn company_name(&self) -> &'static str {
        match self {
            Self::MatoGrosso => "SEDUC-MT: Mato Grosso",
            Self::Parana => "SEED-PR: Parana",
            Self::Goias => "SEDUC-GO: Goias",
        }
    }

    /// Which kind of external source holds this client's roster.
    #[must_use]
    pub const fn source_kind(&self) -> SourceKind {
        match self {
            Self::MatoGrosso => SourceKind::GoogleSheets,
            Self::Parana => SourceKind::GoogleDrive,
            Self::Goias => SourceKind::Ftp,
        }
    }

    /// Data types supported for this client.
    #[must_use]
    pub fn data_types(&self) -> &'static [DataType] {
        match self {
            Self::MatoGrosso | Self::Parana => &[DataType::Students, DataType::Teachers],
            Self::Goias => &[
                DataType::Students,
                DataType::Teachers,
                DataType::TeachersTec,
                DataType::TeachersWithGls,
                DataType::OtherComponents,
            ],
        }
    }

    /// Checks whether `data_type` is supported for this client.
    #[must_use]
    pub fn supports(&self, data_type: DataType) -> bool {
        self.data_types().contains(&data_type)
    }
}

impl DataType {
    /// Returns all data types known to the system.
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [
            Self::Students,
            Self::Teachers,
            Self::TeachersTec,
            Self::TeachersWithGls,
            Self::OtherComponents,
        ]
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MatoGrosso => write!(f, "mato_grosso"),
            Self::Parana => write!(f, "parana"),
            Self::Goias => write!(f, "goias"),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Students => write!(f, "students"),
            Self::Teachers => write!(f, "teachers"),
            Self::TeachersTec => write!(f, "teachers_tec"),
            Self::TeachersWithGls => write!(f, "teachers_with_gls"),
            Self::OtherComponents => write!(f, "other_components"),
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GoogleSheets => write!(f, "google_sheets"),
            Self::GoogleDrive => write!(f, "google_drive"),
            Self::Ftp => write!(f, "ftp"),
        }
    }
}

impl FromStr for Client {
    type Err = RostergapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mato_grosso" => Ok(Self::MatoGrosso),
            "parana" => Ok(Self::Parana),
            "goias" => Ok(Self::Goias),
            other => Err(RostergapError::UnsupportedClient {
                client: other.to_string(),
                supported: supported_client_names().join(", "),
            }),
        }
    }
}

impl FromStr for DataType {
    type Err = RostergapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "students" => Ok(Self::Students),
            "teachers" => Ok(Self::Teachers),
            "teachers_tec" => Ok(Self::TeachersTec),
            "teachers_with_gls" => Ok(Self::TeachersWithGls),
            "other_components" => Ok(Self::OtherComponents),
            other => Err(RostergapError::validation(format!(
                "Unknown data_type: {}",
                other
            ))),
        }
    }
}

/// String names of all supported clients, in registry order.
#[must_use]
pub fn supported_client_names() -> Vec<String> {
    Client::all().iter().map(ToString::to_string).collect()
}

/// Validates that `data_type` is supported for `client`.
///
/// Called by the request-facing layer before the cache is consulted; the
/// cache and executor assume the pair has already been validated.
pub fn validate_client_data_type(client: Client, data_type: DataType) -> Result<(), RostergapError> {
    if client.supports(data_type) {
        return Ok(());
    }
    Err(RostergapError::UnsupportedDataType {
        client: client.to_string(),
        data_type: data_type.to_string(),
        supported: client
            .data_types()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// Per-client metadata exposed by the `/clients` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ClientInfo {
    /// Client identifier.
    pub name: String,
    /// Data types supported for this client.
    pub data_types: Vec<String>,
    /// Kind of external source holding the roster.
    pub source: String,
}

/// Metadata for all supported clients, in registry order.
#[must_use]
pub fn supported_clients() -> Vec<ClientInfo> {
    Client::all()
        .iter()
        .map(|client| ClientInfo {
            name: client.to_string(),
            data_types: client.data_types().iter().map(ToString::to_string).collect(),
            source: client.source_kind().to_string(),
        })
        .collect()
}
