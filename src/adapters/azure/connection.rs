//! Storage connection string parsing.

use base64::Engine;
use reqwest::Url;

use crate::error::StorageError;

/// Account name of the local storage emulator.
pub const EMULATOR_ACCOUNT: &str = "devstoreaccount1";
/// Well-known, publicly documented key of the local storage emulator.
pub const EMULATOR_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
const EMULATOR_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

/// How requests to the account are authorized.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Shared Key: HMAC-SHA256 with the decoded account key.
    SharedKey {
        /// Storage account name.
        account: String,
        /// Decoded account key.
        key: Vec<u8>,
    },
    /// Shared access signature query string, without the leading `?`.
    Sas(String),
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SharedKey { account, .. } => {
                f.debug_struct("SharedKey").field("account", account).finish_non_exhaustive()
            }
            Self::Sas(_) => f.write_str("Sas(..)"),
        }
    }
}

/// Blob service endpoint plus the credential to use with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageAccount {
    /// Base URL of the blob service, without a trailing slash.
    pub blob_endpoint: Url,
    /// Request authorization.
    pub credential: Credential,
}

impl StorageAccount {
    /// Parse a storage connection string.
    ///
    /// Supports `UseDevelopmentStorage=true`, account name/key pairs with an
    /// optional protocol and endpoint suffix, an explicit `BlobEndpoint`, and
    /// `SharedAccessSignature`.
    ///
    /// # Errors
    ///
    /// Returns an error if required settings are missing or malformed.
    pub fn from_connection_string(raw: &str) -> Result<Self, StorageError> {
        let mut protocol = "https".to_string();
        let mut suffix = "core.windows.net".to_string();
        let mut account_name = None;
        let mut account_key = None;
        let mut blob_endpoint = None;
        let mut sas = None;
        let mut development = false;

        for part in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').ok_or_else(|| {
                StorageError::InvalidConnectionString(format!("expected key=value, got '{part}'"))
            })?;
            match key.trim().to_ascii_lowercase().as_str() {
                "usedevelopmentstorage" => development = value.trim().eq_ignore_ascii_case("true"),
                "defaultendpointsprotocol" => protocol = value.trim().to_string(),
                "endpointsuffix" => suffix = value.trim().to_string(),
                "accountname" => account_name = Some(value.trim().to_string()),
                "accountkey" => account_key = Some(value.trim().to_string()),
                "blobendpoint" => blob_endpoint = Some(value.trim().to_string()),
                "sharedaccesssignature" => {
                    sas = Some(value.trim().trim_start_matches('?').to_string());
                }
                _ => {}
            }
        }

        if development {
            return Ok(Self {
                blob_endpoint: parse_endpoint(EMULATOR_BLOB_ENDPOINT)?,
                credential: Credential::SharedKey {
                    account: EMULATOR_ACCOUNT.to_string(),
                    key: decode_key(EMULATOR_KEY)?,
                },
            });
        }

        let endpoint = match (blob_endpoint, &account_name) {
            (Some(endpoint), _) => endpoint,
            (None, Some(name)) => format!("{protocol}://{name}.blob.{suffix}"),
            (None, None) => {
                return Err(StorageError::InvalidConnectionString(
                    "missing AccountName or BlobEndpoint".into(),
                ));
            }
        };

        let credential = match (sas, account_key, account_name) {
            (Some(sas), _, _) => Credential::Sas(sas),
            (None, Some(key), Some(account)) => {
                Credential::SharedKey { account, key: decode_key(&key)? }
            }
            (None, Some(_), None) => {
                return Err(StorageError::InvalidConnectionString(
                    "AccountKey requires AccountName".into(),
                ));
            }
            (None, None, _) => {
                return Err(StorageError::InvalidConnectionString(
                    "missing AccountKey or SharedAccessSignature".into(),
                ));
            }
        };

        Ok(Self { blob_endpoint: parse_endpoint(&endpoint)?, credential })
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, StorageError> {
    Url::parse(raw.trim_end_matches('/'))
        .map_err(|e| StorageError::InvalidConnectionString(format!("bad endpoint '{raw}': {e}")))
}

fn decode_key(raw: &str) -> Result<Vec<u8>, StorageError> {
    base64::engine::general_purpose::STANDARD
        .decode(raw)
        .map_err(|e| StorageError::InvalidAccountKey(e.to_string()))
}
