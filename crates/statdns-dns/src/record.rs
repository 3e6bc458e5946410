//! Lookup service response model.
//!
//! Mirrors the JSON body returned by the lookup service:
//!
//! ```json
//! { "question": [ { "name": "...", "type": "A", "class": "IN" } ],
//!   "answer":   [ { "name": "...", "type": "A", "class": "IN",
//!                   "ttl": 300, "rdlength": 4, "rdata": "93.184.216.34" } ] }
//! ```
//!
//! Decoding is lenient about extra fields, missing sections and missing record
//! fields; only `type` is required. Numeric fields are carried as signed
//! integers and never interpreted.

use serde::Deserialize;
use statdns_core::defaults::ALIAS_RECORD_TYPE;

use crate::error::DnsError;

/// One entry of the query section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DnsQuestion {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default)]
    pub class: String,
}

/// One entry of the answer section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DnsAnswer {
    /// Owner name of the record.
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub ttl: i64,
    /// Length of the record data on the wire; carried, not interpreted.
    #[serde(default)]
    pub rdlength: i64,
    /// Record payload as text. For address records, the IP literal.
    #[serde(default)]
    pub rdata: String,
}

impl DnsAnswer {
    /// Alias records point at another name and never hold an address.
    pub fn is_alias(&self) -> bool {
        self.record_type == ALIAS_RECORD_TYPE
    }
}

/// Decoded lookup response.
///
/// `answer` keeps the order the service returned; the resolver relies on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DnsResult {
    #[serde(default)]
    pub question: Vec<DnsQuestion>,
    #[serde(default)]
    pub answer: Vec<DnsAnswer>,
}

impl DnsResult {
    /// Decode a response body.
    pub fn from_slice(body: &[u8]) -> Result<Self, DnsError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// The first answer, in received order, that is not an alias record.
    pub fn first_address_record(&self) -> Option<&DnsAnswer> {
        self.answer.iter().find(|answer| !answer.is_alias())
    }
}
