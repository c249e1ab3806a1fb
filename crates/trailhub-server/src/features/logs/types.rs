//! Log record types
//!
//! [`LogDocument`] is the persisted shape (BSON, `ObjectId`, BSON datetime);
//! [`LogRecord`] is what clients send and receive (hex id, RFC 3339 timestamp).

use bson::oid::ObjectId;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::client_info::ClientInfo;

/// A stored log event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub source: String,
    pub message: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub browser: Option<String>,
    #[serde(default)]
    pub is_tablet: bool,
    #[serde(default)]
    pub is_mobile: bool,
    #[serde(default)]
    pub is_pc: bool,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub address_ip: Option<String>,
    #[serde(default)]
    pub address_mac: Option<String>,
    pub anonymous: bool,
}

impl LogDocument {
    /// Build a document ready for a single insert
    ///
    /// `source` must already be normalized. `created` is truncated to
    /// milliseconds, the precision the store keeps.
    pub fn new(
        source: String,
        message: String,
        user_id: Option<String>,
        client: ClientInfo,
    ) -> Self {
        let anonymous = user_id.is_none();
        let device = client.device;

        Self {
            id: ObjectId::new(),
            source,
            message,
            user_id,
            created: Utc::now().trunc_subsecs(3),
            device: device.device,
            os: device.os,
            browser: device.browser,
            is_tablet: device.is_tablet,
            is_mobile: device.is_mobile,
            is_pc: device.is_pc,
            is_bot: device.is_bot,
            address_ip: client.address_ip,
            address_mac: client.address_mac,
            anonymous,
        }
    }
}

/// A log event as exposed by the API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct LogRecord {
    #[serde(rename = "_id")]
    #[schema(example = "6756f47af9096fa27c21d567")]
    pub id: String,
    #[schema(example = "billingapi")]
    pub source: String,
    #[schema(example = "Invoice 2024-118 exported")]
    pub message: String,
    pub user_id: Option<String>,
    pub created: DateTime<Utc>,
    pub device: Option<String>,
    pub os: Option<String>,
    pub browser: Option<String>,
    pub is_tablet: bool,
    pub is_mobile: bool,
    pub is_pc: bool,
    pub is_bot: bool,
    pub address_ip: Option<String>,
    pub address_mac: Option<String>,
    pub anonymous: bool,
}

impl From<LogDocument> for LogRecord {
    fn from(doc: LogDocument) -> Self {
        Self {
            id: doc.id.to_hex(),
            source: doc.source,
            message: doc.message,
            user_id: doc.user_id,
            created: doc.created,
            device: doc.device,
            os: doc.os,
            browser: doc.browser,
            is_tablet: doc.is_tablet,
            is_mobile: doc.is_mobile,
            is_pc: doc.is_pc,
            is_bot: doc.is_bot,
            address_ip: doc.address_ip,
            address_mac: doc.address_mac,
            anonymous: doc.anonymous,
        }
    }
}

/// Sort direction on `created`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Index direction as understood by the store
    pub fn direction(self) -> i32 {
        match self {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        }
    }
}

/// Equality constraints for `GET /logs`
///
/// Every field is optional; `source` is expected in normalized form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogFilter {
    pub source: Option<String>,
    pub user_id: Option<String>,
    pub device: Option<String>,
    pub os: Option<String>,
    pub is_tablet: Option<bool>,
    pub is_mobile: Option<bool>,
    pub is_pc: Option<bool>,
    pub is_bot: Option<bool>,
    pub anonymous: Option<bool>,
    pub created: Option<DateTime<Utc>>,
}
