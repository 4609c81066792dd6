//! Ulsan ITS bus arrival response DTOs.
//!
//! `getBusArrivalInfo.xo` answers with XML even when asked for `type=json`:
//!
//! ```xml
//! <tableInfo>
//!   <pageNo>1</pageNo>
//!   <list>
//!     <row><ROUTEID>...</ROUTEID><ROUTENM>...</ROUTENM>...</row>
//!   </list>
//! </tableInfo>
//! ```
//!
//! Failures from the open-data gateway use a different root element with a
//! `cmmMsgHeader` child. The root element name is not checked, so one type
//! covers both shapes.

use serde::Deserialize;

/// Top-level response document.
#[derive(Debug, Clone, Deserialize)]
pub struct ArrivalResponse {
    /// Arrival rows (`tableInfo.list`).
    pub list: Option<RowList>,

    /// Gateway error header, present only on service errors.
    #[serde(rename = "cmmMsgHeader")]
    pub header: Option<ServiceHeader>,
}

/// The `<list>` element.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RowList {
    #[serde(default)]
    pub row: Vec<ArrivalRow>,
}

/// One bus approaching the station.
///
/// The feed omits empty fields rather than sending empty elements in most
/// cases, so everything beyond the route id and name is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArrivalRow {
    /// Route identifier.
    #[serde(rename = "ROUTEID", default)]
    pub route_id: String,

    /// Route number as shown on the bus.
    #[serde(rename = "ROUTENM", default)]
    pub route_name: String,

    /// Stop the bus is currently at.
    #[serde(rename = "PRESENTSTOPNM")]
    pub present_stop_name: Option<String>,

    /// Seconds until the bus reaches this station.
    #[serde(rename = "ARRIVALTIME")]
    pub arrival_time: Option<String>,

    /// Number of stops still to go.
    #[serde(rename = "PREVSTOPCNT")]
    pub prev_stop_count: Option<String>,

    /// Vehicle registration number.
    #[serde(rename = "VEHICLENO")]
    pub vehicle_no: Option<String>,
}

/// Gateway error header.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceHeader {
    /// Short error summary, e.g. "SERVICE ERROR".
    #[serde(rename = "errMsg")]
    pub err_msg: Option<String>,

    /// Detailed reason, e.g. "SERVICE_KEY_IS_NOT_REGISTERED_ERROR".
    #[serde(rename = "returnAuthMsg")]
    pub return_auth_msg: Option<String>,

    /// Numeric reason code, e.g. "30".
    #[serde(rename = "returnReasonCode")]
    pub return_reason_code: Option<String>,
}
