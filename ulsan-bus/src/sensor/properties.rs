//! Attribute labels and icons.

/// Raw record field names and the labels they are exported under.
pub const BUS_PROPERTIES: [(&str, &str); 8] = [
    ("busRouteId", "노선ID"),
    ("rtNm", "버스번호"),
    ("present", "현재정류소"),
    ("arrivalTime", "도착예정(초)"),
    ("prevStopCnt", "남은정류소"),
    ("vehicleNo", "차량번호"),
    ("syncDate", "Sync Date"),
    ("isUpdate", "is Update"),
];

pub const ATTR_SYNC_DATE: &str = "Sync Date";
pub const ATTR_IS_UPDATE: &str = "is Update";
pub const ATTR_API_ERROR_CODE: &str = "API Error Code";
pub const ATTR_API_ERROR_MSG: &str = "API Error Msg";

pub const ICON_STATION: &str = "mdi:nature-people";
pub const ICON_BUS: &str = "mdi:bus";
pub const ICON_BUS_READY: &str = "mdi:bus-clock";
pub const ICON_SIGN_CAUTION: &str = "mdi:sign-caution";
pub const ICON_EYE_OFF: &str = "mdi:eye-off";

/// Placeholder state shown when there is nothing meaningful to display.
pub const PLACEHOLDER: &str = "-";

/// State shown by a station whose last refresh failed.
pub const ERROR_STATE: &str = "Error";

/// Look up the export label for a raw field name.
///
/// Unknown names are exported as-is.
pub fn property_label(key: &str) -> &str {
    BUS_PROPERTIES
        .iter()
        .find(|(raw, _)| *raw == key)
        .map_or(key, |(_, label)| label)
}
