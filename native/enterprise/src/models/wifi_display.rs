use serde::{Deserialize, Serialize};

/// Connection status reported in [`WifiDisplayModel::status_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WifiDisplayStatus {
    NotConnected,
    None,
    Scanning,
    Connecting,
    Available,
    NotAvailable,
    InUse,
    Connected,
}

impl WifiDisplayStatus {
    pub fn code(self) -> i32 {
        match self {
            Self::NotConnected => -1,
            Self::None => 0,
            Self::Scanning => 1,
            Self::Connecting => 2,
            Self::Available => 3,
            Self::NotAvailable => 4,
            Self::InUse => 5,
            Self::Connected => 6,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            -1 => Self::NotConnected,
            0 => Self::None,
            1 => Self::Scanning,
            2 => Self::Connecting,
            3 => Self::Available,
            4 => Self::NotAvailable,
            5 => Self::InUse,
            6 => Self::Connected,
            _ => return None,
        })
    }
}

/// A Wi-Fi display (Miracast sink) discovered by the service.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiDisplayModel {
    pub device_address: String,
    pub device_name: String,
    pub is_available: bool,
    pub can_connect: bool,
    pub is_remembered: bool,
    pub status_code: i32,
    pub status: String,
    pub description: String,
}

impl WifiDisplayModel {
    /// Parsed [`Self::status_code`], `None` if the service sent an unknown code.
    pub fn status(&self) -> Option<WifiDisplayStatus> {
        WifiDisplayStatus::from_code(self.status_code)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(WifiDisplayStatus::from_code(-1), Some(WifiDisplayStatus::NotConnected));
        assert_eq!(WifiDisplayStatus::from_code(6), Some(WifiDisplayStatus::Connected));
        assert_eq!(WifiDisplayStatus::from_code(7), None);
        assert_eq!(WifiDisplayStatus::InUse.code(), 5);
    }

    #[test]
    fn test_model_status() {
        let model = WifiDisplayModel { status_code: 3, ..Default::default() };
        assert_eq!(model.status(), Some(WifiDisplayStatus::Available));
    }
}
