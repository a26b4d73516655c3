//! The declared interface of the privileged device-management service.
//!
//! The host's IPC transport implements [`RemoteService`]; the proxy only ever
//! talks to the service through it.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use time::PrimitiveDateTime;
use tokio::sync::{mpsc, oneshot};

use crate::models::*;

/// Transport-level failures of a remote call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    #[error("remote service is dead")]
    DeadObject,
    #[error("transaction failed")]
    FailedTransaction,
    #[error("call rejected by the service: {0}")]
    Rejected(String),
}

/// Calls that either return nothing or answer later through a [`Reply`].
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    SetDeviceAction(DeviceControl),
    ManageApp { action: PackageControl, path: String },
    SetAutoConnectWifi { ssid: String, password: String },
    SetAutoConnectWifiWithErrorCode { ssid: String, password: String },
    ClearAutoConnectWifi,
    SetHomeKey { event: HomeEvent, function: HomeFunction },
    SetHomeKeyAll {
        event: HomeEvent,
        function: HomeFunction,
        timeout: i32,
        package: String,
        class_name: String,
    },
    DisablePowerKey { single_tap: bool, enable: bool },
    SetScreenOffDelay(ScreenOffDelay),
    SetControllerPairTime(ControllerPairTime),
    GetControllerPairTime,
    WriteConfigFile { path: String, content: String },
    ResetAllKeysToDefault,
    SwitchLargeSpaceScene { open: bool },
    GetLargeSpaceStatus,
    ExportMaps,
    ImportMaps,
    GetSystemFunctionStatus(SystemFunction),
    SetPowerOnOffLogo { logo: PowerOnOffLogo, path: String },
    SetIpd(f32),
    SetSystemCountryCode(String),
    InitCast,

    SetSleepDelay(SleepDelay),
    SwitchSystemFunction { function: SystemFunction, switch: Switch },
    SetUsbConfigurationOption(UsbConfigMode),
    ScreenOn,
    ScreenOff,
    AcquireWakeLock,
    ReleaseWakeLock,
    SetKeyEnabled { key: SystemKey, enabled: bool },
    SetAppAsHome { switch: Switch, package: String },
    KillApps { pids: Vec<i32>, packages: Vec<String> },
    KillBackgroundAppsExcept(Vec<String>),
    FreezeScreen(bool),
    OpenMiracast,
    CloseMiracast,
    StartScan,
    StopScan,
    ConnectWifiDisplay(WifiDisplayModel),
    DisconnectWifiDisplay,
    ForgetWifiDisplay { address: String },
    RenameWifiDisplay { address: String, name: String },
    UpdateWifiDisplays,
    ScheduleStartup { at: PrimitiveDateTime, enabled: bool },
    ScheduleShutdown { at: PrimitiveDateTime, enabled: bool },
    SetAppKeepAlive { package: String, keep_alive: bool },
    OpenVrSettingsItem { item: VrSettingsItem, hide_others: bool },
    SwitchVolumeToHomeAndEnter(Switch),
    SetPowerOffWithUsbCable(Switch),
    RemoveControllerHomeKey(HomeEvent),
    Capture,
    Record,
}

impl RemoteCall {
    /// Operation name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetDeviceAction(_) => "set_device_action",
            Self::ManageApp { .. } => "manage_app",
            Self::SetAutoConnectWifi { .. } => "set_auto_connect_wifi",
            Self::SetAutoConnectWifiWithErrorCode { .. } => "set_auto_connect_wifi_with_error_code",
            Self::ClearAutoConnectWifi => "clear_auto_connect_wifi",
            Self::SetHomeKey { .. } => "set_home_key",
            Self::SetHomeKeyAll { .. } => "set_home_key_all",
            Self::DisablePowerKey { .. } => "disable_power_key",
            Self::SetScreenOffDelay(_) => "set_screen_off_delay",
            Self::SetControllerPairTime(_) => "set_controller_pair_time",
            Self::GetControllerPairTime => "get_controller_pair_time",
            Self::WriteConfigFile { .. } => "write_config_file",
            Self::ResetAllKeysToDefault => "reset_all_keys_to_default",
            Self::SwitchLargeSpaceScene { .. } => "switch_large_space_scene",
            Self::GetLargeSpaceStatus => "get_large_space_status",
            Self::ExportMaps => "export_maps",
            Self::ImportMaps => "import_maps",
            Self::GetSystemFunctionStatus(_) => "get_system_function_status",
            Self::SetPowerOnOffLogo { .. } => "set_power_on_off_logo",
            Self::SetIpd(_) => "set_ipd",
            Self::SetSystemCountryCode(_) => "set_system_country_code",
            Self::InitCast => "init_cast",
            Self::SetSleepDelay(_) => "set_sleep_delay",
            Self::SwitchSystemFunction { .. } => "switch_system_function",
            Self::SetUsbConfigurationOption(_) => "set_usb_configuration_option",
            Self::ScreenOn => "screen_on",
            Self::ScreenOff => "screen_off",
            Self::AcquireWakeLock => "acquire_wake_lock",
            Self::ReleaseWakeLock => "release_wake_lock",
            Self::SetKeyEnabled { .. } => "set_key_enabled",
            Self::SetAppAsHome { .. } => "set_app_as_home",
            Self::KillApps { .. } => "kill_apps",
            Self::KillBackgroundAppsExcept(_) => "kill_background_apps_except",
            Self::FreezeScreen(_) => "freeze_screen",
            Self::OpenMiracast => "open_miracast",
            Self::CloseMiracast => "close_miracast",
            Self::StartScan => "start_scan",
            Self::StopScan => "stop_scan",
            Self::ConnectWifiDisplay(_) => "connect_wifi_display",
            Self::DisconnectWifiDisplay => "disconnect_wifi_display",
            Self::ForgetWifiDisplay { .. } => "forget_wifi_display",
            Self::RenameWifiDisplay { .. } => "rename_wifi_display",
            Self::UpdateWifiDisplays => "update_wifi_displays",
            Self::ScheduleStartup { .. } => "schedule_startup",
            Self::ScheduleShutdown { .. } => "schedule_shutdown",
            Self::SetAppKeepAlive { .. } => "set_app_keep_alive",
            Self::OpenVrSettingsItem { .. } => "open_vr_settings_item",
            Self::SwitchVolumeToHomeAndEnter(_) => "switch_volume_to_home_and_enter",
            Self::SetPowerOffWithUsbCable(_) => "set_power_off_with_usb_cable",
            Self::RemoveControllerHomeKey(_) => "remove_controller_home_key",
            Self::Capture => "capture",
            Self::Record => "record",
        }
    }
}

/// Calls whose result is returned directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteQuery {
    DeviceInfo(SystemInfo),
    IsMiracastOn,
    ConnectedWifiDisplay,
    SaveLargeSpaceMaps,
    CpuUsages,
    DeviceTemperatures { kind: i32, source: i32 },
    IsVolumeChangeToHomeAndEnter,
    PowerOffWithUsbCable,
    SettingsTabStatus(SettingsTab),
    SetSettingsTabStatus { tab: SettingsTab, switch: Switch },
    ScreenOffDelay,
    SleepDelay,
    ScreencastAudioOutput,
    SetScreencastAudioOutput(ScreencastAudioOutput),
    CastOption(CastOption),
    SetCastOption { option: CastOption, value: CastOptionValue },
    CastShowAuthorization,
    SetCastShowAuthorization(i32),
    CastUrl(CastUrlType),
    StopCast,
    SetCastMediaFormat { bitrate: i32 },
    ControllerKeyState(ControllerKey),
    SetControllerKeyState { key: ControllerKey, switch: Switch },
    KeyStatus(SystemKey),
    ControllerConnectState,
    ControllerBattery,
    InstallOtaPackage(String),
    PowerKeyStatus,
    HomeKeyStatus(HomeEvent),
    UsbConfigurationOption,
    CurrentLauncher,
    AutoConnectWifiConfig,
    StartupSchedule,
    ShutdownSchedule,
    SetSystemLanguage(String),
    SystemLanguage,
    SystemCountryCode,
    ConfigureWifi { ssid: String, password: String },
    ConfiguredWifi,
    SetSkipInitSettingPage(i32),
    SkipInitSettingPage,
    IsInitSettingComplete,
    CustomizeAppLibrary { packages: Vec<String>, switch: Switch },
    AppLibraryHideList,
    AutoMiracastConfig,
    StartActivity {
        package: String,
        class_name: String,
        action: String,
        extra: String,
        categories: Vec<String>,
        flags: Vec<i32>,
    },
}

impl RemoteQuery {
    /// Operation name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DeviceInfo(_) => "get_device_info",
            Self::IsMiracastOn => "is_miracast_on",
            Self::ConnectedWifiDisplay => "get_connected_wifi_display",
            Self::SaveLargeSpaceMaps => "save_large_space_maps",
            Self::CpuUsages => "get_cpu_usages",
            Self::DeviceTemperatures { .. } => "get_device_temperatures",
            Self::IsVolumeChangeToHomeAndEnter => "is_volume_change_to_home_and_enter",
            Self::PowerOffWithUsbCable => "get_power_off_with_usb_cable",
            Self::SettingsTabStatus(_) => "get_settings_tab_status",
            Self::SetSettingsTabStatus { .. } => "set_settings_tab_status",
            Self::ScreenOffDelay => "get_screen_off_delay",
            Self::SleepDelay => "get_sleep_delay",
            Self::ScreencastAudioOutput => "get_screencast_audio_output",
            Self::SetScreencastAudioOutput(_) => "set_screencast_audio_output",
            Self::CastOption(_) => "get_cast_option",
            Self::SetCastOption { .. } => "set_cast_option",
            Self::CastShowAuthorization => "get_cast_show_authorization",
            Self::SetCastShowAuthorization(_) => "set_cast_show_authorization",
            Self::CastUrl(_) => "get_cast_url",
            Self::StopCast => "stop_cast",
            Self::SetCastMediaFormat { .. } => "set_cast_media_format",
            Self::ControllerKeyState(_) => "get_controller_key_state",
            Self::SetControllerKeyState { .. } => "set_controller_key_state",
            Self::KeyStatus(_) => "get_key_status",
            Self::ControllerConnectState => "get_controller_connect_state",
            Self::ControllerBattery => "get_controller_battery",
            Self::InstallOtaPackage(_) => "install_ota_package",
            Self::PowerKeyStatus => "get_power_key_status",
            Self::HomeKeyStatus(_) => "get_home_key_status",
            Self::UsbConfigurationOption => "get_usb_configuration_option",
            Self::CurrentLauncher => "get_current_launcher",
            Self::AutoConnectWifiConfig => "get_auto_connect_wifi_config",
            Self::StartupSchedule => "get_startup_schedule",
            Self::ShutdownSchedule => "get_shutdown_schedule",
            Self::SetSystemLanguage(_) => "set_system_language",
            Self::SystemLanguage => "get_system_language",
            Self::SystemCountryCode => "get_system_country_code",
            Self::ConfigureWifi { .. } => "configure_wifi",
            Self::ConfiguredWifi => "get_configured_wifi",
            Self::SetSkipInitSettingPage(_) => "set_skip_init_setting_page",
            Self::SkipInitSettingPage => "get_skip_init_setting_page",
            Self::IsInitSettingComplete => "is_init_setting_complete",
            Self::CustomizeAppLibrary { .. } => "customize_app_library",
            Self::AppLibraryHideList => "get_app_library_hide_list",
            Self::AutoMiracastConfig => "get_auto_miracast_config",
            Self::StartActivity { .. } => "start_activity",
        }
    }
}

/// A result produced by the service.
///
/// Enumerated results travel as [`RemoteValue::Ordinal`].
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteValue {
    Unit,
    Bool(bool),
    Int(i32),
    Ordinal(i32),
    Text(String),
    Texts(Vec<String>),
    Ints(Vec<i32>),
    Floats(Vec<f32>),
    CpuUsages(Vec<CpuUsageInfo>),
    WifiDisplay(Option<WifiDisplayModel>),
}

impl RemoteValue {
    pub fn into_bool(self) -> Result<bool, Self> {
        match self {
            Self::Bool(v) => Ok(v),
            other => Err(other),
        }
    }

    /// Plain integers and ordinals both adapt to an integer result.
    pub fn into_int(self) -> Result<i32, Self> {
        match self {
            Self::Int(v) | Self::Ordinal(v) => Ok(v),
            other => Err(other),
        }
    }

    pub fn into_text(self) -> Result<String, Self> {
        match self {
            Self::Text(v) => Ok(v),
            other => Err(other),
        }
    }

    pub fn into_texts(self) -> Result<Vec<String>, Self> {
        match self {
            Self::Texts(v) => Ok(v),
            other => Err(other),
        }
    }

    pub fn into_ints(self) -> Result<Vec<i32>, Self> {
        match self {
            Self::Ints(v) => Ok(v),
            other => Err(other),
        }
    }

    pub fn into_floats(self) -> Result<Vec<f32>, Self> {
        match self {
            Self::Floats(v) => Ok(v),
            other => Err(other),
        }
    }

    pub fn into_cpu_usages(self) -> Result<Vec<CpuUsageInfo>, Self> {
        match self {
            Self::CpuUsages(v) => Ok(v),
            other => Err(other),
        }
    }

    pub fn into_wifi_display(self) -> Result<Option<WifiDisplayModel>, Self> {
        match self {
            Self::WifiDisplay(v) => Ok(v),
            other => Err(other),
        }
    }

    /// Decodes an ordinal into `E`; unknown ordinals are rejected.
    pub fn into_enum<E: OrdinalEnum>(self) -> Result<E, Self> {
        match self {
            Self::Ordinal(v) => E::from_ordinal(v).ok_or(Self::Ordinal(v)),
            other => Err(other),
        }
    }
}

/// Completion handle handed to the service with a [`RemoteCall`].
///
/// Sending consumes the handle, so a call completes at most once. Dropping it
/// without sending tells the proxy that no result is coming.
#[derive(Debug)]
pub struct Reply(oneshot::Sender<RemoteValue>);

impl Reply {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<RemoteValue>) {
        let (tx, rx) = oneshot::channel();
        (Self(tx), rx)
    }

    pub fn send(self, value: RemoteValue) {
        // The proxy side only goes away with the runtime
        let _ = self.0.send(value);
    }
}

/// Event streams the service pushes to registered listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    WifiDisplayModels,
    WifiDisplayJson,
    MarkerInfos,
}

impl Topic {
    pub fn name(self) -> &'static str {
        match self {
            Self::WifiDisplayModels => "wifi_display_models",
            Self::WifiDisplayJson => "wifi_display_json",
            Self::MarkerInfos => "marker_infos",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteEvent {
    WifiDisplayModels(Vec<WifiDisplayModel>),
    WifiDisplayJson(String),
    MarkerInfos(Vec<MarkerInfo>),
}

/// Sending half of a listener registration.
#[derive(Debug, Clone)]
pub struct EventSink(mpsc::UnboundedSender<RemoteEvent>);

impl EventSink {
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<RemoteEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self(tx), rx)
    }

    /// Returns `false` once the listener has been replaced or the proxy unbound.
    pub fn send(&self, event: RemoteEvent) -> bool {
        self.0.send(event).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }
}

/// A bound connection to the device-management service.
#[async_trait]
pub trait RemoteService: Send + Sync + fmt::Debug {
    /// Issues `call`. When `reply` is given the service answers through it,
    /// possibly from another thread and long after this returns.
    fn transact(&self, call: RemoteCall, reply: Option<Reply>) -> Result<(), RemoteError>;

    /// Issues `query` and waits for its result.
    async fn query(&self, query: RemoteQuery) -> Result<RemoteValue, RemoteError>;

    /// Registers `sink` as the single listener for `topic`, returning the
    /// service's registration code.
    fn subscribe(&self, topic: Topic, sink: EventSink) -> Result<i32, RemoteError>;
}
