//! Device, app, Wi-Fi and key configuration requests.

use time::PrimitiveDateTime;
use tracing::instrument;

use super::{ServiceProxy, ensure_valid_package, report};
use crate::{
    models::*,
    remote::{RemoteCall, RemoteValue},
};

impl ServiceProxy {
    /// Reboots or shuts down the device. The callback receives the service's result code.
    #[instrument(skip(self, callback))]
    pub async fn set_device_action(
        &self,
        action: DeviceControl,
        callback: impl FnOnce(i32) + Send + 'static,
    ) {
        self.request(RemoteCall::SetDeviceAction(action), RemoteValue::into_int, callback).await;
    }

    /// Silently installs the APK at `path`, or uninstalls the package named by it.
    #[instrument(skip(self, callback))]
    pub async fn manage_app(
        &self,
        action: PackageControl,
        path: &str,
        callback: impl FnOnce(i32) + Send + 'static,
    ) {
        let call = RemoteCall::ManageApp { action, path: path.to_string() };
        self.request(call, RemoteValue::into_int, callback).await;
    }

    #[instrument(skip(self, password, callback))]
    pub async fn set_auto_connect_wifi(
        &self,
        ssid: &str,
        password: &str,
        callback: impl FnOnce(bool) + Send + 'static,
    ) {
        let call = RemoteCall::SetAutoConnectWifi {
            ssid: ssid.to_string(),
            password: password.to_string(),
        };
        self.request(call, RemoteValue::into_bool, callback).await;
    }

    /// Like [`ServiceProxy::set_auto_connect_wifi`], reporting an error code instead.
    #[instrument(skip(self, password, callback))]
    pub async fn set_auto_connect_wifi_with_error_code(
        &self,
        ssid: &str,
        password: &str,
        callback: impl FnOnce(i32) + Send + 'static,
    ) {
        let call = RemoteCall::SetAutoConnectWifiWithErrorCode {
            ssid: ssid.to_string(),
            password: password.to_string(),
        };
        self.request(call, RemoteValue::into_int, callback).await;
    }

    #[instrument(skip(self, callback))]
    pub async fn clear_auto_connect_wifi(&self, callback: impl FnOnce(bool) + Send + 'static) {
        self.request(RemoteCall::ClearAutoConnectWifi, RemoteValue::into_bool, callback).await;
    }

    #[instrument(skip(self, callback))]
    pub async fn set_home_key(
        &self,
        event: HomeEvent,
        function: HomeFunction,
        callback: impl FnOnce(bool) + Send + 'static,
    ) {
        self.request(RemoteCall::SetHomeKey { event, function }, RemoteValue::into_bool, callback)
            .await;
    }

    /// Configures the home key, including the app launched by [`HomeFunction::OpenApp`].
    #[instrument(skip(self, callback))]
    pub async fn set_home_key_all(
        &self,
        event: HomeEvent,
        function: HomeFunction,
        timeout: i32,
        package: &str,
        class_name: &str,
        callback: impl FnOnce(bool) + Send + 'static,
    ) {
        if function == HomeFunction::OpenApp
            && let Err(e) = ensure_valid_package(package)
        {
            return report(&e);
        }
        let call = RemoteCall::SetHomeKeyAll {
            event,
            function,
            timeout,
            package: package.to_string(),
            class_name: class_name.to_string(),
        };
        self.request(call, RemoteValue::into_bool, callback).await;
    }

    #[instrument(skip(self, callback))]
    pub async fn disable_power_key(
        &self,
        single_tap: bool,
        enable: bool,
        callback: impl FnOnce(i32) + Send + 'static,
    ) {
        let call = RemoteCall::DisablePowerKey { single_tap, enable };
        self.request(call, RemoteValue::into_int, callback).await;
    }

    #[instrument(skip(self, callback))]
    pub async fn set_screen_off_delay(
        &self,
        delay: ScreenOffDelay,
        callback: impl FnOnce(i32) + Send + 'static,
    ) {
        self.request(RemoteCall::SetScreenOffDelay(delay), RemoteValue::into_int, callback).await;
    }

    #[instrument(skip(self, callback))]
    pub async fn set_controller_pair_time(
        &self,
        time: ControllerPairTime,
        callback: impl FnOnce(i32) + Send + 'static,
    ) {
        self.request(RemoteCall::SetControllerPairTime(time), RemoteValue::into_int, callback)
            .await;
    }

    /// The callback receives the ordinal of the current [`ControllerPairTime`].
    #[instrument(skip(self, callback))]
    pub async fn get_controller_pair_time(&self, callback: impl FnOnce(i32) + Send + 'static) {
        self.request(RemoteCall::GetControllerPairTime, RemoteValue::into_int, callback).await;
    }

    /// Writes `content` to `path` under the app's local data directory.
    #[instrument(skip(self, content, callback), fields(len = content.len()))]
    pub async fn write_config_file(
        &self,
        path: &str,
        content: &str,
        callback: impl FnOnce(bool) + Send + 'static,
    ) {
        let call =
            RemoteCall::WriteConfigFile { path: path.to_string(), content: content.to_string() };
        self.request(call, RemoteValue::into_bool, callback).await;
    }

    #[instrument(skip(self, callback))]
    pub async fn reset_all_keys_to_default(&self, callback: impl FnOnce(bool) + Send + 'static) {
        self.request(RemoteCall::ResetAllKeysToDefault, RemoteValue::into_bool, callback).await;
    }

    #[instrument(skip(self, callback))]
    pub async fn get_system_function_status(
        &self,
        function: SystemFunction,
        callback: impl FnOnce(i32) + Send + 'static,
    ) {
        self.request(RemoteCall::GetSystemFunctionStatus(function), RemoteValue::into_int, callback)
            .await;
    }

    #[instrument(skip(self, callback))]
    pub async fn set_power_on_off_logo(
        &self,
        logo: PowerOnOffLogo,
        path: &str,
        callback: impl FnOnce(bool) + Send + 'static,
    ) {
        let call = RemoteCall::SetPowerOnOffLogo { logo, path: path.to_string() };
        self.request(call, RemoteValue::into_bool, callback).await;
    }

    /// Sets the interpupillary distance, in millimeters.
    #[instrument(skip(self, callback))]
    pub async fn set_ipd(&self, ipd: f32, callback: impl FnOnce(i32) + Send + 'static) {
        self.request(RemoteCall::SetIpd(ipd), RemoteValue::into_int, callback).await;
    }

    #[instrument(skip(self, callback))]
    pub async fn set_system_country_code(
        &self,
        country_code: &str,
        callback: impl FnOnce(i32) + Send + 'static,
    ) {
        let call = RemoteCall::SetSystemCountryCode(country_code.to_string());
        self.request(call, RemoteValue::into_int, callback).await;
    }

    #[instrument(skip(self))]
    pub async fn set_sleep_delay(&self, delay: SleepDelay) {
        self.send(RemoteCall::SetSleepDelay(delay)).await;
    }

    #[instrument(skip(self))]
    pub async fn switch_system_function(&self, function: SystemFunction, switch: Switch) {
        self.send(RemoteCall::SwitchSystemFunction { function, switch }).await;
    }

    #[instrument(skip(self))]
    pub async fn set_usb_configuration_option(&self, mode: UsbConfigMode) {
        self.send(RemoteCall::SetUsbConfigurationOption(mode)).await;
    }

    #[instrument(skip(self))]
    pub async fn screen_on(&self) {
        self.send(RemoteCall::ScreenOn).await;
    }

    #[instrument(skip(self))]
    pub async fn screen_off(&self) {
        self.send(RemoteCall::ScreenOff).await;
    }

    #[instrument(skip(self))]
    pub async fn acquire_wake_lock(&self) {
        self.send(RemoteCall::AcquireWakeLock).await;
    }

    #[instrument(skip(self))]
    pub async fn release_wake_lock(&self) {
        self.send(RemoteCall::ReleaseWakeLock).await;
    }

    /// Enables or disables a physical key.
    #[instrument(skip(self))]
    pub async fn set_key_enabled(&self, key: SystemKey, enabled: bool) {
        self.send(RemoteCall::SetKeyEnabled { key, enabled }).await;
    }

    /// Makes `package` the launcher, or restores the default one.
    #[instrument(skip(self))]
    pub async fn set_app_as_home(&self, switch: Switch, package: &str) {
        if let Err(e) = ensure_valid_package(package) {
            return report(&e);
        }
        self.send(RemoteCall::SetAppAsHome { switch, package: package.to_string() }).await;
    }

    #[instrument(skip(self))]
    pub async fn kill_apps(&self, pids: &[i32], packages: &[String]) {
        if let Err(e) = packages.iter().try_for_each(|p| ensure_valid_package(p)) {
            return report(&e);
        }
        self.send(RemoteCall::KillApps { pids: pids.to_vec(), packages: packages.to_vec() }).await;
    }

    /// Kills every background app not named in `keep`.
    #[instrument(skip(self))]
    pub async fn kill_background_apps_except(&self, keep: &[String]) {
        if let Err(e) = keep.iter().try_for_each(|p| ensure_valid_package(p)) {
            return report(&e);
        }
        self.send(RemoteCall::KillBackgroundAppsExcept(keep.to_vec())).await;
    }

    #[instrument(skip(self))]
    pub async fn freeze_screen(&self, freeze: bool) {
        self.send(RemoteCall::FreezeScreen(freeze)).await;
    }

    /// Schedules (or clears, with `enabled == false`) an automatic power-on.
    #[instrument(skip(self))]
    pub async fn schedule_startup(&self, at: PrimitiveDateTime, enabled: bool) {
        self.send(RemoteCall::ScheduleStartup { at, enabled }).await;
    }

    #[instrument(skip(self))]
    pub async fn schedule_shutdown(&self, at: PrimitiveDateTime, enabled: bool) {
        self.send(RemoteCall::ScheduleShutdown { at, enabled }).await;
    }

    #[instrument(skip(self))]
    pub async fn set_app_keep_alive(&self, package: &str, keep_alive: bool) {
        if let Err(e) = ensure_valid_package(package) {
            return report(&e);
        }
        self.send(RemoteCall::SetAppKeepAlive { package: package.to_string(), keep_alive }).await;
    }

    #[instrument(skip(self))]
    pub async fn open_vr_settings_item(&self, item: VrSettingsItem, hide_others: bool) {
        self.send(RemoteCall::OpenVrSettingsItem { item, hide_others }).await;
    }

    #[instrument(skip(self))]
    pub async fn switch_volume_to_home_and_enter(&self, switch: Switch) {
        self.send(RemoteCall::SwitchVolumeToHomeAndEnter(switch)).await;
    }

    #[instrument(skip(self))]
    pub async fn set_power_off_with_usb_cable(&self, switch: Switch) {
        self.send(RemoteCall::SetPowerOffWithUsbCable(switch)).await;
    }

    #[instrument(skip(self))]
    pub async fn remove_controller_home_key(&self, event: HomeEvent) {
        self.send(RemoteCall::RemoveControllerHomeKey(event)).await;
    }

    /// Takes a screenshot.
    #[instrument(skip(self))]
    pub async fn capture(&self) {
        self.send(RemoteCall::Capture).await;
    }

    /// Starts or stops screen recording.
    #[instrument(skip(self))]
    pub async fn record(&self) {
        self.send(RemoteCall::Record).await;
    }
}
