//! Status and telemetry queries.
//!
//! Each query returns its result directly. When the request cannot be made or
//! fails, the failure is logged and a fixed fallback value is returned instead.

use tracing::{debug, instrument};

use super::{ServiceProxy, ensure_valid_package, or_sentinel, report};
use crate::{
    models::*,
    remote::{RemoteQuery, RemoteValue},
};

impl ServiceProxy {
    /// Usage of every CPU core as a fraction in `[0, 1]`, `None` if unavailable.
    #[instrument(skip(self), ret)]
    pub async fn get_cpu_usages(&self) -> Option<Vec<f32>> {
        let usages = self
            .query(RemoteQuery::CpuUsages, RemoteValue::into_cpu_usages)
            .await
            .map(|cores| Some(cores.iter().map(CpuUsageInfo::usage).collect()));
        or_sentinel(usages, None)
    }

    #[instrument(skip(self), ret)]
    pub async fn get_device_temperatures(&self, kind: i32, source: i32) -> Option<Vec<f32>> {
        let query = RemoteQuery::DeviceTemperatures { kind, source };
        or_sentinel(self.query(query, RemoteValue::into_floats).await.map(Some), None)
    }

    #[instrument(skip(self), ret)]
    pub async fn get_device_info(&self, info: SystemInfo) -> String {
        let result = self.query(RemoteQuery::DeviceInfo(info), RemoteValue::into_text).await;
        or_sentinel(result, String::new())
    }

    #[instrument(skip(self), ret)]
    pub async fn is_volume_change_to_home_and_enter(&self) -> Switch {
        let query = RemoteQuery::IsVolumeChangeToHomeAndEnter;
        or_sentinel(self.query(query, RemoteValue::into_enum::<Switch>).await, Switch::Off)
    }

    #[instrument(skip(self), ret)]
    pub async fn get_power_off_with_usb_cable(&self) -> Switch {
        let query = RemoteQuery::PowerOffWithUsbCable;
        or_sentinel(self.query(query, RemoteValue::into_enum::<Switch>).await, Switch::Off)
    }

    #[instrument(skip(self), ret)]
    pub async fn get_settings_tab_status(&self, tab: SettingsTab) -> Switch {
        let query = RemoteQuery::SettingsTabStatus(tab);
        or_sentinel(self.query(query, RemoteValue::into_enum::<Switch>).await, Switch::Off)
    }

    /// Shows or hides a tab of the system settings app.
    #[instrument(skip(self), ret)]
    pub async fn set_settings_tab_status(&self, tab: SettingsTab, switch: Switch) -> i32 {
        let query = RemoteQuery::SetSettingsTabStatus { tab, switch };
        or_sentinel(self.query(query, RemoteValue::into_int).await, 0)
    }

    #[instrument(skip(self), ret)]
    pub async fn get_screen_off_delay(&self) -> ScreenOffDelay {
        let query = RemoteQuery::ScreenOffDelay;
        let result = self.query(query, RemoteValue::into_enum::<ScreenOffDelay>).await;
        or_sentinel(result, ScreenOffDelay::Never)
    }

    #[instrument(skip(self), ret)]
    pub async fn get_sleep_delay(&self) -> SleepDelay {
        let query = RemoteQuery::SleepDelay;
        let result = self.query(query, RemoteValue::into_enum::<SleepDelay>).await;
        or_sentinel(result, SleepDelay::Never)
    }

    #[instrument(skip(self), ret)]
    pub async fn get_controller_key_state(&self, key: ControllerKey) -> i32 {
        let result = self.query(RemoteQuery::ControllerKeyState(key), RemoteValue::into_int).await;
        or_sentinel(result, 1)
    }

    #[instrument(skip(self), ret)]
    pub async fn set_controller_key_state(&self, key: ControllerKey, switch: Switch) -> i32 {
        let query = RemoteQuery::SetControllerKeyState { key, switch };
        or_sentinel(self.query(query, RemoteValue::into_int).await, 1)
    }

    #[instrument(skip(self), ret)]
    pub async fn get_key_status(&self, key: SystemKey) -> i32 {
        or_sentinel(self.query(RemoteQuery::KeyStatus(key), RemoteValue::into_int).await, 1)
    }

    #[instrument(skip(self), ret)]
    pub async fn get_controller_connect_state(&self) -> i32 {
        or_sentinel(self.query(RemoteQuery::ControllerConnectState, RemoteValue::into_int).await, 0)
    }

    /// Battery level of each controller, `None` if unavailable.
    #[instrument(skip(self), ret)]
    pub async fn get_controller_battery(&self) -> Option<Vec<i32>> {
        let levels = self.query(RemoteQuery::ControllerBattery, RemoteValue::into_ints).await;
        or_sentinel(levels.map(Some), None)
    }

    /// Installs the OTA package at `path`.
    #[instrument(skip(self), ret)]
    pub async fn install_ota_package(&self, path: &str) -> i32 {
        let query = RemoteQuery::InstallOtaPackage(path.to_string());
        or_sentinel(self.query(query, RemoteValue::into_int).await, 0)
    }

    #[instrument(skip(self), ret)]
    pub async fn get_power_key_status(&self) -> String {
        let result = self.query(RemoteQuery::PowerKeyStatus, RemoteValue::into_text).await;
        or_sentinel(result, String::new())
    }

    #[instrument(skip(self), ret)]
    pub async fn get_home_key_status(&self, event: HomeEvent) -> String {
        let query = RemoteQuery::HomeKeyStatus(event);
        or_sentinel(self.query(query, RemoteValue::into_text).await, String::new())
    }

    #[instrument(skip(self), ret)]
    pub async fn get_usb_configuration_option(&self) -> String {
        let query = RemoteQuery::UsbConfigurationOption;
        or_sentinel(self.query(query, RemoteValue::into_text).await, String::new())
    }

    /// Package name of the current launcher.
    #[instrument(skip(self), ret)]
    pub async fn get_current_launcher(&self) -> String {
        let result = self.query(RemoteQuery::CurrentLauncher, RemoteValue::into_text).await;
        or_sentinel(result, String::new())
    }

    #[instrument(skip(self), ret)]
    pub async fn get_auto_connect_wifi_config(&self) -> String {
        let query = RemoteQuery::AutoConnectWifiConfig;
        or_sentinel(self.query(query, RemoteValue::into_text).await, String::new())
    }

    #[instrument(skip(self), ret)]
    pub async fn get_startup_schedule(&self) -> String {
        let result = self.query(RemoteQuery::StartupSchedule, RemoteValue::into_text).await;
        or_sentinel(result, String::new())
    }

    #[instrument(skip(self), ret)]
    pub async fn get_shutdown_schedule(&self) -> String {
        let result = self.query(RemoteQuery::ShutdownSchedule, RemoteValue::into_text).await;
        or_sentinel(result, String::new())
    }

    #[instrument(skip(self), ret)]
    pub async fn set_system_language(&self, language: &str) -> i32 {
        let query = RemoteQuery::SetSystemLanguage(language.to_string());
        or_sentinel(self.query(query, RemoteValue::into_int).await, 0)
    }

    #[instrument(skip(self), ret)]
    pub async fn get_system_language(&self) -> String {
        let result = self.query(RemoteQuery::SystemLanguage, RemoteValue::into_text).await;
        or_sentinel(result, String::new())
    }

    #[instrument(skip(self), ret)]
    pub async fn get_system_country_code(&self) -> String {
        let query = RemoteQuery::SystemCountryCode;
        or_sentinel(self.query(query, RemoteValue::into_text).await, String::new())
    }

    /// Saves a Wi-Fi network in the system configuration.
    #[instrument(skip(self, password), ret)]
    pub async fn configure_wifi(&self, ssid: &str, password: &str) -> i32 {
        let query =
            RemoteQuery::ConfigureWifi { ssid: ssid.to_string(), password: password.to_string() };
        or_sentinel(self.query(query, RemoteValue::into_int).await, 0)
    }

    /// SSIDs of the configured Wi-Fi networks.
    #[instrument(skip(self), ret)]
    pub async fn get_configured_wifi(&self) -> Vec<String> {
        let result = self.query(RemoteQuery::ConfiguredWifi, RemoteValue::into_texts).await;
        or_sentinel(result, Vec::new())
    }

    #[instrument(skip(self), ret)]
    pub async fn set_skip_init_setting_page(&self, flag: i32) -> i32 {
        let query = RemoteQuery::SetSkipInitSettingPage(flag);
        or_sentinel(self.query(query, RemoteValue::into_int).await, 0)
    }

    #[instrument(skip(self), ret)]
    pub async fn get_skip_init_setting_page(&self) -> i32 {
        or_sentinel(self.query(RemoteQuery::SkipInitSettingPage, RemoteValue::into_int).await, 0)
    }

    #[instrument(skip(self), ret)]
    pub async fn is_init_setting_complete(&self) -> i32 {
        or_sentinel(self.query(RemoteQuery::IsInitSettingComplete, RemoteValue::into_int).await, 0)
    }

    /// Hides (or shows again) `packages` in the app library.
    #[instrument(skip(self), ret)]
    pub async fn customize_app_library(&self, packages: &[String], switch: Switch) -> i32 {
        if let Err(e) = packages.iter().try_for_each(|p| ensure_valid_package(p)) {
            report(&e);
            return 0;
        }
        debug!(count = packages.len(), "Customizing app library");
        let query = RemoteQuery::CustomizeAppLibrary { packages: packages.to_vec(), switch };
        or_sentinel(self.query(query, RemoteValue::into_int).await, 0)
    }

    #[instrument(skip(self), ret)]
    pub async fn get_app_library_hide_list(&self) -> String {
        let result = self.query(RemoteQuery::AppLibraryHideList, RemoteValue::into_text).await;
        or_sentinel(result, String::new())
    }

    /// Asks the service to launch an activity. An empty `package` leaves the
    /// target to be resolved from `action` and `categories`.
    ///
    /// `extra` is passed through as JSON text. Returns `0` when the request
    /// could not be made.
    #[instrument(skip(self, extra), ret)]
    pub async fn start_activity(
        &self,
        package: &str,
        class_name: &str,
        action: &str,
        extra: &str,
        categories: &[String],
        flags: &[i32],
    ) -> i32 {
        if !package.is_empty()
            && let Err(e) = ensure_valid_package(package)
        {
            report(&e);
            return 0;
        }
        let query = RemoteQuery::StartActivity {
            package: package.to_string(),
            class_name: class_name.to_string(),
            action: action.to_string(),
            extra: extra.to_string(),
            categories: categories.to_vec(),
            flags: flags.to_vec(),
        };
        or_sentinel(self.query(query, RemoteValue::into_int).await, 0)
    }
}
