//! Enumerated arguments and results of the remote service.
//!
//! The service encodes every enumerated value by its position inside the
//! enumeration, so the variant order below is part of the wire format.

/// An enumeration whose wire form is the variant's position.
pub trait OrdinalEnum: Sized + Copy {
    fn ordinal(self) -> i32;
    fn from_ordinal(ordinal: i32) -> Option<Self>;
}

macro_rules! ordinal_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every value, in wire order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub fn ordinal(self) -> i32 {
                self as i32
            }

            pub fn from_ordinal(ordinal: i32) -> Option<Self> {
                usize::try_from(ordinal).ok().and_then(|i| Self::ALL.get(i).copied())
            }
        }

        impl OrdinalEnum for $name {
            fn ordinal(self) -> i32 {
                $name::ordinal(self)
            }

            fn from_ordinal(ordinal: i32) -> Option<Self> {
                $name::from_ordinal(ordinal)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = i32;

            fn try_from(value: i32) -> Result<Self, i32> {
                Self::from_ordinal(value).ok_or(value)
            }
        }
    };
}

ordinal_enum! {
    /// Device properties readable through `get_device_info`.
    pub enum SystemInfo {
        ElectricQuantity,
        PuiVersion,
        EquipmentModel,
        EquipmentSn,
        CustomerSn,
        InternalStorageSpace,
        BluetoothStatus,
        BluetoothNameConnected,
        BluetoothMacAddress,
        WifiStatus,
        WifiNameConnected,
        WlanMacAddress,
        DeviceIp,
        ChargingStatus,
    }
}

ordinal_enum! {
    pub enum DeviceControl {
        Reboot,
        Shutdown,
    }
}

ordinal_enum! {
    pub enum PackageControl {
        SilentInstall,
        SilentUninstall,
    }
}

ordinal_enum! {
    /// On/off switch. Note that `On` is ordinal 0.
    pub enum Switch {
        On,
        Off,
    }
}

ordinal_enum! {
    /// Home key gestures, on the headset or on either controller.
    pub enum HomeEvent {
        SingleClick,
        DoubleClick,
        LongPress,
        SingleClickRightController,
        DoubleClickRightController,
        LongPressRightController,
        SingleClickLeftController,
        DoubleClickLeftController,
        LongPressLeftController,
        SingleClickHeadset,
        DoubleClickHeadset,
        LongPressHeadset,
    }
}

ordinal_enum! {
    /// Action bound to a home key gesture.
    pub enum HomeFunction {
        GoToSetting,
        Back,
        Recenter,
        /// Opens the package/class given to `set_home_key_all`.
        OpenApp,
        Disable,
        GoToHome,
    }
}

ordinal_enum! {
    pub enum ScreenOffDelay {
        Three,
        Ten,
        Thirty,
        Sixty,
        ThreeHundred,
        SixHundred,
        Never,
    }
}

impl ScreenOffDelay {
    /// Delay in seconds, `None` for [`ScreenOffDelay::Never`].
    pub fn seconds(self) -> Option<u32> {
        match self {
            Self::Three => Some(3),
            Self::Ten => Some(10),
            Self::Thirty => Some(30),
            Self::Sixty => Some(60),
            Self::ThreeHundred => Some(300),
            Self::SixHundred => Some(600),
            Self::Never => None,
        }
    }
}

ordinal_enum! {
    pub enum SleepDelay {
        Fifteen,
        Thirty,
        Sixty,
        ThreeHundred,
        SixHundred,
        EighteenHundred,
        Never,
    }
}

impl SleepDelay {
    /// Delay in seconds, `None` for [`SleepDelay::Never`].
    pub fn seconds(self) -> Option<u32> {
        match self {
            Self::Fifteen => Some(15),
            Self::Thirty => Some(30),
            Self::Sixty => Some(60),
            Self::ThreeHundred => Some(300),
            Self::SixHundred => Some(600),
            Self::EighteenHundred => Some(1800),
            Self::Never => None,
        }
    }
}

ordinal_enum! {
    /// How long the controllers stay in pairing mode.
    pub enum ControllerPairTime {
        Default,
        Fifteen,
        Sixty,
        OneHundredTwenty,
        SixHundred,
        Never,
    }
}

ordinal_enum! {
    /// System features that can be toggled with `switch_system_function`.
    pub enum SystemFunction {
        Usb,
        AutoSleep,
        ScreenOnCharging,
        OtgCharging,
        ReturnMenuIn2dMode,
        CombinationKey,
        CalibrationWithPowerOn,
        SystemUpdate,
        CastService,
        EyeProtection,
        SecurityZonePermanently,
        GlobalCalibration,
        AutoCalibration,
        UsbBoot,
        VolumeUi,
        ControllerUi,
        NavigationSwitch,
        ShortcutShowRecordUi,
        ShortcutShowFitUi,
        ShortcutShowCastUi,
        ShortcutShowCaptureUi,
        StopMemInfoService,
        UsbForceHost,
        SetDefaultSafetyZone,
        AllowResetBoundary,
        BoundaryConfirmationScreen,
        LongPressHomeToRecenter,
        PowerCtrlWifiEnable,
        WifiDisable,
        SixDofSwitch,
        InverseDispersion,
        Logcat,
        ProximitySensor,
        SystemUpdateOta,
        SystemUpdateApp,
        ShortcutShowWlanUi,
        ShortcutShowBoundaryUi,
        ShortcutShowBluetoothUi,
        ShortcutShowCleanTaskUi,
        ShortcutShowIpdAdjustmentUi,
        ShortcutShowPowerUi,
        ShortcutShowEditUi,
        BasicSettingAppLibraryUi,
        BasicSettingShortcutUi,
    }
}

ordinal_enum! {
    /// Pages of the VR settings app that can be opened directly.
    pub enum VrSettingsItem {
        Wifi,
        Bluetooth,
        Controller,
        Lab,
        Brightness,
        General,
        Notification,
    }
}

ordinal_enum! {
    pub enum UsbConfigMode {
        Mtp,
        Charge,
    }
}

ordinal_enum! {
    pub enum CastUrlType {
        Normal,
        NoConfirm,
        Rtmp,
    }
}

ordinal_enum! {
    pub enum CastOption {
        ResolutionLevel,
        BitrateLevel,
        AudioEnable,
        Status,
    }
}

ordinal_enum! {
    /// Value of a [`CastOption`], or the casting status.
    pub enum CastOptionValue {
        ResolutionHigh,
        ResolutionMiddle,
        ResolutionAuto,
        ResolutionHigh2k,
        ResolutionHigh4k,
        BitrateHigh,
        BitrateMiddle,
        BitrateLow,
        AudioOn,
        AudioOff,
        StatusStarted,
        StatusStopped,
        StatusError,
    }
}

ordinal_enum! {
    pub enum ScreencastAudioOutput {
        Sink,
        Target,
        SinkAndTarget,
        Error,
    }
}

ordinal_enum! {
    /// Tabs of the settings app that can be hidden or shown.
    pub enum SettingsTab {
        Wlan,
        Controller,
        Bluetooth,
        Display,
        Lab,
        GeneralLockscreen,
        GeneralFactoryReset,
    }
}

ordinal_enum! {
    pub enum ControllerKey {
        Joystick,
        Menu,
        Trigger,
        RightA,
        RightB,
        LeftX,
        LeftY,
        LeftGrip,
        RightGrip,
    }
}

ordinal_enum! {
    pub enum PowerOnOffLogo {
        PowerOnLogo,
        PowerOnAnimation,
        PowerOffLogo,
    }
}

ordinal_enum! {
    /// Headset keys that can be enabled or disabled as a whole.
    pub enum SystemKey {
        Enter,
        Volume,
        Back,
    }
}
