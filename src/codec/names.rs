//! Named device addresses and command codes.
//!
//! The wire layer deals in raw bytes; these enums only exist so that known
//! codes can be spelled by name and rendered in diagnostics.

macro_rules! named_codes {
    (
        $(#[$meta:meta])*
        $name:ident, $lookup:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $code ),+
        }

        impl $name {
            /// Converts a raw byte to a known code.
            pub const fn from_u8(value: u8) -> Option<Self> {
                match value {
                    $( $code => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// Diagnostic name of the code.
            pub const fn name(&self) -> &'static str {
                match self {
                    $( Self::$variant => $label ),+
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value as u8
            }
        }

        /// Returns the display name for any byte, `UNKNOWN(0xNN)` if unnamed.
        pub fn $lookup(value: u8) -> String {
            match $name::from_u8(value) {
                Some(known) => known.name().to_string(),
                None => format!("UNKNOWN(0x{:02X})", value),
            }
        }
    };
}

named_codes! {
    /// Device addresses on an Aux bus.
    Address, address_name {
        /// Host computer.
        Pc = 0x20 => "PC",
        /// EFA hand controller.
        HandController = 0x0D => "HC",
        /// Focus motor and temperature sensors.
        FocuserTemp = 0x12 => "FOC_TEMP",
        /// Rotator motor and fan control.
        RotatorFan = 0x13 => "ROT_FAN",
        /// Delta-T dew heater.
        DeltaT = 0x32 => "DELTA_T",
    }
}

named_codes! {
    /// Command codes understood by Aux devices.
    Command, command_name {
        MtrGetPos = 0x01 => "MTR_GET_POS",
        MtrOffsetCnt = 0x04 => "MTR_OFFSET_CNT",
        MtrPtrack = 0x06 => "MTR_PTRACK",
        MtrNtrack = 0x07 => "MTR_NTRACK",
        MtrGotoOver = 0x13 => "MTR_GOTO_OVER",
        MtrGotoPos2 = 0x17 => "MTR_GOTO_POS2",
        MtrSlewLimitMin = 0x1A => "MTR_SLEWLIMITMIN",
        MtrSlewLimitMax = 0x1B => "MTR_SLEWLIMITMAX",
        MtrSlewLimitGetMin = 0x1C => "MTR_SLEWLIMITGETMIN",
        MtrSlewLimitGetMax = 0x1D => "MTR_SLEWLIMITGETMAX",
        MtrPmslewRate = 0x24 => "MTR_PMSLEW_RATE",
        MtrNmslewRate = 0x25 => "MTR_NMSLEW_RATE",
        TempGet = 0x26 => "TEMP_GET",
        FansSet = 0x27 => "FANS_SET",
        FansGet = 0x28 => "FANS_GET",
        MtrGetCalibrationState = 0x30 => "MTR_GET_CALIBRATION_STATE",
        MtrSetCalibrationState = 0x31 => "MTR_SET_CALIBRATION_STATE",
        MtrGetStopDetect = 0xEE => "MTR_GET_STOP_DETECT",
        MtrStopDetect = 0xEF => "MTR_STOP_DETECT",
        MtrGetApproachDirection = 0xFC => "MTR_GET_APPROACH_DIRECTION",
        MtrApproachDirection = 0xFD => "MTR_APPROACH_DIRECTION",
        GetVersion = 0xFE => "GET_VERSION",
    }
}
