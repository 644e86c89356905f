use thiserror::Error;

/// Result of every facade operation. `Ok` is the success code `0`.
pub type SdkResult<T = ()> = Result<T, SdkError>;

/// Integer value of a successful operation.
pub const SUCCESS: i32 = 0;

/// Failure codes returned synchronously by every operation.
///
/// The integer values are part of the external contract and match the
/// native library one for one, so hosts that branch on raw codes keep
/// working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[repr(i32)]
pub enum SdkError {
    #[error("operation is not implemented")]
    NoImpl = 1,
    #[error("wrong usage of the interface")]
    WrongUsage = 2,
    #[error("invalid parameter")]
    InvalidParameter = 3,
    #[error("failed to load the native module")]
    ModuleLoadFailed = 4,
    #[error("memory allocation failed")]
    MemoryFailed = 5,
    #[error("internal service failure")]
    ServiceFailed = 6,
    #[error("sdk is not initialized")]
    Uninitialize = 7,
    #[error("sdk is not authenticated")]
    Unauthentication = 8,
    #[error("no recording in process")]
    NoRecordingInProcess = 9,
    #[error("transcoder not found")]
    TranscoderNotFound = 10,
    #[error("video is not ready")]
    VideoNotReady = 11,
    #[error("no permission")]
    NoPermission = 12,
    #[error("unknown error")]
    Unknown = 13,
    #[error("another sdk instance is running")]
    OtherSdkInstanceRunning = 14,
    #[error("internal error")]
    InternalError = 15,
    #[error("no audio device found")]
    NoAudioDeviceFound = 16,
    #[error("no video device found")]
    NoVideoDeviceFound = 17,
    #[error("api called too frequently")]
    TooFrequentCall = 18,
    #[error("failed to assign user privilege")]
    FailAssignUserPrivilege = 19,
    #[error("meeting does not support this feature")]
    MeetingDontSupportFeature = 20,
    #[error("not the share sender")]
    MeetingNotShareSender = 21,
    #[error("you have no share")]
    MeetingYouHaveNoShare = 22,
    #[error("wrong view type parameter")]
    MeetingViewTypeParameterIsWrong = 23,
    #[error("annotation is off")]
    MeetingAnnotationIsOff = 24,
    #[error("operating system does not support this setting")]
    SettingOsDontSupport = 25,
    #[error("email login is disabled")]
    EmailLoginIsDisabled = 26,
    #[error("hardware does not meet virtual background requirements")]
    HardwareNotMeetForVb = 27,
    #[error("user must confirm the recording disclaimer")]
    NeedUserConfirmRecordDisclaimer = 28,
    #[error("no share data")]
    NoShareData = 29,
    #[error("cannot subscribe to own share")]
    ShareCannotSubscribeMyself = 30,
}

/// Coarse cause of a failure, used by callers deciding whether a retry
/// could help.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Not initialized, not authenticated, or called in the wrong state.
    Precondition,
    InputValidation,
    Resource,
    Permission,
    /// Network, timeouts, busy services, rate limits.
    Transient,
    Internal,
}

impl SdkError {
    pub const ALL: [SdkError; 30] = [
        Self::NoImpl,
        Self::WrongUsage,
        Self::InvalidParameter,
        Self::ModuleLoadFailed,
        Self::MemoryFailed,
        Self::ServiceFailed,
        Self::Uninitialize,
        Self::Unauthentication,
        Self::NoRecordingInProcess,
        Self::TranscoderNotFound,
        Self::VideoNotReady,
        Self::NoPermission,
        Self::Unknown,
        Self::OtherSdkInstanceRunning,
        Self::InternalError,
        Self::NoAudioDeviceFound,
        Self::NoVideoDeviceFound,
        Self::TooFrequentCall,
        Self::FailAssignUserPrivilege,
        Self::MeetingDontSupportFeature,
        Self::MeetingNotShareSender,
        Self::MeetingYouHaveNoShare,
        Self::MeetingViewTypeParameterIsWrong,
        Self::MeetingAnnotationIsOff,
        Self::SettingOsDontSupport,
        Self::EmailLoginIsDisabled,
        Self::HardwareNotMeetForVb,
        Self::NeedUserConfirmRecordDisclaimer,
        Self::NoShareData,
        Self::ShareCannotSubscribeMyself,
    ];

    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Map a raw native code back to an error. `0` and unknown values
    /// return `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.code() == code)
    }

    /// Interpret a raw native return value.
    pub fn check(code: i32) -> SdkResult {
        if code == SUCCESS {
            return Ok(());
        }
        Err(Self::from_code(code).unwrap_or(Self::Unknown))
    }

    pub fn class(self) -> ErrorClass {
        match self {
            Self::WrongUsage
            | Self::Uninitialize
            | Self::Unauthentication
            | Self::NoRecordingInProcess
            | Self::VideoNotReady
            | Self::OtherSdkInstanceRunning
            | Self::MeetingYouHaveNoShare
            | Self::NoShareData
            | Self::NeedUserConfirmRecordDisclaimer => ErrorClass::Precondition,
            Self::InvalidParameter
            | Self::MeetingViewTypeParameterIsWrong
            | Self::ShareCannotSubscribeMyself => ErrorClass::InputValidation,
            Self::ModuleLoadFailed
            | Self::MemoryFailed
            | Self::TranscoderNotFound
            | Self::NoAudioDeviceFound
            | Self::NoVideoDeviceFound
            | Self::HardwareNotMeetForVb => ErrorClass::Resource,
            Self::NoPermission
            | Self::FailAssignUserPrivilege
            | Self::MeetingDontSupportFeature
            | Self::MeetingNotShareSender
            | Self::MeetingAnnotationIsOff
            | Self::SettingOsDontSupport
            | Self::EmailLoginIsDisabled => ErrorClass::Permission,
            Self::ServiceFailed | Self::TooFrequentCall => ErrorClass::Transient,
            Self::NoImpl | Self::Unknown | Self::InternalError => ErrorClass::Internal,
        }
    }

    pub fn is_transient(self) -> bool {
        self.class() == ErrorClass::Transient
    }
}

impl From<SdkError> for i32 {
    fn from(e: SdkError) -> i32 {
        e.code()
    }
}

/// Integer code of any facade result, `0` on success.
pub fn result_code<T>(result: &SdkResult<T>) -> i32 {
    match result {
        Ok(_) => SUCCESS,
        Err(e) => e.code(),
    }
}

/// Errors raised while reading a host configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_contiguous_from_one() {
        for (i, err) in SdkError::ALL.iter().enumerate() {
            assert_eq!(err.code(), i as i32 + 1);
        }
    }

    #[test]
    fn from_code_rejects_success_and_out_of_range() {
        assert_eq!(SdkError::from_code(0), None);
        assert_eq!(SdkError::from_code(31), None);
        assert_eq!(SdkError::from_code(-1), None);
        assert_eq!(SdkError::from_code(7), Some(SdkError::Uninitialize));
        assert_eq!(SdkError::from_code(30), Some(SdkError::ShareCannotSubscribeMyself));
    }

    #[test]
    fn check_maps_unknown_codes_to_unknown() {
        assert_eq!(SdkError::check(0), Ok(()));
        assert_eq!(SdkError::check(12), Err(SdkError::NoPermission));
        assert_eq!(SdkError::check(999), Err(SdkError::Unknown));
    }

    #[test]
    fn result_code_round_trips_success() {
        assert_eq!(result_code(&Ok::<_, SdkError>(42)), 0);
        assert_eq!(result_code::<()>(&Err(SdkError::InvalidParameter)), 3);
    }

    #[test]
    fn classes_follow_cause() {
        assert_eq!(SdkError::Uninitialize.class(), ErrorClass::Precondition);
        assert_eq!(SdkError::InvalidParameter.class(), ErrorClass::InputValidation);
        assert_eq!(SdkError::ModuleLoadFailed.class(), ErrorClass::Resource);
        assert_eq!(SdkError::NoPermission.class(), ErrorClass::Permission);
        assert!(SdkError::TooFrequentCall.is_transient());
        assert!(!SdkError::InternalError.is_transient());
    }
}
