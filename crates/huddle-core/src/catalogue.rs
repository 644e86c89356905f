//! Status and option enumerations shared by every handle.
//!
//! Integer values match the native library exactly; hosts exchange them as
//! raw numbers, so `code()` / `from_code()` are the wire form.

use serde::{Deserialize, Serialize};

use crate::errors::SdkError;

macro_rules! sdk_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $value:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(i32)]
        $vis enum $name {
            $($(#[$vmeta])* $variant = $value),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn code(self) -> i32 {
                self as i32
            }

            pub fn from_code(code: i32) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.code() == code)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = SdkError;

            fn try_from(code: i32) -> Result<Self, SdkError> {
                Self::from_code(code).ok_or(SdkError::InvalidParameter)
            }
        }

        impl From<$name> for i32 {
            fn from(v: $name) -> i32 {
                v.code()
            }
        }
    };
}

sdk_enum! {
    pub enum OsType {
        Windows = 0,
        MacOs = 1,
    }
}

sdk_enum! {
    pub enum LanguageId {
        Unknown = 0,
        English = 1,
        ChineseSimplified = 2,
        ChineseTraditional = 3,
        Japanese = 4,
        Spanish = 5,
        German = 6,
        French = 7,
        Portuguese = 8,
        Russian = 9,
        Korean = 10,
        Vietnamese = 11,
        Italian = 12,
    }
}

sdk_enum! {
    pub enum AppLocale {
        Default = 0,
        China = 1,
    }
}

sdk_enum! {
    pub enum CustomizedLanguageType {
        None = 0,
        FilePath = 1,
        Content = 2,
    }
}

sdk_enum! {
    /// Outcome delivered by the auth callback.
    pub enum AuthResult {
        Success = 0,
        KeyOrSecretEmpty = 1,
        KeyOrSecretWrong = 2,
        AccountNotSupport = 3,
        AccountNotEnableSdk = 4,
        Unknown = 5,
        ServiceBusy = 6,
        None = 7,
        Overtime = 8,
        NetworkIssue = 9,
        ClientIncompatible = 10,
        JwtTokenWrong = 11,
    }
}

sdk_enum! {
    pub enum LoginStatus {
        Idle = 0,
        Processing = 1,
        Success = 2,
        Failed = 3,
    }
}

sdk_enum! {
    pub enum LoginType {
        Unknown = 0,
        Email = 1,
        Sso = 2,
    }
}

sdk_enum! {
    pub enum LoginFailReason {
        None = 0,
        EmailLoginDisable = 1,
        UserNotExist = 2,
        WrongPassword = 3,
        AccountLocked = 4,
        SdkNeedUpdate = 5,
        TooManyFailedAttempts = 6,
        SmsCodeError = 7,
        SmsCodeExpired = 8,
        PhoneNumberFormatInvalid = 9,
        LoginTokenInvalid = 10,
        OtherIssue = 100,
    }
}

sdk_enum! {
    /// Values of the meeting status callback.
    ///
    /// Some values describe the connection lifecycle, others are overlays
    /// (lock state, breakout rooms, webinar role, audio readiness) that can
    /// recur without ending the session. See [`MeetingStatus::is_overlay`].
    pub enum MeetingStatus {
        Idle = 0,
        Connecting = 1,
        WaitingForHost = 2,
        InMeeting = 3,
        Disconnecting = 4,
        Reconnecting = 5,
        Failed = 6,
        Ended = 7,
        Unknown = 8,
        Locked = 9,
        Unlocked = 10,
        InWaitingRoom = 11,
        WebinarPromote = 12,
        WebinarDepromote = 13,
        JoinBreakoutRoom = 14,
        LeaveBreakoutRoom = 15,
        AudioReady = 16,
        OtherMeetingInProgress = 17,
        WaitingExternalSessionKey = 18,
    }
}

impl MeetingStatus {
    /// Statuses after which the attempt is over. Another meeting in
    /// progress means this one never started.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ended | Self::Failed | Self::OtherMeetingInProgress)
    }

    /// Overlay statuses annotate the current lifecycle phase instead of
    /// replacing it.
    pub fn is_overlay(self) -> bool {
        matches!(
            self,
            Self::Locked
                | Self::Unlocked
                | Self::WebinarPromote
                | Self::WebinarDepromote
                | Self::JoinBreakoutRoom
                | Self::LeaveBreakoutRoom
                | Self::AudioReady
                | Self::Unknown
        )
    }
}

sdk_enum! {
    pub enum SdkUserType {
        NormalUser = 100,
        WithoutLogin = 101,
    }
}

sdk_enum! {
    pub enum UserType {
        ApiUser = 0,
        EmailLogin = 1,
        Facebook = 2,
        GoogleOAuth = 3,
        Sso = 4,
        Unknown = 5,
    }
}

sdk_enum! {
    pub enum LeaveMeetingCmd {
        Leave = 0,
        End = 1,
    }
}

sdk_enum! {
    pub enum MeetingType {
        None = 0,
        Normal = 1,
        Webinar = 2,
        BreakoutRoom = 3,
    }
}

impl Default for MeetingType {
    fn default() -> Self {
        Self::None
    }
}

sdk_enum! {
    /// Secondary code of a `Failed` status.
    pub enum MeetingFailCode {
        Success = 0,
        NetworkErr = 1,
        ReconnectErr = 2,
        MmrErr = 3,
        PasswordErr = 4,
        SessionErr = 5,
        MeetingOver = 6,
        MeetingNotStart = 7,
        MeetingNotExist = 8,
        MeetingUserFull = 9,
        ClientIncompatible = 10,
        NoMmr = 11,
        ConfLocked = 12,
        MeetingRestricted = 13,
        MeetingRestrictedJbh = 14,
        CannotEmitWebRequest = 15,
        CannotStartTokenExpire = 16,
        SessionVideoErr = 17,
        SessionAudioAutoStartErr = 18,
        RegisterWebinarFull = 19,
        RegisterWebinarHostRegister = 20,
        RegisterWebinarPanelistRegister = 21,
        RegisterWebinarDeniedEmail = 22,
        EnforceLogin = 23,
        ZcCertificateChanged = 24,
        VanityNotExist = 27,
        JoinWebinarWithSameEmail = 28,
        DisallowHostMeeting = 29,
        WriteConfigFile = 50,
        ForbidToJoinInternalMeeting = 60,
        RemovedByHost = 61,
        HostDisallowOutsideUserJoin = 62,
    }
}

sdk_enum! {
    /// Secondary code of an `Ended` status.
    pub enum MeetingEndReason {
        None = 0,
        KickByHost = 1,
        EndByHost = 2,
        JbhTimeOut = 3,
        NoAttendee = 4,
        HostStartAnotherMeeting = 5,
        FreeMeetingTimeOut = 6,
        NetworkBroken = 7,
    }
}

sdk_enum! {
    pub enum FloatVideoType {
        List = 0,
        Small = 1,
        Large = 2,
        Minimize = 3,
    }
}

sdk_enum! {
    pub enum ViewType {
        FirstView = 0,
        SecondView = 1,
        SendShareView = 2,
    }
}

sdk_enum! {
    pub enum UiViewType {
        FirstMonitor = 0,
        SecondMonitor = 1,
    }
}

sdk_enum! {
    pub enum MinimizeUiMode {
        None = 0,
        Share = 1,
        Video = 2,
        ActiveSpeaker = 3,
    }
}

sdk_enum! {
    pub enum AudioStatus {
        None = 0,
        Muted = 1,
        Unmuted = 2,
        MutedByHost = 3,
        UnmutedByHost = 4,
        MutedAllByHost = 5,
        UnmutedAllByHost = 6,
    }
}

impl AudioStatus {
    pub fn is_muted(self) -> Option<bool> {
        match self {
            Self::Muted | Self::MutedByHost | Self::MutedAllByHost => Some(true),
            Self::Unmuted | Self::UnmutedByHost | Self::UnmutedAllByHost => Some(false),
            Self::None => None,
        }
    }
}

sdk_enum! {
    pub enum AudioType {
        None = 0,
        Voip = 1,
        Phone = 2,
        Unknown = 3,
    }
}

sdk_enum! {
    pub enum VideoStatus {
        On = 0,
        Off = 1,
    }
}

sdk_enum! {
    pub enum ConnectionQuality {
        Unknown = 0,
        VeryBad = 1,
        Bad = 2,
        NotGood = 3,
        Normal = 4,
        Good = 5,
        Excellent = 6,
    }
}

impl Default for ConnectionQuality {
    fn default() -> Self {
        Self::Unknown
    }
}

sdk_enum! {
    pub enum ShareStatus {
        None = 0,
        SelfSendBegin = 1,
        SelfSendEnd = 2,
        OtherShareBegin = 3,
        OtherShareEnd = 4,
        ViewOtherSharing = 5,
        Pause = 6,
        Resume = 7,
        ContentTypeChange = 8,
        SelfStartAudioShare = 9,
        SelfStopAudioShare = 10,
        OtherStartAudioShare = 11,
        OtherStopAudioShare = 12,
    }
}

sdk_enum! {
    pub enum SettingTabPage {
        General = 0,
        Audio = 1,
        Video = 2,
    }
}

sdk_enum! {
    pub enum InviteDlgTabPage {
        EmailContact = 0,
        PhoneContact = 1,
        RoomSystem = 2,
    }
}

sdk_enum! {
    pub enum H323TabPage {
        DialIn = 0,
        CallOut = 1,
    }
}

sdk_enum! {
    pub enum RawDataMemoryMode {
        Stack = 0,
        Heap = 1,
    }
}

sdk_enum! {
    pub enum VideoRenderMode {
        None = 0,
        Auto = 1,
        D3d11EnableFlip = 2,
        D3d11 = 3,
        D3d9 = 4,
        Gdi = 5,
    }
}

sdk_enum! {
    pub enum VideoCaptureMethod {
        None = 0,
        Auto = 1,
        DirectShow = 2,
        MediaFoundation = 3,
    }
}

sdk_enum! {
    pub enum RenderPostProcessing {
        None = 0,
        Auto = 1,
        Enable = 2,
        Disable = 3,
    }
}

sdk_enum! {
    pub enum VideoHardwareEncodeType {
        Receiving = 0,
        Sending = 1,
        Processing = 2,
    }
}

sdk_enum! {
    pub enum EchoCancellationLevel {
        Default = 0,
        Aggressive = 1,
    }
}

sdk_enum! {
    /// Information the native layer needs before it can continue joining.
    pub enum RequiredInfoType {
        None = 0,
        Password = 1,
        Password4WrongPassword = 2,
        PasswordAndScreenName = 3,
        ScreenName = 4,
        MeetingIdAndScreenName = 5,
    }
}

impl RequiredInfoType {
    pub fn needs_password(self) -> bool {
        matches!(
            self,
            Self::Password | Self::Password4WrongPassword | Self::PasswordAndScreenName
        )
    }
}

sdk_enum! {
    pub enum WebinarNeedRegisterType {
        None = 0,
        ByRegisterUrl = 1,
        ByEmailAndDisplayName = 2,
    }
}

sdk_enum! {
    pub enum FreeMeetingNeedUpgradeType {
        None = 0,
        ByAdmin = 1,
        ByGiftUrl = 2,
    }
}

sdk_enum! {
    pub enum UserRole {
        None = 0,
        Host = 1,
        CoHost = 2,
        Panelist = 3,
        BreakoutRoomModerator = 4,
        Attendee = 5,
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::None
    }
}

sdk_enum! {
    pub enum UserInfoType {
        Real = 0,
        Fake = 1,
    }
}

impl Default for UserInfoType {
    fn default() -> Self {
        Self::Real
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_native_values() {
        assert_eq!(MeetingStatus::InMeeting.code(), 3);
        assert_eq!(MeetingStatus::WaitingExternalSessionKey.code(), 18);
        assert_eq!(ConnectionQuality::Unknown.code(), 0);
        assert_eq!(MeetingFailCode::VanityNotExist.code(), 27);
        assert_eq!(LoginFailReason::OtherIssue.code(), 100);
        assert_eq!(SdkUserType::WithoutLogin.code(), 101);
    }

    #[test]
    fn sparse_enums_reject_gaps() {
        assert_eq!(MeetingFailCode::from_code(25), None);
        assert_eq!(MeetingFailCode::from_code(62), Some(MeetingFailCode::HostDisallowOutsideUserJoin));
        assert_eq!(MeetingStatus::try_from(19), Err(SdkError::InvalidParameter));
    }

    #[test]
    fn overlay_statuses_are_not_terminal() {
        for status in MeetingStatus::ALL {
            if status.is_overlay() {
                assert!(!status.is_terminal(), "{status:?}");
            }
        }
        assert!(MeetingStatus::Ended.is_terminal());
        assert!(MeetingStatus::Failed.is_terminal());
        assert!(MeetingStatus::OtherMeetingInProgress.is_terminal());
        assert!(!MeetingStatus::InMeeting.is_overlay());
    }

    #[test]
    fn audio_status_mute_state() {
        assert_eq!(AudioStatus::MutedByHost.is_muted(), Some(true));
        assert_eq!(AudioStatus::UnmutedAllByHost.is_muted(), Some(false));
        assert_eq!(AudioStatus::None.is_muted(), None);
    }

    #[test]
    fn serde_uses_variant_names() {
        let json = serde_json::to_string(&LanguageId::French).unwrap();
        assert_eq!(json, "\"French\"");
        let back: LanguageId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, LanguageId::French);
    }
}
