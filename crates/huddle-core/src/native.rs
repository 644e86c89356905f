//! Boundary with the native conferencing library.
//!
//! Every mutating facade call turns into exactly one [`Command`] handed to
//! [`NativeSdk::execute`]; everything the library reports back arrives as a
//! [`NativeEvent`](crate::events::NativeEvent) through the sink given at
//! initialization.

use std::fmt;
use std::sync::Arc;

use crate::catalogue::{
    ConnectionQuality, EchoCancellationLevel, FloatVideoType, H323TabPage, InviteDlgTabPage,
    LeaveMeetingCmd, MinimizeUiMode, SettingTabPage, UiViewType, VideoHardwareEncodeType,
};
use crate::config::InitOptions;
use crate::devices::{DeviceInfo, DeviceKind};
use crate::errors::{SdkError, SdkResult};
use crate::events::{EventSink, UserId, UserInfo};
use crate::meeting::{
    JoinRequest, JoinWithoutLoginRequest, MeetingInfo, MeetingTarget, StartRequest,
    StartWithoutLoginRequest,
};

/// Credential material. Never printed.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl From<&str> for Secret {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Secret {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Native window handle. Hosts pass these around as hex strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u64);

impl WindowHandle {
    /// Parse `"0x1f04"` or `"1F04"`. Zero is not a window.
    pub fn parse_hex(input: &str) -> SdkResult<Self> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.is_empty() {
            return Err(SdkError::InvalidParameter);
        }
        match u64::from_str_radix(digits, 16) {
            Ok(0) | Err(_) => Err(SdkError::InvalidParameter),
            Ok(raw) => Ok(Self(raw)),
        }
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub left: i32,
    pub top: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionChannel {
    Sharing,
    Video,
    Audio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeEndpoint {
    Microphone,
    Speaker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WallViewPage {
    pub current: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SplitScreenInfo {
    pub supported: bool,
    pub in_split_screen: bool,
}

/// Readable and writable device-settings switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingToggle {
    // video
    VideoMirrorEffect,
    FaceBeautyEffect,
    HdVideo,
    AlwaysShowNameOnVideo,
    AutoTurnOffVideoWhenJoin,
    AlwaysUse16x9,
    SpotlightSelf,
    HardwareEncode(VideoHardwareEncodeType),
    Gallery49Videos,
    HideNoVideoUsersOnWall,
    VideoPreviewDialog,
    // audio
    AutoJoinAudio,
    AutoAdjustMic,
    StereoAudio,
    MicOriginalInput,
    HoldSpaceKeyToSpeak,
    AlwaysMuteMicWhenJoinVoip,
    SuppressAudioNotify,
    // share
    AutoFitToWindowWhenViewSharing,
    AccelerateGpuWhenShare,
    RemoteControlAllApplications,
}

/// Write-only meeting configuration switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigToggle {
    InviteButtonOnMeetingUi,
    InviteLinkOnMeetingUi,
    VideoButtonOnMeetingUi,
    AudioButtonOnMeetingUi,
    FullScreenButtonOnMeetingUi,
    BottomFloatToolbar,
    SharingToolbar,
    FloatVideoWindow,
    WaitingForHostDialog,
    WrongPasswordDialog,
    InputMeetingPasswordDialog,
    InputMeetingScreenNameDialog,
    JoinMeetingWindow,
    AutoShowJoinAudioDialog,
    AutoHideJoinAudioDialog,
    AutoEndOtherMeetingWhenStart,
    DoubleClickForFullScreen,
    AutoAdjustSpeakerVolumeWhenJoinAudio,
    AutoAdjustMicVolumeWhenJoinAudio,
    MeetingNumberLengthLimit,
    ShareIosDevice,
    ShareWhiteboard,
    ForceDisableMultiShare,
    LocalRecordingConvertProgressDialog,
    ApproveRemoteControlDialog,
    DeclineRemoteControlResponseDialog,
    LeaveMeetingOptionForHost,
    ToolTips,
    ClaimHostFeature,
    AlwaysShowIconOnTaskBar,
    SplitScreenModeUi,
    AudioUseComputerSoundCheckbox,
    CallInTab,
    CallMeTab,
    TopMostSettingDialog,
    GrabShareWithoutReminder,
    ShareSwitchMultiToSingleConfirmDialog,
    FreeMeetingRemainTimeNotify,
    ChatItem,
    RecordItem,
    UpgradeFreeMeetingButton,
    SwitchCameraButton,
    CopyUrlOnInviteWindow,
    CopyInvitationOnInviteWindow,
    KeypadButton,
    RemoteControlItem,
    QaItem,
    PollItem,
    VideoOptimizeCheckbox,
    ForceAutoStartMyVideoWhenJoin,
    ForceAutoStopMyVideoWhenJoin,
    ToolbarInviteButtonOriginAction,
    ConfidentialWatermark,
    RedirectShareButton,
    RedirectEndMeetingButton,
    RedirectParticipantListButton,
    RedirectCustomLiveStreamMenu,
    RedirectClosedCaptionButton,
    RedirectAudioButton,
    RedirectAudioMenuButton,
    RedirectFreeMeetingEndingReminder,
    RedirectMeetingWarningMessage,
    RedirectWebinarNeedRegister,
    RedirectEndOtherMeeting,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthCommand {
    SdkAuth { app_key: String, app_secret: Secret },
    SdkAuthWithToken { token: Secret },
    SsoLogin { uri_protocol: String },
    Logout,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MeetingCommand {
    Start(StartRequest),
    StartWithoutLogin {
        target: MeetingTarget,
        request: StartWithoutLoginRequest,
    },
    Join {
        target: MeetingTarget,
        request: JoinRequest,
    },
    JoinWithoutLogin {
        target: MeetingTarget,
        request: JoinWithoutLoginRequest,
    },
    HandleWebUri {
        protocol_action: String,
    },
    Leave(LeaveMeetingCmd),
    Lock,
    Unlock,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VideoCommand {
    Mute { user_id: UserId },
    Unmute { user_id: UserId },
    Pin { user_id: UserId, pin: bool, first_view: bool },
    Spotlight { user_id: UserId, spotlight: bool },
    HideNoVideoUsersOnWall(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCommand {
    Mute { user_id: UserId, allow_unmute_by_self: bool },
    MuteAll { allow_unmute_by_self: bool },
    Unmute { user_id: UserId },
    JoinVoip,
    LeaveVoip,
    PlayChimeOnEnterExit(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShareCommand {
    StartAppShare(WindowHandle),
    StartMonitorShare { monitor_id: String },
    Stop,
    ShareComputerSound { enable: bool, while_sharing: bool },
    OptimizeForFullScreenVideoClip { enable: bool, while_sharing: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    ShowChatDialog { parent: Option<WindowHandle>, rect: Rect },
    HideChatDialog,
    EnterFullScreen(UiViewType),
    ExitFullScreen(UiViewType),
    SwitchToVideoWall,
    SwitchToActiveSpeaker,
    MoveFloatVideo(Position),
    ShowSharingToolbar(bool),
    SwitchFloatVideoToActiveSpeaker,
    SwitchFloatVideoToGallery,
    ChangeFloatActiveSpeakerSize(FloatVideoType),
    ShowParticipantsList(bool),
    ShowBottomFloatToolbar(bool),
    ShowJoinAudioDialog,
    HideJoinAudioDialog,
    ShowWallPage { previous: bool },
    ShowSharingFrameWindows(bool),
    SwitchSplitScreen(bool),
    BackToMeeting,
    SwitchMinimizeMode(MinimizeUiMode),
    SwapShareViewOrVideo { show_share: bool },
    SetMeetingTopic(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigCommand {
    SetToggle { toggle: ConfigToggle, enabled: bool },
    SetFloatVideoPos {
        position: Position,
        self_window: Option<WindowHandle>,
        parent: Option<WindowHandle>,
    },
    SetMeetingUiPos {
        position: Position,
        self_window: Option<WindowHandle>,
        parent: Option<WindowHandle>,
    },
    SetDirectShareMonitor(String),
    PrePopulateWebinarRegistration { email: String, user_name: String },
    ConfigDscp { audio: u8, video: u8, reset: bool },
    SetMaxDurationForOnlyHost { minutes: u32 },
    ShowInviteDialogTab { page: InviteDlgTabPage, show: bool },
    ShowH323Tab { page: H323TabPage, show: bool },
    Reset,
    InputPasswordAndScreenName { password: Secret, screen_name: String },
    InputMeetingIdAndScreenName { meeting_id: String, screen_name: String },
    InputScreenName(String),
    CancelPasswordPrompt,
    RegisterWebinarByUrl,
    InputWebinarRegistration { email: String, screen_name: String },
    CancelWebinarRegistration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingCommand {
    SelectDevice { kind: DeviceKind, device_id: String },
    SetToggle { toggle: SettingToggle, enabled: bool },
    SetEchoCancellation(EchoCancellationLevel),
    SetVolume { endpoint: VolumeEndpoint, level: f32 },
    ShowDialog {
        parent: Option<WindowHandle>,
        position: Position,
        tab: SettingTabPage,
    },
    HideDialog,
}

/// One mutating call into the native library.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Auth(AuthCommand),
    Meeting(MeetingCommand),
    Video(VideoCommand),
    Audio(AudioCommand),
    Share(ShareCommand),
    Ui(UiCommand),
    Config(ConfigCommand),
    Setting(SettingCommand),
}

/// The native conferencing library.
///
/// `execute` returns only the synchronous admission result; outcomes are
/// delivered later through the [`EventSink`].
pub trait NativeSdk: Send + Sync {
    fn initialize(&self, options: &InitOptions, sink: Arc<dyn EventSink>) -> SdkResult;
    fn version(&self) -> String;
    fn cleanup(&self) -> SdkResult;
    fn execute(&self, command: Command) -> SdkResult;

    fn meeting_info(&self) -> MeetingInfo;
    fn connection_quality(&self, channel: ConnectionChannel) -> ConnectionQuality;
    fn participants(&self) -> Vec<UserId>;
    fn user_info(&self, user_id: UserId) -> Option<UserInfo>;
    fn devices(&self, kind: DeviceKind) -> Vec<DeviceInfo>;
    fn toggle(&self, toggle: SettingToggle) -> bool;
    fn volume(&self, endpoint: VolumeEndpoint) -> f32;
    fn echo_cancellation_level(&self) -> EchoCancellationLevel;
    fn supports_gpu_share_acceleration(&self) -> bool;
    fn wall_view_page(&self) -> SdkResult<WallViewPage>;
    fn split_screen(&self) -> SdkResult<SplitScreenInfo>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_is_redacted() {
        let cmd = AuthCommand::SdkAuth {
            app_key: "key".into(),
            app_secret: Secret::new("hunter2"),
        };
        let printed = format!("{cmd:?}");
        assert!(printed.contains("key"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn window_handle_accepts_both_forms() {
        assert_eq!(WindowHandle::parse_hex("0x1F04"), Ok(WindowHandle(0x1f04)));
        assert_eq!(WindowHandle::parse_hex("1f04"), Ok(WindowHandle(0x1f04)));
        assert_eq!(WindowHandle(0x1f04).to_string(), "0x1f04");
    }

    #[test]
    fn window_handle_rejects_garbage() {
        for bad in ["", "0x", "0", "zz", "0x-1"] {
            assert_eq!(WindowHandle::parse_hex(bad), Err(SdkError::InvalidParameter), "{bad}");
        }
    }
}
