//! In-process stand-in for the native library.
//!
//! `LoopbackSdk` records every command it is handed and keeps a small world
//! model (participants, meeting info, devices, preferences). With auto
//! progress on, commands produce the events a real library would send,
//! synchronously and from the calling thread, so whole flows can run in
//! tests and headless hosts.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::catalogue::{
    AudioStatus, AuthResult, ConnectionQuality, EchoCancellationLevel, LeaveMeetingCmd,
    LoginStatus, MeetingStatus, ShareStatus, UserRole, VideoStatus,
};
use crate::config::InitOptions;
use crate::devices::{DeviceInfo, DeviceKind};
use crate::errors::{SdkError, SdkResult};
use crate::events::{AudioStatusChange, EventSink, NativeEvent, SELF_USER, UserId, UserInfo};
use crate::meeting::{MeetingInfo, MeetingTarget};
use crate::native::{
    AudioCommand, AuthCommand, Command, ConnectionChannel, MeetingCommand, NativeSdk,
    SettingCommand, SettingToggle, ShareCommand, SplitScreenInfo, UiCommand, VideoCommand,
    VolumeEndpoint, WallViewPage,
};

pub const LOOPBACK_VERSION: &str = "5.17.11-loopback";

/// Native id of the local user unless replaced.
pub const DEFAULT_LOCAL_USER_ID: UserId = 16_778_240;

/// Meeting number used for an instant meeting.
pub const INSTANT_MEETING_NUMBER: u64 = 8_123_456_789;

struct LoopbackState {
    sink: Option<Arc<dyn EventSink>>,
    initialized: bool,
    auto_progress: bool,
    commands: Vec<Command>,
    local: UserInfo,
    users: BTreeMap<UserId, UserInfo>,
    meeting_info: MeetingInfo,
    in_meeting: bool,
    quality: HashMap<ConnectionChannel, ConnectionQuality>,
    devices: HashMap<DeviceKind, Vec<DeviceInfo>>,
    toggles: HashMap<SettingToggle, bool>,
    volumes: HashMap<VolumeEndpoint, f32>,
    echo: EchoCancellationLevel,
    gpu_supported: bool,
    wall_page: WallViewPage,
    split_screen: SplitScreenInfo,
    fail_next: Option<SdkError>,
    fail_load: bool,
    auth_outcome: AuthResult,
}

impl LoopbackState {
    fn new(auto_progress: bool) -> Self {
        Self {
            sink: None,
            initialized: false,
            auto_progress,
            commands: Vec::new(),
            local: default_local_user(),
            users: BTreeMap::new(),
            meeting_info: MeetingInfo::default(),
            in_meeting: false,
            quality: HashMap::new(),
            devices: HashMap::new(),
            toggles: HashMap::new(),
            volumes: HashMap::new(),
            echo: EchoCancellationLevel::Default,
            gpu_supported: true,
            wall_page: WallViewPage {
                current: 1,
                total: 1,
            },
            split_screen: SplitScreenInfo::default(),
            fail_next: None,
            fail_load: false,
            auth_outcome: AuthResult::Success,
        }
    }

    fn user_mut(&mut self, user_id: UserId) -> Option<&mut UserInfo> {
        if user_id == SELF_USER || user_id == self.local.user_id {
            Some(&mut self.local)
        } else {
            self.users.get_mut(&user_id)
        }
    }

    fn resolve_id(&self, user_id: UserId) -> UserId {
        if user_id == SELF_USER {
            self.local.user_id
        } else {
            user_id
        }
    }

    /// Events a real library would emit for `command`.
    fn react(&mut self, command: &Command) -> Vec<NativeEvent> {
        match command {
            Command::Auth(cmd) => self.react_auth(cmd),
            Command::Meeting(cmd) => self.react_meeting(cmd),
            Command::Video(cmd) => self.react_video(cmd),
            Command::Audio(cmd) => self.react_audio(cmd),
            Command::Share(cmd) => self.react_share(cmd),
            Command::Ui(cmd) => {
                self.react_ui(cmd);
                Vec::new()
            }
            Command::Setting(cmd) => self.react_setting(cmd),
            Command::Config(_) => Vec::new(),
        }
    }

    fn react_auth(&mut self, cmd: &AuthCommand) -> Vec<NativeEvent> {
        match cmd {
            AuthCommand::SdkAuth { .. } | AuthCommand::SdkAuthWithToken { .. } => {
                vec![NativeEvent::AuthResult(self.auth_outcome)]
            }
            AuthCommand::SsoLogin { .. } => vec![NativeEvent::LoginReturn {
                status: LoginStatus::Success,
                reason: None,
            }],
            AuthCommand::Logout => vec![NativeEvent::LogoutConfirmed],
        }
    }

    fn enter_meeting(&mut self, number: u64, host: bool) -> Vec<NativeEvent> {
        self.meeting_info.number = number;
        if self.meeting_info.id.is_empty() {
            self.meeting_info.id = number.to_string();
        }
        if host {
            self.local.is_host = true;
            self.local.role = UserRole::Host;
        }
        self.in_meeting = true;
        vec![status(MeetingStatus::Connecting, 0), status(MeetingStatus::InMeeting, 0)]
    }

    fn react_meeting(&mut self, cmd: &MeetingCommand) -> Vec<NativeEvent> {
        match cmd {
            MeetingCommand::Start(request) => {
                let number = request.meeting_number.unwrap_or(INSTANT_MEETING_NUMBER);
                self.enter_meeting(number, true)
            }
            MeetingCommand::StartWithoutLogin { target, request } => {
                self.local.user_name = request.user_name.clone();
                self.enter_meeting(target_number(target), true)
            }
            MeetingCommand::Join { target, request } => {
                self.local.user_name = request.user_name.clone();
                self.enter_meeting(target_number(target), false)
            }
            MeetingCommand::JoinWithoutLogin { target, request } => {
                self.local.user_name = request.user_name.clone();
                self.enter_meeting(target_number(target), false)
            }
            MeetingCommand::HandleWebUri { .. } => self.enter_meeting(INSTANT_MEETING_NUMBER, false),
            MeetingCommand::Leave(cmd) => {
                self.in_meeting = false;
                self.meeting_info = MeetingInfo::default();
                self.local.is_host = false;
                self.local.role = UserRole::Attendee;
                let reason = match cmd {
                    LeaveMeetingCmd::Leave => 0,
                    LeaveMeetingCmd::End => 2,
                };
                vec![status(MeetingStatus::Disconnecting, 0), status(MeetingStatus::Ended, reason)]
            }
            MeetingCommand::Lock => vec![status(MeetingStatus::Locked, 0)],
            MeetingCommand::Unlock => vec![status(MeetingStatus::Unlocked, 0)],
        }
    }

    fn react_video(&mut self, cmd: &VideoCommand) -> Vec<NativeEvent> {
        let (user_id, on) = match cmd {
            VideoCommand::Mute { user_id } => (*user_id, false),
            VideoCommand::Unmute { user_id } => (*user_id, true),
            _ => return Vec::new(),
        };
        let id = self.resolve_id(user_id);
        match self.user_mut(user_id) {
            Some(user) => user.is_video_on = on,
            None => return Vec::new(),
        }
        vec![NativeEvent::UserVideoStatus {
            user_id: id,
            status: if on { VideoStatus::On } else { VideoStatus::Off },
        }]
    }

    fn set_muted(&mut self, user_id: UserId, muted: bool, status: AudioStatus) -> Option<AudioStatusChange> {
        let id = self.resolve_id(user_id);
        let user = self.user_mut(user_id)?;
        user.is_audio_muted = muted;
        Some(AudioStatusChange { user_id: id, status })
    }

    fn react_audio(&mut self, cmd: &AudioCommand) -> Vec<NativeEvent> {
        let changes: Vec<AudioStatusChange> = match cmd {
            AudioCommand::Mute { user_id, .. } => {
                let status = if self.resolve_id(*user_id) == self.local.user_id {
                    AudioStatus::Muted
                } else {
                    AudioStatus::MutedByHost
                };
                self.set_muted(*user_id, true, status).into_iter().collect()
            }
            AudioCommand::Unmute { user_id } => self
                .set_muted(*user_id, false, AudioStatus::Unmuted)
                .into_iter()
                .collect(),
            AudioCommand::MuteAll { .. } => {
                let ids: Vec<UserId> = self.users.keys().copied().collect();
                ids.into_iter()
                    .filter_map(|id| self.set_muted(id, true, AudioStatus::MutedAllByHost))
                    .collect()
            }
            _ => Vec::new(),
        };
        if changes.is_empty() {
            Vec::new()
        } else {
            vec![NativeEvent::UserAudioStatus(changes)]
        }
    }

    fn react_share(&mut self, cmd: &ShareCommand) -> Vec<NativeEvent> {
        let status = match cmd {
            ShareCommand::StartAppShare(_) | ShareCommand::StartMonitorShare { .. } => {
                ShareStatus::SelfSendBegin
            }
            ShareCommand::Stop => ShareStatus::SelfSendEnd,
            _ => return Vec::new(),
        };
        vec![NativeEvent::SharingStatus {
            status,
            user_id: self.local.user_id,
        }]
    }

    fn react_ui(&mut self, cmd: &UiCommand) {
        match cmd {
            UiCommand::SwitchSplitScreen(enter) => self.split_screen.in_split_screen = *enter,
            UiCommand::ShowWallPage { previous: true } => {
                self.wall_page.current = self.wall_page.current.saturating_sub(1).max(1);
            }
            UiCommand::ShowWallPage { previous: false } => {
                self.wall_page.current = (self.wall_page.current + 1).min(self.wall_page.total);
            }
            UiCommand::SetMeetingTopic(topic) => self.meeting_info.topic = topic.clone(),
            _ => {}
        }
    }

    fn react_setting(&mut self, cmd: &SettingCommand) -> Vec<NativeEvent> {
        match cmd {
            SettingCommand::SelectDevice { kind, device_id } => {
                let Some(list) = self.devices.get_mut(kind) else {
                    return Vec::new();
                };
                let mut name = String::new();
                for device in list.iter_mut() {
                    device.is_selected = device.id == *device_id;
                    if device.is_selected {
                        name = device.name.clone();
                    }
                }
                vec![NativeEvent::DefaultDeviceChanged {
                    kind: *kind,
                    device_id: device_id.clone(),
                    device_name: name,
                }]
            }
            SettingCommand::SetToggle { toggle, enabled } => {
                self.toggles.insert(*toggle, *enabled);
                Vec::new()
            }
            SettingCommand::SetEchoCancellation(level) => {
                self.echo = *level;
                Vec::new()
            }
            SettingCommand::SetVolume { endpoint, level } => {
                self.volumes.insert(*endpoint, *level);
                Vec::new()
            }
            SettingCommand::ShowDialog { .. } | SettingCommand::HideDialog => Vec::new(),
        }
    }
}

fn status(status: MeetingStatus, result: i32) -> NativeEvent {
    NativeEvent::MeetingStatus { status, result }
}

fn target_number(target: &MeetingTarget) -> u64 {
    match target {
        MeetingTarget::Number(n) => *n,
        MeetingTarget::Vanity(_) => INSTANT_MEETING_NUMBER,
    }
}

fn default_local_user() -> UserInfo {
    UserInfo {
        user_id: DEFAULT_LOCAL_USER_ID,
        user_name: "Me".to_string(),
        role: UserRole::Attendee,
        is_myself: true,
        is_video_on: true,
        ..Default::default()
    }
}

/// Scriptable in-process [`NativeSdk`].
pub struct LoopbackSdk {
    state: Mutex<LoopbackState>,
}

impl LoopbackSdk {
    /// A loopback engine that answers commands with the usual events.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LoopbackState::new(true)),
        }
    }

    /// A loopback engine that only records; events must be injected.
    pub fn manual() -> Self {
        Self {
            state: Mutex::new(LoopbackState::new(false)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LoopbackState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_auto_progress(&self, on: bool) {
        self.lock().auto_progress = on;
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().initialized
    }

    /// Deliver `event` as if the library sent it. Returns `false` when no
    /// sink is attached.
    pub fn inject(&self, event: NativeEvent) -> bool {
        let sink = self.lock().sink.clone();
        match sink {
            Some(sink) => {
                sink.deliver(event);
                true
            }
            None => false,
        }
    }

    /// Every command handed to `execute`, including refused ones.
    pub fn commands(&self) -> Vec<Command> {
        self.lock().commands.clone()
    }

    pub fn last_command(&self) -> Option<Command> {
        self.lock().commands.last().cloned()
    }

    pub fn clear_commands(&self) {
        self.lock().commands.clear();
    }

    /// Fail the next `execute` with `error`.
    pub fn fail_next(&self, error: SdkError) {
        self.lock().fail_next = Some(error);
    }

    /// Make `initialize` fail as if the library could not be loaded.
    pub fn fail_load(&self, fail: bool) {
        self.lock().fail_load = fail;
    }

    /// Result reported for the next authentications.
    pub fn set_auth_outcome(&self, outcome: AuthResult) {
        self.lock().auth_outcome = outcome;
    }

    pub fn add_user(&self, user: UserInfo) {
        self.lock().users.insert(user.user_id, user);
    }

    pub fn remove_user(&self, user_id: UserId) -> Option<UserInfo> {
        self.lock().users.remove(&user_id)
    }

    pub fn set_local_user(&self, user: UserInfo) {
        self.lock().local = UserInfo {
            is_myself: true,
            ..user
        };
    }

    pub fn local_user(&self) -> UserInfo {
        self.lock().local.clone()
    }

    /// Replace the device list the library reports. No event is sent.
    pub fn set_devices(&self, kind: DeviceKind, devices: Vec<DeviceInfo>) {
        self.lock().devices.insert(kind, devices);
    }

    pub fn set_meeting_info(&self, info: MeetingInfo) {
        self.lock().meeting_info = info;
    }

    pub fn set_connection_quality(&self, channel: ConnectionChannel, quality: ConnectionQuality) {
        self.lock().quality.insert(channel, quality);
    }

    pub fn set_toggle(&self, toggle: SettingToggle, enabled: bool) {
        self.lock().toggles.insert(toggle, enabled);
    }

    pub fn set_gpu_share_supported(&self, supported: bool) {
        self.lock().gpu_supported = supported;
    }

    pub fn set_wall_view_page(&self, page: WallViewPage) {
        self.lock().wall_page = page;
    }

    pub fn set_split_screen(&self, info: SplitScreenInfo) {
        self.lock().split_screen = info;
    }
}

impl Default for LoopbackSdk {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeSdk for LoopbackSdk {
    fn initialize(&self, options: &InitOptions, sink: Arc<dyn EventSink>) -> SdkResult {
        let mut state = self.lock();
        if state.fail_load {
            return Err(SdkError::ModuleLoadFailed);
        }
        if state.initialized {
            return Err(SdkError::OtherSdkInstanceRunning);
        }
        tracing::debug!("loopback initialized for {:?}", options.domain);
        state.sink = Some(sink);
        state.initialized = true;
        Ok(())
    }

    fn version(&self) -> String {
        LOOPBACK_VERSION.to_string()
    }

    fn cleanup(&self) -> SdkResult {
        let mut state = self.lock();
        if !state.initialized {
            return Err(SdkError::Uninitialize);
        }
        state.sink = None;
        state.initialized = false;
        state.in_meeting = false;
        Ok(())
    }

    fn execute(&self, command: Command) -> SdkResult {
        let (sink, events) = {
            let mut state = self.lock();
            state.commands.push(command.clone());
            if !state.initialized {
                return Err(SdkError::Uninitialize);
            }
            if let Some(err) = state.fail_next.take() {
                return Err(err);
            }
            if !state.auto_progress {
                return Ok(());
            }
            let events = state.react(&command);
            (state.sink.clone(), events)
        };
        if let Some(sink) = sink {
            for event in events {
                sink.deliver(event);
            }
        }
        Ok(())
    }

    fn meeting_info(&self) -> MeetingInfo {
        self.lock().meeting_info.clone()
    }

    fn connection_quality(&self, channel: ConnectionChannel) -> ConnectionQuality {
        let state = self.lock();
        if !state.in_meeting {
            return ConnectionQuality::Unknown;
        }
        state
            .quality
            .get(&channel)
            .copied()
            .unwrap_or(ConnectionQuality::Good)
    }

    fn participants(&self) -> Vec<UserId> {
        let state = self.lock();
        std::iter::once(state.local.user_id)
            .chain(state.users.keys().copied())
            .collect()
    }

    fn user_info(&self, user_id: UserId) -> Option<UserInfo> {
        let state = self.lock();
        if user_id == SELF_USER || user_id == state.local.user_id {
            Some(state.local.clone())
        } else {
            state.users.get(&user_id).cloned()
        }
    }

    fn devices(&self, kind: DeviceKind) -> Vec<DeviceInfo> {
        self.lock().devices.get(&kind).cloned().unwrap_or_default()
    }

    fn toggle(&self, toggle: SettingToggle) -> bool {
        self.lock().toggles.get(&toggle).copied().unwrap_or(false)
    }

    fn volume(&self, endpoint: VolumeEndpoint) -> f32 {
        self.lock().volumes.get(&endpoint).copied().unwrap_or(128.0)
    }

    fn echo_cancellation_level(&self) -> EchoCancellationLevel {
        self.lock().echo
    }

    fn supports_gpu_share_acceleration(&self) -> bool {
        self.lock().gpu_supported
    }

    fn wall_view_page(&self) -> SdkResult<WallViewPage> {
        Ok(self.lock().wall_page)
    }

    fn split_screen(&self) -> SdkResult<SplitScreenInfo> {
        Ok(self.lock().split_screen)
    }
}
