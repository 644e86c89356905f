use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

use crate::catalogue::{ConnectionQuality, LeaveMeetingCmd, MeetingStatus, MeetingType, SdkUserType};
use crate::controls::{
    AudioCallbacks, AudioController, AudioHub, Capability, ConfigCallbacks, ConfigHub,
    ConfigurationController, ParticipantsCallbacks, ParticipantsController, ParticipantsHub,
    ShareCallbacks, ShareController, ShareHub, UiCallbacks, UiController, UiHub, VideoCallbacks,
    VideoController, VideoHub,
};
use crate::errors::{SdkError, SdkResult};
use crate::events::{CallbackSlot, Handler, NativeEvent, SELF_USER, StatusEvent, StatusReason};
use crate::native::{Command, ConnectionChannel, MeetingCommand, NativeSdk, Secret, WindowHandle};
use crate::sdk::Lifecycle;

/// Personal link suffix: starts with a letter, 5 to 40 characters.
static VANITY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9.]{4,39}$").unwrap());

const MAX_CUSTOMER_KEY_LEN: usize = 35;

/// Which meeting a start/join addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MeetingTarget {
    Number(u64),
    Vanity(String),
}

impl MeetingTarget {
    /// Exactly one of `number` and `vanity` must be given.
    pub fn resolve(number: Option<u64>, vanity: Option<&str>) -> SdkResult<Self> {
        let vanity = vanity.map(str::trim).filter(|v| !v.is_empty());
        match (number, vanity) {
            (Some(0), _) => Err(SdkError::InvalidParameter),
            (Some(n), None) => Ok(Self::Number(n)),
            (None, Some(v)) => {
                if VANITY_ID.is_match(v) {
                    Ok(Self::Vanity(v.to_string()))
                } else {
                    Err(SdkError::InvalidParameter)
                }
            }
            _ => Err(SdkError::InvalidParameter),
        }
    }
}

/// Media and direct-share options common to every start/join flavour.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MediaOptions {
    pub direct_share_app: Option<WindowHandle>,
    pub direct_share_desktop: bool,
    pub video_off: bool,
    pub audio_off: bool,
    pub customer_key: Option<String>,
}

impl MediaOptions {
    fn validate(&self) -> SdkResult {
        if self.direct_share_app.is_some() && self.direct_share_desktop {
            return Err(SdkError::InvalidParameter);
        }
        if self
            .customer_key
            .as_ref()
            .is_some_and(|k| k.chars().count() > MAX_CUSTOMER_KEY_LEN)
        {
            return Err(SdkError::InvalidParameter);
        }
        Ok(())
    }
}

/// Start a meeting as the logged-in user. No number starts an instant
/// meeting.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StartRequest {
    pub meeting_number: Option<u64>,
    pub media: MediaOptions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StartWithoutLoginRequest {
    pub user_id: String,
    pub user_token: Secret,
    pub zak: Secret,
    pub user_name: String,
    pub user_type: SdkUserType,
    pub meeting_number: Option<u64>,
    pub vanity_id: Option<String>,
    pub media: MediaOptions,
}

impl StartWithoutLoginRequest {
    pub fn new(
        user_id: impl Into<String>,
        user_token: impl Into<Secret>,
        zak: impl Into<Secret>,
        user_name: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            user_token: user_token.into(),
            zak: zak.into(),
            user_name: user_name.into(),
            user_type: SdkUserType::WithoutLogin,
            meeting_number: None,
            vanity_id: None,
            media: MediaOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct JoinRequest {
    pub meeting_number: Option<u64>,
    pub vanity_id: Option<String>,
    pub user_name: String,
    pub password: Option<Secret>,
    pub webinar_token: Option<Secret>,
    pub media: MediaOptions,
}

impl JoinRequest {
    pub fn by_number(meeting_number: u64, user_name: impl Into<String>) -> Self {
        Self {
            meeting_number: Some(meeting_number),
            user_name: user_name.into(),
            ..Default::default()
        }
    }

    pub fn by_vanity(vanity_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            vanity_id: Some(vanity_id.into()),
            user_name: user_name.into(),
            ..Default::default()
        }
    }

    pub fn with_password(mut self, password: impl Into<Secret>) -> Self {
        self.password = Some(password.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct JoinWithoutLoginRequest {
    pub meeting_number: Option<u64>,
    pub vanity_id: Option<String>,
    pub user_name: String,
    pub password: Option<Secret>,
    pub webinar_token: Option<Secret>,
    /// Used when the meeting requires a signed-in participant.
    pub enforce_login_token: Option<Secret>,
    pub media: MediaOptions,
}

impl JoinWithoutLoginRequest {
    pub fn by_number(meeting_number: u64, user_name: impl Into<String>) -> Self {
        Self {
            meeting_number: Some(meeting_number),
            user_name: user_name.into(),
            ..Default::default()
        }
    }

    pub fn with_password(mut self, password: impl Into<Secret>) -> Self {
        self.password = Some(password.into());
        self
    }
}

/// Snapshot of the current meeting. All fields are empty outside a meeting.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeetingInfo {
    pub number: u64,
    pub id: String,
    pub topic: String,
    pub meeting_type: MeetingType,
    pub invite_email_template: Option<String>,
    pub invite_email_title: Option<String>,
    pub join_url: Option<String>,
    pub host_tag: Option<String>,
    pub is_internal: bool,
}

/// Orthogonal flags carried by overlay statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeetingOverlay {
    pub locked: bool,
    pub in_breakout_room: bool,
    pub webinar_promoted: bool,
    pub audio_ready: bool,
}

impl MeetingOverlay {
    fn apply(&mut self, status: MeetingStatus) {
        match status {
            MeetingStatus::Locked => self.locked = true,
            MeetingStatus::Unlocked => self.locked = false,
            MeetingStatus::JoinBreakoutRoom => self.in_breakout_room = true,
            MeetingStatus::LeaveBreakoutRoom => self.in_breakout_room = false,
            MeetingStatus::WebinarPromote => self.webinar_promoted = true,
            MeetingStatus::WebinarDepromote => self.webinar_promoted = false,
            MeetingStatus::AudioReady => self.audio_ready = true,
            _ => {}
        }
    }
}

const SCOPE_PENDING: u8 = 0;
const SCOPE_ACTIVE: u8 = 1;
const SCOPE_EXPIRED: u8 = 2;

/// Validity of everything handed out for one meeting.
///
/// Pending until the meeting is entered, active until it ends, then
/// expired for good. A fresh scope replaces an expired one.
pub(crate) struct SessionScope {
    id: Uuid,
    state: AtomicU8,
}

impl SessionScope {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: AtomicU8::new(SCOPE_PENDING),
        }
    }

    pub(crate) fn id(&self) -> Uuid {
        self.id
    }

    fn activate(&self) {
        let _ = self.state.compare_exchange(
            SCOPE_PENDING,
            SCOPE_ACTIVE,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    fn expire(&self) {
        self.state.store(SCOPE_EXPIRED, Ordering::Release);
    }

    pub(crate) fn is_active(&self) -> bool {
        self.state.load(Ordering::Acquire) == SCOPE_ACTIVE
    }

    pub(crate) fn is_expired(&self) -> bool {
        self.state.load(Ordering::Acquire) == SCOPE_EXPIRED
    }
}

struct SessionState {
    scope: Arc<SessionScope>,
    /// A start/join has been accepted and has not reached a terminal status.
    admitted: bool,
    phase: MeetingStatus,
    overlay: MeetingOverlay,
}

impl SessionState {
    fn new() -> Self {
        Self {
            scope: Arc::new(SessionScope::new()),
            admitted: false,
            phase: MeetingStatus::Idle,
            overlay: MeetingOverlay::default(),
        }
    }

    fn end(&mut self, terminal: MeetingStatus) {
        tracing::info!("meeting session {} closed: {terminal:?}", self.scope.id());
        self.scope.expire();
        self.scope = Arc::new(SessionScope::new());
        self.admitted = false;
        self.phase = terminal;
        self.overlay = MeetingOverlay::default();
    }
}

/// Shared state behind every [`MeetingSession`] handle.
pub(crate) struct MeetingInner {
    pub(crate) native: Arc<dyn NativeSdk>,
    pub(crate) life: Arc<Lifecycle>,
    state: Mutex<SessionState>,
    status_tx: watch::Sender<StatusEvent>,
    on_status: CallbackSlot<StatusEvent>,
    registration: Mutex<()>,
    pub(crate) video: VideoHub,
    pub(crate) audio: AudioHub,
    pub(crate) share: ShareHub,
    pub(crate) participants: ParticipantsHub,
    pub(crate) ui: UiHub,
    pub(crate) config: ConfigHub,
}

impl MeetingInner {
    pub(crate) fn new(native: Arc<dyn NativeSdk>, life: Arc<Lifecycle>) -> Self {
        let (status_tx, _) = watch::channel(StatusEvent::new(MeetingStatus::Idle, None));
        Self {
            native,
            life,
            state: Mutex::new(SessionState::new()),
            status_tx,
            on_status: CallbackSlot::new(),
            registration: Mutex::new(()),
            video: VideoHub::default(),
            audio: AudioHub::default(),
            share: ShareHub::default(),
            participants: ParticipantsHub::default(),
            ui: UiHub::default(),
            config: ConfigHub::default(),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn current_scope(&self) -> Arc<SessionScope> {
        self.lock_state().scope.clone()
    }

    fn publish(&self, event: StatusEvent) {
        self.status_tx.send_replace(event.clone());
        self.on_status.emit(event);
    }

    /// Route one native event. Returns `false` if it is not a meeting event.
    pub(crate) fn handle_event(&self, event: NativeEvent) -> bool {
        match event {
            NativeEvent::MeetingStatus { status, result } => self.on_native_status(status, result),
            NativeEvent::UserVideoStatus { user_id, status } => {
                self.video.on_user_video_status.emit((user_id, status));
            }
            NativeEvent::ActiveSpeakerVideoUser(id) => {
                self.video.on_active_speaker_video_user.emit(id);
            }
            NativeEvent::ActiveVideoUser(id) => {
                self.video.on_active_video_user.emit(id);
            }
            NativeEvent::UserAudioStatus(changes) => {
                self.audio.on_user_audio_status.emit(changes);
            }
            NativeEvent::UserActiveAudio(ids) => {
                self.audio.on_user_active_audio.emit(ids);
            }
            NativeEvent::SharingStatus { status, user_id } => self.share.on_status(status, user_id),
            NativeEvent::UsersJoined(ids) => {
                self.participants.on_users_joined.emit(ids);
            }
            NativeEvent::UsersLeft(ids) => {
                self.participants.on_users_left.emit(ids);
            }
            NativeEvent::HostChanged(id) => {
                self.participants.on_host_changed.emit(id);
            }
            NativeEvent::UiButtonClicked(button) => {
                self.ui.slot(button).emit(());
            }
            NativeEvent::PasswordAndScreenNameRequired(required) => {
                let scope = self.current_scope();
                self.config.on_password_required(
                    required,
                    self.native.clone(),
                    self.life.clone(),
                    scope,
                );
            }
            NativeEvent::WebinarNeedRegister { kind, url } => {
                let scope = self.current_scope();
                self.config.on_webinar_need_register(
                    kind,
                    url,
                    self.native.clone(),
                    self.life.clone(),
                    scope,
                );
            }
            other => return self.config.handle_notice(other),
        }
        true
    }

    fn on_native_status(&self, status: MeetingStatus, raw: i32) {
        let event = StatusEvent::new(status, StatusReason::decode(status, raw));
        {
            let mut state = self.lock_state();
            if !state.admitted {
                tracing::debug!("status {status:?} without an outstanding session dropped");
                return;
            }
            if status.is_overlay() {
                state.overlay.apply(status);
            } else if status.is_terminal() {
                state.end(status);
                self.reset_meeting_switches();
            } else {
                state.phase = status;
                if status == MeetingStatus::InMeeting {
                    state.scope.activate();
                    tracing::info!("meeting session {} active", state.scope.id());
                }
            }
        }
        self.publish(event);
    }

    fn reset_meeting_switches(&self) {
        self.video.reset();
        self.audio.reset();
        self.share.reset();
    }

    /// Expire any outstanding session and report it ended, then forget
    /// every cached switch. Used on cleanup.
    pub(crate) fn force_end(&self) {
        let ended = {
            let mut state = self.lock_state();
            if state.admitted {
                state.end(MeetingStatus::Ended);
                true
            } else {
                false
            }
        };
        self.reset_meeting_switches();
        self.config.clear_toggles();
        if ended {
            self.publish(StatusEvent::new(MeetingStatus::Ended, None));
        }
        self.config.invalidate_prompts();
    }

    /// Reserve the single session slot, run `call`, release on failure.
    fn admit(&self, call: impl FnOnce() -> SdkResult) -> SdkResult {
        let scope_id = {
            let mut state = self.lock_state();
            if state.admitted {
                tracing::warn!(
                    "start/join rejected: session {} still outstanding",
                    state.scope.id()
                );
                return Err(SdkError::WrongUsage);
            }
            state.admitted = true;
            state.phase = MeetingStatus::Idle;
            state.scope.id()
        };

        if let Err(e) = call() {
            let mut state = self.lock_state();
            if state.scope.id() == scope_id {
                state.admitted = false;
            }
            return Err(e);
        }
        tracing::info!("meeting session {scope_id} admitted");
        Ok(())
    }
}

/// Handle over the meeting service. Cheap to clone.
#[derive(Clone)]
pub struct MeetingSession {
    inner: Arc<MeetingInner>,
    generation: u64,
}

impl MeetingSession {
    pub(crate) fn new(inner: Arc<MeetingInner>, generation: u64) -> Self {
        Self { inner, generation }
    }

    fn check(&self) -> SdkResult {
        self.inner.life.check(self.generation)
    }

    fn execute(&self, command: MeetingCommand) -> SdkResult {
        tracing::debug!("meeting command: {command:?}");
        self.inner.native.execute(Command::Meeting(command))
    }

    /// Register the status handler, returning the previous one.
    pub fn set_status_callback(&self, handler: Handler<StatusEvent>) -> Option<Handler<StatusEvent>> {
        self.inner.on_status.replace(handler)
    }

    pub fn start(&self, request: StartRequest) -> SdkResult {
        self.check()?;
        if request.meeting_number == Some(0) {
            return Err(SdkError::InvalidParameter);
        }
        request.media.validate()?;
        self.inner
            .admit(|| self.execute(MeetingCommand::Start(request)))
    }

    pub fn start_without_login(&self, request: StartWithoutLoginRequest) -> SdkResult {
        self.check()?;
        let target =
            MeetingTarget::resolve(request.meeting_number, request.vanity_id.as_deref())?;
        if request.user_id.trim().is_empty()
            || request.user_name.trim().is_empty()
            || request.user_token.is_blank()
            || request.zak.is_blank()
        {
            return Err(SdkError::InvalidParameter);
        }
        request.media.validate()?;
        self.inner.admit(|| {
            self.execute(MeetingCommand::StartWithoutLogin { target, request })
        })
    }

    pub fn join(&self, request: JoinRequest) -> SdkResult {
        self.check()?;
        let target =
            MeetingTarget::resolve(request.meeting_number, request.vanity_id.as_deref())?;
        request.media.validate()?;
        self.inner
            .admit(|| self.execute(MeetingCommand::Join { target, request }))
    }

    pub fn join_without_login(&self, request: JoinWithoutLoginRequest) -> SdkResult {
        self.check()?;
        let target =
            MeetingTarget::resolve(request.meeting_number, request.vanity_id.as_deref())?;
        if request.user_name.trim().is_empty() {
            return Err(SdkError::InvalidParameter);
        }
        request.media.validate()?;
        self.inner.admit(|| {
            self.execute(MeetingCommand::JoinWithoutLogin { target, request })
        })
    }

    /// Join through a protocol link such as `zoommtg://zoom.us/join?...`.
    pub fn handle_web_uri(&self, protocol_action: &str) -> SdkResult {
        self.check()?;
        let action = protocol_action.trim();
        let parsed = url::Url::parse(action).map_err(|_| SdkError::InvalidParameter)?;
        if matches!(parsed.scheme(), "http" | "https") {
            return Err(SdkError::InvalidParameter);
        }
        let protocol_action = action.to_string();
        self.inner
            .admit(|| self.execute(MeetingCommand::HandleWebUri { protocol_action }))
    }

    /// Leave the meeting, or end it for everyone when `end_meeting` is set
    /// (host only).
    pub fn leave(&self, end_meeting: bool) -> SdkResult {
        self.check()?;
        if !self.inner.lock_state().admitted {
            return Err(SdkError::WrongUsage);
        }
        let cmd = if end_meeting {
            let me = self.inner.native.user_info(SELF_USER);
            if !me.is_some_and(|u| u.can_end_meeting()) {
                tracing::warn!("end meeting refused: local user is not the host");
                return Err(SdkError::NoPermission);
            }
            LeaveMeetingCmd::End
        } else {
            LeaveMeetingCmd::Leave
        };
        self.execute(MeetingCommand::Leave(cmd))
    }

    pub fn lock(&self) -> SdkResult {
        self.set_locked(true)
    }

    pub fn unlock(&self) -> SdkResult {
        self.set_locked(false)
    }

    fn set_locked(&self, locked: bool) -> SdkResult {
        self.check()?;
        {
            let state = self.inner.lock_state();
            if !state.admitted || state.phase != MeetingStatus::InMeeting {
                return Err(SdkError::WrongUsage);
            }
            if state.overlay.locked == locked {
                return Ok(());
            }
        }
        self.execute(if locked {
            MeetingCommand::Lock
        } else {
            MeetingCommand::Unlock
        })
    }

    /// Latest lifecycle status.
    pub fn status(&self) -> MeetingStatus {
        self.inner.lock_state().phase
    }

    pub fn overlay(&self) -> MeetingOverlay {
        self.inner.lock_state().overlay
    }

    /// Id of the outstanding session, if any.
    pub fn session_id(&self) -> Option<Uuid> {
        let state = self.inner.lock_state();
        state.admitted.then(|| state.scope.id())
    }

    fn in_meeting(&self) -> bool {
        self.check().is_ok() && self.inner.current_scope().is_active()
    }

    pub fn info(&self) -> MeetingInfo {
        if self.in_meeting() {
            self.inner.native.meeting_info()
        } else {
            MeetingInfo::default()
        }
    }

    fn quality(&self, channel: ConnectionChannel) -> ConnectionQuality {
        if self.in_meeting() {
            self.inner.native.connection_quality(channel)
        } else {
            ConnectionQuality::Unknown
        }
    }

    pub fn sharing_quality(&self) -> ConnectionQuality {
        self.quality(ConnectionChannel::Sharing)
    }

    pub fn video_quality(&self) -> ConnectionQuality {
        self.quality(ConnectionChannel::Video)
    }

    pub fn audio_quality(&self) -> ConnectionQuality {
        self.quality(ConnectionChannel::Audio)
    }

    pub fn subscribe_status(&self) -> watch::Receiver<StatusEvent> {
        self.inner.status_tx.subscribe()
    }

    /// Wait until the latest status equals `target`. `None` on timeout.
    ///
    /// Only the most recent status is observed; a status that was
    /// immediately superseded may be missed.
    pub async fn wait_for_status(
        &self,
        target: MeetingStatus,
        timeout: Duration,
    ) -> Option<StatusEvent> {
        let mut rx = self.inner.status_tx.subscribe();
        let waited = tokio::time::timeout(timeout, rx.wait_for(|e| e.status == target)).await;
        match waited {
            Ok(Ok(event)) => Some(event.clone()),
            _ => None,
        }
    }

    fn capability(&self) -> SdkResult<Capability> {
        self.check()?;
        Ok(Capability::new(
            self.inner.life.clone(),
            self.generation,
            self.inner.current_scope(),
        ))
    }

    fn registering(&self) -> MutexGuard<'_, ()> {
        self.inner
            .registration
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn video(&self, callbacks: VideoCallbacks) -> SdkResult<VideoController> {
        let cap = self.capability()?;
        let _guard = self.registering();
        self.inner.video.register(callbacks);
        Ok(VideoController::new(self.inner.clone(), cap))
    }

    pub fn audio(&self, callbacks: AudioCallbacks) -> SdkResult<AudioController> {
        let cap = self.capability()?;
        let _guard = self.registering();
        self.inner.audio.register(callbacks);
        Ok(AudioController::new(self.inner.clone(), cap))
    }

    pub fn share(&self, callbacks: ShareCallbacks) -> SdkResult<ShareController> {
        let cap = self.capability()?;
        let _guard = self.registering();
        self.inner.share.register(callbacks);
        Ok(ShareController::new(self.inner.clone(), cap))
    }

    pub fn participants(&self, callbacks: ParticipantsCallbacks) -> SdkResult<ParticipantsController> {
        let cap = self.capability()?;
        let _guard = self.registering();
        self.inner.participants.register(callbacks);
        Ok(ParticipantsController::new(self.inner.clone(), cap))
    }

    pub fn ui(&self, callbacks: UiCallbacks) -> SdkResult<UiController> {
        let cap = self.capability()?;
        let _guard = self.registering();
        self.inner.ui.register(callbacks);
        Ok(UiController::new(self.inner.clone(), cap))
    }

    pub fn configuration(&self, callbacks: ConfigCallbacks) -> SdkResult<ConfigurationController> {
        let cap = self.capability()?;
        let _guard = self.registering();
        self.inner.config.register(callbacks);
        Ok(ConfigurationController::new(self.inner.clone(), cap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_requires_exactly_one_identifier() {
        assert_eq!(MeetingTarget::resolve(Some(123456789), None), Ok(MeetingTarget::Number(123456789)));
        assert_eq!(
            MeetingTarget::resolve(None, Some(" alice.room ")),
            Ok(MeetingTarget::Vanity("alice.room".into()))
        );
        assert_eq!(MeetingTarget::resolve(None, None), Err(SdkError::InvalidParameter));
        assert_eq!(
            MeetingTarget::resolve(Some(1), Some("alice.room")),
            Err(SdkError::InvalidParameter)
        );
        assert_eq!(MeetingTarget::resolve(Some(0), None), Err(SdkError::InvalidParameter));
        // A blank vanity id counts as absent.
        assert_eq!(MeetingTarget::resolve(Some(5), Some("  ")), Ok(MeetingTarget::Number(5)));
    }

    #[test]
    fn vanity_format_is_checked() {
        for bad in ["abc", "1alice", "alice room", "a".repeat(41).as_str()] {
            assert_eq!(
                MeetingTarget::resolve(None, Some(bad)),
                Err(SdkError::InvalidParameter),
                "{bad}"
            );
        }
    }

    #[test]
    fn media_options_conflict() {
        let media = MediaOptions {
            direct_share_app: Some(WindowHandle(0x10)),
            direct_share_desktop: true,
            ..Default::default()
        };
        assert_eq!(media.validate(), Err(SdkError::InvalidParameter));

        let media = MediaOptions {
            customer_key: Some("k".repeat(36)),
            ..Default::default()
        };
        assert_eq!(media.validate(), Err(SdkError::InvalidParameter));
        assert_eq!(MediaOptions::default().validate(), Ok(()));
    }

    #[test]
    fn overlay_flags_follow_statuses() {
        let mut overlay = MeetingOverlay::default();
        overlay.apply(MeetingStatus::Locked);
        overlay.apply(MeetingStatus::JoinBreakoutRoom);
        overlay.apply(MeetingStatus::AudioReady);
        assert!(overlay.locked && overlay.in_breakout_room && overlay.audio_ready);

        overlay.apply(MeetingStatus::Unlocked);
        overlay.apply(MeetingStatus::LeaveBreakoutRoom);
        assert!(!overlay.locked && !overlay.in_breakout_room);
    }

    #[test]
    fn scope_never_revives() {
        let scope = SessionScope::new();
        assert!(!scope.is_active());
        scope.activate();
        assert!(scope.is_active());
        scope.expire();
        scope.activate();
        assert!(scope.is_expired());
        assert!(!scope.is_active());
    }

    #[test]
    fn session_end_installs_fresh_scope() {
        let mut state = SessionState::new();
        state.admitted = true;
        let old = state.scope.clone();
        old.activate();

        state.end(MeetingStatus::Failed);
        assert!(old.is_expired());
        assert_ne!(state.scope.id(), old.id());
        assert!(!state.scope.is_active() && !state.scope.is_expired());
        assert!(!state.admitted);
        assert_eq!(state.phase, MeetingStatus::Failed);
    }
}
