use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalogue::{
    AudioStatus, AuthResult, FreeMeetingNeedUpgradeType, LoginFailReason, LoginStatus,
    MeetingEndReason, MeetingFailCode, MeetingStatus, RequiredInfoType, ShareStatus, UserInfoType,
    UserRole, VideoStatus, WebinarNeedRegisterType,
};
use crate::devices::{DeviceInfo, DeviceKind};

/// Native user identifier. `0` addresses the local user where an
/// operation documents it.
pub type UserId = u32;

/// The local user in targeted operations.
pub const SELF_USER: UserId = 0;

/// A registered callback. Called from whatever thread the native layer
/// delivers on.
pub type Handler<A> = Arc<dyn Fn(A) + Send + Sync>;

/// Wrap a closure as a [`Handler`].
pub fn handler<A, F>(f: F) -> Handler<A>
where
    F: Fn(A) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Single-slot callback registry for one event kind.
///
/// Registering replaces the previous handler and hands it back; events
/// emitted after the replacement only reach the new handler.
pub struct CallbackSlot<A> {
    handler: RwLock<Option<Handler<A>>>,
}

impl<A> CallbackSlot<A> {
    pub fn new() -> Self {
        Self {
            handler: RwLock::new(None),
        }
    }

    pub fn replace(&self, handler: Handler<A>) -> Option<Handler<A>> {
        self.write().replace(handler)
    }

    /// Replace only when a handler is given. Used for callback bundles
    /// where absent entries keep what was registered before.
    pub fn merge(&self, handler: Option<Handler<A>>) {
        if let Some(h) = handler {
            self.replace(h);
        }
    }

    pub fn clear(&self) -> Option<Handler<A>> {
        self.write().take()
    }

    pub fn is_set(&self) -> bool {
        self.handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Invoke the current handler, if any. The slot lock is released before
    /// the call so handlers may re-register.
    pub fn emit(&self, args: A) -> bool {
        let current = self
            .handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match current {
            Some(h) => {
                h(args);
                true
            }
            None => false,
        }
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Option<Handler<A>>> {
        self.handler.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A> Default for CallbackSlot<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Secondary code attached to a terminal meeting status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusReason {
    Fail(MeetingFailCode),
    End(MeetingEndReason),
    /// A code the catalogue does not know.
    Other(i32),
}

impl StatusReason {
    /// Decode the raw result that accompanies a status. Only `Failed` and
    /// `Ended` carry a reason.
    pub fn decode(status: MeetingStatus, raw: i32) -> Option<Self> {
        match status {
            MeetingStatus::Failed => Some(
                MeetingFailCode::from_code(raw)
                    .map(Self::Fail)
                    .unwrap_or(Self::Other(raw)),
            ),
            MeetingStatus::Ended => Some(
                MeetingEndReason::from_code(raw)
                    .map(Self::End)
                    .unwrap_or(Self::Other(raw)),
            ),
            _ => None,
        }
    }
}

/// One entry of the meeting status stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEvent {
    pub status: MeetingStatus,
    pub reason: Option<StatusReason>,
    pub received_at: DateTime<Utc>,
}

impl StatusEvent {
    pub fn new(status: MeetingStatus, reason: Option<StatusReason>) -> Self {
        Self {
            status,
            reason,
            received_at: Utc::now(),
        }
    }
}

/// Snapshot of one participant, as reported by the native layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserInfo {
    pub user_id: UserId,
    pub user_name: String,
    pub role: UserRole,
    pub is_host: bool,
    pub is_myself: bool,
    pub is_video_on: bool,
    pub is_audio_muted: bool,
    pub is_raise_hand: bool,
    pub is_in_waiting_room: bool,
    pub is_h323_user: bool,
    pub is_pure_phone_user: bool,
    pub is_closed_caption_sender: bool,
    pub webinar_attendee_status: bool,
    pub info_type: UserInfoType,
    pub audio_voice_level: u32,
    pub customer_key: String,
}

impl UserInfo {
    /// Only the host may end a meeting for everyone.
    pub fn can_end_meeting(&self) -> bool {
        self.is_host || self.role == UserRole::Host
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioStatusChange {
    pub user_id: UserId,
    pub status: AudioStatus,
}

/// Meeting UI buttons the host may redirect to its own handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiButton {
    Invite,
    StartShare,
    EndMeeting,
    ParticipantList,
    CustomLiveStreamMenu,
    InviteDialogFailed,
    ClosedCaption,
    Audio,
    AudioMenu,
}

/// Everything the native layer reports back asynchronously.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeEvent {
    AuthResult(AuthResult),
    LogoutConfirmed,
    IdentityExpired,
    /// Advance notice: the auth identity expires in ten minutes.
    AuthIdentityExpiring,
    LoginReturn {
        status: LoginStatus,
        reason: Option<LoginFailReason>,
    },
    MeetingStatus {
        status: MeetingStatus,
        result: i32,
    },
    UserVideoStatus {
        user_id: UserId,
        status: VideoStatus,
    },
    ActiveSpeakerVideoUser(UserId),
    ActiveVideoUser(UserId),
    UserAudioStatus(Vec<AudioStatusChange>),
    UserActiveAudio(Vec<UserId>),
    SharingStatus {
        status: ShareStatus,
        user_id: UserId,
    },
    UsersJoined(Vec<UserId>),
    UsersLeft(Vec<UserId>),
    HostChanged(UserId),
    UiButtonClicked(UiButton),
    FreeMeetingNeedUpgrade {
        kind: FreeMeetingNeedUpgradeType,
        gift_url: String,
    },
    FreeMeetingGiftTrialStarted,
    FreeMeetingGiftTrialStopped,
    FreeMeetingUpgradedToPro,
    PasswordAndScreenNameRequired(RequiredInfoType),
    AirPlayInstructionWindow {
        show: bool,
        host_name: String,
    },
    WebinarNeedRegister {
        kind: WebinarNeedRegisterType,
        url: Option<String>,
    },
    EndOtherMeetingToJoin,
    FreeMeetingRemainTime {
        seconds: u32,
    },
    FreeMeetingRemainTimeStopCountDown,
    DeviceListChanged {
        kind: DeviceKind,
        devices: Vec<DeviceInfo>,
    },
    DefaultDeviceChanged {
        kind: DeviceKind,
        device_id: String,
        device_name: String,
    },
}

/// Receiver the native layer pushes [`NativeEvent`]s into.
/// Implementations must be Send + Sync (called from native threads).
pub trait EventSink: Send + Sync {
    fn deliver(&self, event: NativeEvent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn slot_dispatches_to_handler() {
        let slot = CallbackSlot::<u32>::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        slot.replace(handler(move |n: u32| {
            c.fetch_add(n as usize, Ordering::SeqCst);
        }));

        assert!(slot.emit(3));
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn empty_slot_reports_no_delivery() {
        let slot = CallbackSlot::<()>::new();
        assert!(!slot.is_set());
        assert!(!slot.emit(()));
    }

    #[test]
    fn last_registration_wins() {
        let slot = CallbackSlot::<&'static str>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = seen.clone();
        slot.replace(handler(move |s| first.lock().unwrap().push(format!("first:{s}"))));
        let second = seen.clone();
        let old = slot.replace(handler(move |s| second.lock().unwrap().push(format!("second:{s}"))));

        assert!(old.is_some());
        slot.emit("a");
        assert_eq!(*seen.lock().unwrap(), vec!["second:a".to_string()]);

        // The returned handler is still callable by whoever kept it.
        old.unwrap()("b");
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn merge_keeps_existing_handler_when_absent() {
        let slot = CallbackSlot::<()>::new();
        slot.replace(handler(|_| {}));
        slot.merge(None);
        assert!(slot.is_set());
        assert!(slot.clear().is_some());
        assert!(!slot.is_set());
    }

    #[test]
    fn handler_may_reregister_during_emit() {
        let slot = Arc::new(CallbackSlot::<()>::new());
        let inner = slot.clone();
        slot.replace(handler(move |_| {
            inner.replace(handler(|_| {}));
        }));
        assert!(slot.emit(()));
        assert!(slot.is_set());
    }

    #[test]
    fn status_reason_depends_on_status() {
        assert_eq!(
            StatusReason::decode(MeetingStatus::Failed, 4),
            Some(StatusReason::Fail(MeetingFailCode::PasswordErr))
        );
        assert_eq!(
            StatusReason::decode(MeetingStatus::Ended, 2),
            Some(StatusReason::End(MeetingEndReason::EndByHost))
        );
        assert_eq!(
            StatusReason::decode(MeetingStatus::Ended, 99),
            Some(StatusReason::Other(99))
        );
        assert_eq!(StatusReason::decode(MeetingStatus::InMeeting, 4), None);
    }
}
