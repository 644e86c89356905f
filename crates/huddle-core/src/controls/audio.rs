use std::sync::Arc;

use crate::errors::SdkResult;
use crate::events::{AudioStatusChange, CallbackSlot, Handler, UserId};
use crate::meeting::MeetingInner;
use crate::native::{AudioCommand, Command};

use super::{Capability, ToggleCache, resolve_user};

#[derive(Default)]
pub struct AudioCallbacks {
    pub on_user_audio_status: Option<Handler<Vec<AudioStatusChange>>>,
    pub on_user_active_audio: Option<Handler<Vec<UserId>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum AudioSwitch {
    ChimeOnEnterExit,
}

#[derive(Default)]
pub(crate) struct AudioHub {
    pub(crate) on_user_audio_status: CallbackSlot<Vec<AudioStatusChange>>,
    pub(crate) on_user_active_audio: CallbackSlot<Vec<UserId>>,
    switches: ToggleCache<AudioSwitch>,
}

impl AudioHub {
    pub(crate) fn register(&self, callbacks: AudioCallbacks) {
        self.on_user_audio_status.merge(callbacks.on_user_audio_status);
        self.on_user_active_audio.merge(callbacks.on_user_active_audio);
    }

    pub(crate) fn reset(&self) {
        self.switches.clear();
    }
}

pub struct AudioController {
    meeting: Arc<MeetingInner>,
    cap: Capability,
}

impl AudioController {
    pub(crate) fn new(meeting: Arc<MeetingInner>, cap: Capability) -> Self {
        Self { meeting, cap }
    }

    pub fn is_valid(&self) -> bool {
        self.cap.is_valid()
    }

    fn execute(&self, command: AudioCommand) -> SdkResult {
        tracing::debug!("audio command: {command:?}");
        self.meeting.native.execute(Command::Audio(command))
    }

    /// Mute one participant (`0` for the local user). No-op if already muted.
    pub fn mute(&self, user_id: UserId, allow_unmute_by_self: bool) -> SdkResult {
        self.cap.check()?;
        let user = resolve_user(self.meeting.native.as_ref(), user_id)?;
        if user.is_audio_muted {
            return Ok(());
        }
        self.execute(AudioCommand::Mute {
            user_id,
            allow_unmute_by_self,
        })
    }

    /// Mute everyone but the caller. No-op if they are all muted already.
    pub fn mute_all(&self, allow_unmute_by_self: bool) -> SdkResult {
        self.cap.check()?;
        let native = self.meeting.native.as_ref();
        let all_muted = native
            .participants()
            .into_iter()
            .filter_map(|id| native.user_info(id))
            .filter(|user| !user.is_myself)
            .all(|user| user.is_audio_muted);
        if all_muted {
            return Ok(());
        }
        self.execute(AudioCommand::MuteAll {
            allow_unmute_by_self,
        })
    }

    pub fn unmute(&self, user_id: UserId) -> SdkResult {
        self.cap.check()?;
        let user = resolve_user(self.meeting.native.as_ref(), user_id)?;
        if !user.is_audio_muted {
            return Ok(());
        }
        self.execute(AudioCommand::Unmute { user_id })
    }

    pub fn join_voip(&self) -> SdkResult {
        self.cap.check()?;
        self.execute(AudioCommand::JoinVoip)
    }

    pub fn leave_voip(&self) -> SdkResult {
        self.cap.check()?;
        self.execute(AudioCommand::LeaveVoip)
    }

    pub fn play_chime_on_enter_exit(&self, enable: bool) -> SdkResult {
        self.cap.check()?;
        self.meeting
            .audio
            .switches
            .set_with(AudioSwitch::ChimeOnEnterExit, enable, || {
                self.execute(AudioCommand::PlayChimeOnEnterExit(enable))
            })
    }
}
