use std::sync::Arc;

use crate::catalogue::VideoStatus;
use crate::errors::SdkResult;
use crate::events::{CallbackSlot, Handler, UserId};
use crate::meeting::MeetingInner;
use crate::native::{Command, VideoCommand};

use super::{Capability, ToggleCache, resolve_user};

#[derive(Default)]
pub struct VideoCallbacks {
    pub on_user_video_status: Option<Handler<(UserId, VideoStatus)>>,
    pub on_active_speaker_video_user: Option<Handler<UserId>>,
    pub on_active_video_user: Option<Handler<UserId>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum VideoSwitch {
    HideNoVideoUsersOnWall,
}

#[derive(Default)]
pub(crate) struct VideoHub {
    pub(crate) on_user_video_status: CallbackSlot<(UserId, VideoStatus)>,
    pub(crate) on_active_speaker_video_user: CallbackSlot<UserId>,
    pub(crate) on_active_video_user: CallbackSlot<UserId>,
    switches: ToggleCache<VideoSwitch>,
}

impl VideoHub {
    pub(crate) fn register(&self, callbacks: VideoCallbacks) {
        self.on_user_video_status.merge(callbacks.on_user_video_status);
        self.on_active_speaker_video_user
            .merge(callbacks.on_active_speaker_video_user);
        self.on_active_video_user.merge(callbacks.on_active_video_user);
    }

    /// Forget switch state; the next meeting starts from native defaults.
    pub(crate) fn reset(&self) {
        self.switches.clear();
    }
}

/// Video commands for the current meeting.
pub struct VideoController {
    meeting: Arc<MeetingInner>,
    cap: Capability,
}

impl VideoController {
    pub(crate) fn new(meeting: Arc<MeetingInner>, cap: Capability) -> Self {
        Self { meeting, cap }
    }

    pub fn is_valid(&self) -> bool {
        self.cap.is_valid()
    }

    fn execute(&self, command: VideoCommand) -> SdkResult {
        tracing::debug!("video command: {command:?}");
        self.meeting.native.execute(Command::Video(command))
    }

    /// Stop a user's video. `0` is the local user. No-op if already off.
    pub fn mute(&self, user_id: UserId) -> SdkResult {
        self.cap.check()?;
        let user = resolve_user(self.meeting.native.as_ref(), user_id)?;
        if !user.is_video_on {
            return Ok(());
        }
        self.execute(VideoCommand::Mute { user_id })
    }

    /// Start a user's video. `0` is the local user. No-op if already on.
    pub fn unmute(&self, user_id: UserId) -> SdkResult {
        self.cap.check()?;
        let user = resolve_user(self.meeting.native.as_ref(), user_id)?;
        if user.is_video_on {
            return Ok(());
        }
        self.execute(VideoCommand::Unmute { user_id })
    }

    /// Pin or unpin a user's video on the first or second view.
    pub fn pin(&self, user_id: UserId, pin: bool, first_view: bool) -> SdkResult {
        self.cap.check()?;
        resolve_user(self.meeting.native.as_ref(), user_id)?;
        self.execute(VideoCommand::Pin {
            user_id,
            pin,
            first_view,
        })
    }

    pub fn spotlight(&self, user_id: UserId, spotlight: bool) -> SdkResult {
        self.cap.check()?;
        resolve_user(self.meeting.native.as_ref(), user_id)?;
        self.execute(VideoCommand::Spotlight { user_id, spotlight })
    }

    pub fn hide_no_video_users_on_wall(&self, hide: bool) -> SdkResult {
        self.cap.check()?;
        self.meeting
            .video
            .switches
            .set_with(VideoSwitch::HideNoVideoUsersOnWall, hide, || {
                self.execute(VideoCommand::HideNoVideoUsersOnWall(hide))
            })
    }
}
