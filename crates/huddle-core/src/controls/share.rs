use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::catalogue::ShareStatus;
use crate::errors::{SdkError, SdkResult};
use crate::events::{CallbackSlot, Handler, UserId};
use crate::meeting::MeetingInner;
use crate::native::{Command, ShareCommand, WindowHandle};

use super::{Capability, ToggleCache};

#[derive(Default)]
pub struct ShareCallbacks {
    pub on_sharing_status: Option<Handler<(ShareStatus, UserId)>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ShareSwitch {
    ComputerSound,
    OptimizeForFullScreenVideoClip,
}

#[derive(Default)]
pub(crate) struct ShareHub {
    on_sharing_status: CallbackSlot<(ShareStatus, UserId)>,
    self_sharing: AtomicBool,
    switches: ToggleCache<ShareSwitch>,
}

impl ShareHub {
    pub(crate) fn register(&self, callbacks: ShareCallbacks) {
        self.on_sharing_status.merge(callbacks.on_sharing_status);
    }

    pub(crate) fn on_status(&self, status: ShareStatus, user_id: UserId) {
        match status {
            ShareStatus::SelfSendBegin => self.self_sharing.store(true, Ordering::Release),
            ShareStatus::SelfSendEnd => self.self_sharing.store(false, Ordering::Release),
            _ => {}
        }
        self.on_sharing_status.emit((status, user_id));
    }

    pub(crate) fn reset(&self) {
        self.self_sharing.store(false, Ordering::Release);
        self.switches.clear();
    }

    fn is_self_sharing(&self) -> bool {
        self.self_sharing.load(Ordering::Acquire)
    }
}

pub struct ShareController {
    meeting: Arc<MeetingInner>,
    cap: Capability,
}

impl ShareController {
    pub(crate) fn new(meeting: Arc<MeetingInner>, cap: Capability) -> Self {
        Self { meeting, cap }
    }

    pub fn is_valid(&self) -> bool {
        self.cap.is_valid()
    }

    fn execute(&self, command: ShareCommand) -> SdkResult {
        tracing::debug!("share command: {command:?}");
        self.meeting.native.execute(Command::Share(command))
    }

    /// Whether the local user is currently sending a share.
    pub fn is_sharing(&self) -> SdkResult<bool> {
        self.cap.check()?;
        Ok(self.meeting.share.is_self_sharing())
    }

    /// Share one application window, given as a hex handle.
    pub fn start_app_share(&self, window: &str) -> SdkResult {
        self.cap.check()?;
        let handle = WindowHandle::parse_hex(window)?;
        self.execute(ShareCommand::StartAppShare(handle))
    }

    pub fn start_monitor_share(&self, monitor_id: &str) -> SdkResult {
        self.cap.check()?;
        let monitor_id = monitor_id.trim();
        if monitor_id.is_empty() {
            return Err(SdkError::InvalidParameter);
        }
        self.execute(ShareCommand::StartMonitorShare {
            monitor_id: monitor_id.to_string(),
        })
    }

    /// Stop the local share. Succeeds without effect when nothing is shared.
    pub fn stop_share(&self) -> SdkResult {
        self.cap.check()?;
        if !self.meeting.share.is_self_sharing() {
            return Ok(());
        }
        self.execute(ShareCommand::Stop)
    }

    /// Include computer sound in shares started from now on.
    pub fn share_computer_sound(&self, enable: bool) -> SdkResult {
        self.cap.check()?;
        self.meeting
            .share
            .switches
            .set_with(ShareSwitch::ComputerSound, enable, || {
                self.execute(ShareCommand::ShareComputerSound {
                    enable,
                    while_sharing: false,
                })
            })
    }

    /// Change computer sound for the share in progress.
    pub fn share_computer_sound_while_sharing(&self, enable: bool) -> SdkResult {
        self.cap.check()?;
        if !self.meeting.share.is_self_sharing() {
            return Err(SdkError::MeetingYouHaveNoShare);
        }
        self.execute(ShareCommand::ShareComputerSound {
            enable,
            while_sharing: true,
        })
    }

    pub fn optimize_for_full_screen_video_clip(&self, enable: bool) -> SdkResult {
        self.cap.check()?;
        self.meeting.share.switches.set_with(
            ShareSwitch::OptimizeForFullScreenVideoClip,
            enable,
            || {
                self.execute(ShareCommand::OptimizeForFullScreenVideoClip {
                    enable,
                    while_sharing: false,
                })
            },
        )
    }

    pub fn optimize_for_full_screen_video_clip_while_sharing(&self, enable: bool) -> SdkResult {
        self.cap.check()?;
        if !self.meeting.share.is_self_sharing() {
            return Err(SdkError::MeetingYouHaveNoShare);
        }
        self.execute(ShareCommand::OptimizeForFullScreenVideoClip {
            enable,
            while_sharing: true,
        })
    }
}
