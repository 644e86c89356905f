use std::sync::Arc;

use crate::errors::SdkResult;
use crate::events::{CallbackSlot, Handler, UserId, UserInfo};
use crate::meeting::MeetingInner;

use super::{Capability, resolve_user};

#[derive(Default)]
pub struct ParticipantsCallbacks {
    pub on_users_joined: Option<Handler<Vec<UserId>>>,
    pub on_users_left: Option<Handler<Vec<UserId>>>,
    pub on_host_changed: Option<Handler<UserId>>,
}

#[derive(Default)]
pub(crate) struct ParticipantsHub {
    pub(crate) on_users_joined: CallbackSlot<Vec<UserId>>,
    pub(crate) on_users_left: CallbackSlot<Vec<UserId>>,
    pub(crate) on_host_changed: CallbackSlot<UserId>,
}

impl ParticipantsHub {
    pub(crate) fn register(&self, callbacks: ParticipantsCallbacks) {
        self.on_users_joined.merge(callbacks.on_users_joined);
        self.on_users_left.merge(callbacks.on_users_left);
        self.on_host_changed.merge(callbacks.on_host_changed);
    }
}

/// Read access to the participant roster.
///
/// Results are snapshots taken at call time; re-query after a join, leave
/// or host-change callback.
pub struct ParticipantsController {
    meeting: Arc<MeetingInner>,
    cap: Capability,
}

impl ParticipantsController {
    pub(crate) fn new(meeting: Arc<MeetingInner>, cap: Capability) -> Self {
        Self { meeting, cap }
    }

    pub fn is_valid(&self) -> bool {
        self.cap.is_valid()
    }

    pub fn participant_ids(&self) -> SdkResult<Vec<UserId>> {
        self.cap.check()?;
        Ok(self.meeting.native.participants())
    }

    /// Everyone currently known, in native order. Users that vanish between
    /// listing and lookup are skipped.
    pub fn participants(&self) -> SdkResult<Vec<UserInfo>> {
        self.cap.check()?;
        let native = self.meeting.native.as_ref();
        Ok(native
            .participants()
            .into_iter()
            .filter_map(|id| native.user_info(id))
            .collect())
    }

    /// `0` returns the local user.
    pub fn user_info(&self, user_id: UserId) -> SdkResult<UserInfo> {
        self.cap.check()?;
        resolve_user(self.meeting.native.as_ref(), user_id)
    }
}
