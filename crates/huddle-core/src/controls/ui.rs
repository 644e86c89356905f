use std::sync::Arc;

use crate::catalogue::{FloatVideoType, MinimizeUiMode, UiViewType};
use crate::errors::{SdkError, SdkResult};
use crate::events::{CallbackSlot, Handler, UiButton};
use crate::meeting::MeetingInner;
use crate::native::{Command, Position, Rect, SplitScreenInfo, UiCommand, WallViewPage, WindowHandle};

use super::Capability;

/// Handlers for meeting UI buttons. Only buttons whose click was redirected
/// through the configuration controller report here.
#[derive(Default)]
pub struct UiCallbacks {
    pub on_invite_clicked: Option<Handler<()>>,
    pub on_start_share_clicked: Option<Handler<()>>,
    pub on_end_meeting_clicked: Option<Handler<()>>,
    pub on_participant_list_clicked: Option<Handler<()>>,
    pub on_custom_live_stream_menu_clicked: Option<Handler<()>>,
    pub on_invite_dialog_failed: Option<Handler<()>>,
    pub on_closed_caption_clicked: Option<Handler<()>>,
    pub on_audio_clicked: Option<Handler<()>>,
    pub on_audio_menu_clicked: Option<Handler<()>>,
}

#[derive(Default)]
pub(crate) struct UiHub {
    invite: CallbackSlot<()>,
    start_share: CallbackSlot<()>,
    end_meeting: CallbackSlot<()>,
    participant_list: CallbackSlot<()>,
    custom_live_stream_menu: CallbackSlot<()>,
    invite_dialog_failed: CallbackSlot<()>,
    closed_caption: CallbackSlot<()>,
    audio: CallbackSlot<()>,
    audio_menu: CallbackSlot<()>,
}

impl UiHub {
    pub(crate) fn slot(&self, button: UiButton) -> &CallbackSlot<()> {
        match button {
            UiButton::Invite => &self.invite,
            UiButton::StartShare => &self.start_share,
            UiButton::EndMeeting => &self.end_meeting,
            UiButton::ParticipantList => &self.participant_list,
            UiButton::CustomLiveStreamMenu => &self.custom_live_stream_menu,
            UiButton::InviteDialogFailed => &self.invite_dialog_failed,
            UiButton::ClosedCaption => &self.closed_caption,
            UiButton::Audio => &self.audio,
            UiButton::AudioMenu => &self.audio_menu,
        }
    }

    pub(crate) fn register(&self, callbacks: UiCallbacks) {
        self.invite.merge(callbacks.on_invite_clicked);
        self.start_share.merge(callbacks.on_start_share_clicked);
        self.end_meeting.merge(callbacks.on_end_meeting_clicked);
        self.participant_list.merge(callbacks.on_participant_list_clicked);
        self.custom_live_stream_menu
            .merge(callbacks.on_custom_live_stream_menu_clicked);
        self.invite_dialog_failed.merge(callbacks.on_invite_dialog_failed);
        self.closed_caption.merge(callbacks.on_closed_caption_clicked);
        self.audio.merge(callbacks.on_audio_clicked);
        self.audio_menu.merge(callbacks.on_audio_menu_clicked);
    }
}

/// Window and layout control of the native meeting UI.
pub struct UiController {
    meeting: Arc<MeetingInner>,
    cap: Capability,
}

impl UiController {
    pub(crate) fn new(meeting: Arc<MeetingInner>, cap: Capability) -> Self {
        Self { meeting, cap }
    }

    pub fn is_valid(&self) -> bool {
        self.cap.is_valid()
    }

    fn run(&self, command: UiCommand) -> SdkResult {
        self.cap.check()?;
        tracing::debug!("ui command: {command:?}");
        self.meeting.native.execute(Command::Ui(command))
    }

    /// Replace the handler for one button, returning the previous one.
    pub fn set_button_callback(&self, button: UiButton, handler: Handler<()>) -> Option<Handler<()>> {
        self.meeting.ui.slot(button).replace(handler)
    }

    /// Show the chat dialog inside `rect`, optionally parented to a hex
    /// window handle.
    pub fn show_chat_dialog(&self, parent: Option<&str>, rect: Rect) -> SdkResult {
        self.cap.check()?;
        let parent = parent.map(WindowHandle::parse_hex).transpose()?;
        if rect.is_empty() {
            return Err(SdkError::InvalidParameter);
        }
        self.run(UiCommand::ShowChatDialog { parent, rect })
    }

    pub fn hide_chat_dialog(&self) -> SdkResult {
        self.run(UiCommand::HideChatDialog)
    }

    pub fn enter_full_screen(&self, view: UiViewType) -> SdkResult {
        self.run(UiCommand::EnterFullScreen(view))
    }

    pub fn exit_full_screen(&self, view: UiViewType) -> SdkResult {
        self.run(UiCommand::ExitFullScreen(view))
    }

    pub fn switch_to_video_wall(&self) -> SdkResult {
        self.run(UiCommand::SwitchToVideoWall)
    }

    pub fn switch_to_active_speaker(&self) -> SdkResult {
        self.run(UiCommand::SwitchToActiveSpeaker)
    }

    pub fn move_float_video(&self, position: Position) -> SdkResult {
        self.run(UiCommand::MoveFloatVideo(position))
    }

    pub fn show_sharing_toolbar(&self, show: bool) -> SdkResult {
        self.run(UiCommand::ShowSharingToolbar(show))
    }

    pub fn switch_float_video_to_active_speaker(&self) -> SdkResult {
        self.run(UiCommand::SwitchFloatVideoToActiveSpeaker)
    }

    pub fn switch_float_video_to_gallery(&self) -> SdkResult {
        self.run(UiCommand::SwitchFloatVideoToGallery)
    }

    pub fn change_float_active_speaker_size(&self, size: FloatVideoType) -> SdkResult {
        self.run(UiCommand::ChangeFloatActiveSpeakerSize(size))
    }

    pub fn show_participants_list(&self, show: bool) -> SdkResult {
        self.run(UiCommand::ShowParticipantsList(show))
    }

    pub fn show_bottom_float_toolbar(&self, show: bool) -> SdkResult {
        self.run(UiCommand::ShowBottomFloatToolbar(show))
    }

    pub fn show_join_audio_dialog(&self) -> SdkResult {
        self.run(UiCommand::ShowJoinAudioDialog)
    }

    pub fn hide_join_audio_dialog(&self) -> SdkResult {
        self.run(UiCommand::HideJoinAudioDialog)
    }

    pub fn wall_view_page(&self) -> SdkResult<WallViewPage> {
        self.cap.check()?;
        self.meeting.native.wall_view_page()
    }

    /// Page the video wall. Paging past either end succeeds without effect.
    pub fn show_wall_page(&self, previous: bool) -> SdkResult {
        let page = self.wall_view_page()?;
        let at_edge = if previous {
            page.current <= 1
        } else {
            page.current >= page.total
        };
        if at_edge {
            return Ok(());
        }
        self.run(UiCommand::ShowWallPage { previous })
    }

    pub fn show_sharing_frame_windows(&self, show: bool) -> SdkResult {
        self.run(UiCommand::ShowSharingFrameWindows(show))
    }

    pub fn split_screen_info(&self) -> SdkResult<SplitScreenInfo> {
        self.cap.check()?;
        self.meeting.native.split_screen()
    }

    pub fn switch_split_screen(&self, enter: bool) -> SdkResult {
        let info = self.split_screen_info()?;
        if !info.supported {
            return Err(SdkError::MeetingDontSupportFeature);
        }
        if info.in_split_screen == enter {
            return Ok(());
        }
        self.run(UiCommand::SwitchSplitScreen(enter))
    }

    pub fn back_to_meeting(&self) -> SdkResult {
        self.run(UiCommand::BackToMeeting)
    }

    pub fn switch_minimize_mode(&self, mode: MinimizeUiMode) -> SdkResult {
        self.run(UiCommand::SwitchMinimizeMode(mode))
    }

    pub fn swap_share_view_or_video(&self, show_share: bool) -> SdkResult {
        self.run(UiCommand::SwapShareViewOrVideo { show_share })
    }

    pub fn set_meeting_topic(&self, topic: &str) -> SdkResult {
        self.cap.check()?;
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(SdkError::InvalidParameter);
        }
        self.run(UiCommand::SetMeetingTopic(topic.to_string()))
    }
}
