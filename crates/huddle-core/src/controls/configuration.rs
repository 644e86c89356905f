use std::sync::Arc;

use crate::catalogue::{
    FreeMeetingNeedUpgradeType, H323TabPage, InviteDlgTabPage, RequiredInfoType,
    WebinarNeedRegisterType,
};
use crate::errors::{SdkError, SdkResult};
use crate::events::{CallbackSlot, Handler, NativeEvent};
use crate::meeting::{MeetingInner, SessionScope};
use crate::native::{Command, ConfigCommand, ConfigToggle, NativeSdk, Position, WindowHandle};
use crate::prompts::{PasswordPrompt, PromptIssuer, WebinarRegistrationPrompt, is_plausible_email};
use crate::sdk::Lifecycle;

use super::{Capability, ToggleCache};

/// DSCP is a six-bit field.
const MAX_DSCP: u8 = 63;

#[derive(Default)]
pub struct ConfigCallbacks {
    pub on_free_meeting_need_upgrade: Option<Handler<(FreeMeetingNeedUpgradeType, String)>>,
    pub on_gift_trial_started: Option<Handler<()>>,
    pub on_gift_trial_stopped: Option<Handler<()>>,
    pub on_upgraded_to_pro: Option<Handler<()>>,
    /// Join needs a password or screen name. Answer through the prompt.
    pub on_password_required: Option<Handler<PasswordPrompt>>,
    pub on_webinar_need_register: Option<Handler<WebinarRegistrationPrompt>>,
    /// `(show, host_name)`
    pub on_air_play_instruction: Option<Handler<(bool, String)>>,
    pub on_end_other_meeting_to_join: Option<Handler<()>>,
    /// Seconds left in a free meeting.
    pub on_free_meeting_remain_time: Option<Handler<u32>>,
    pub on_remain_time_stop_countdown: Option<Handler<()>>,
}

#[derive(Default)]
pub(crate) struct ConfigHub {
    on_free_meeting_need_upgrade: CallbackSlot<(FreeMeetingNeedUpgradeType, String)>,
    on_gift_trial_started: CallbackSlot<()>,
    on_gift_trial_stopped: CallbackSlot<()>,
    on_upgraded_to_pro: CallbackSlot<()>,
    on_password_required: CallbackSlot<PasswordPrompt>,
    on_webinar_need_register: CallbackSlot<WebinarRegistrationPrompt>,
    on_air_play_instruction: CallbackSlot<(bool, String)>,
    on_end_other_meeting_to_join: CallbackSlot<()>,
    on_free_meeting_remain_time: CallbackSlot<u32>,
    on_remain_time_stop_countdown: CallbackSlot<()>,
    toggles: ToggleCache<ConfigToggle>,
    password_prompts: PromptIssuer,
    webinar_prompts: PromptIssuer,
}

impl ConfigHub {
    pub(crate) fn register(&self, callbacks: ConfigCallbacks) {
        self.on_free_meeting_need_upgrade
            .merge(callbacks.on_free_meeting_need_upgrade);
        self.on_gift_trial_started.merge(callbacks.on_gift_trial_started);
        self.on_gift_trial_stopped.merge(callbacks.on_gift_trial_stopped);
        self.on_upgraded_to_pro.merge(callbacks.on_upgraded_to_pro);
        self.on_password_required.merge(callbacks.on_password_required);
        self.on_webinar_need_register
            .merge(callbacks.on_webinar_need_register);
        self.on_air_play_instruction.merge(callbacks.on_air_play_instruction);
        self.on_end_other_meeting_to_join
            .merge(callbacks.on_end_other_meeting_to_join);
        self.on_free_meeting_remain_time
            .merge(callbacks.on_free_meeting_remain_time);
        self.on_remain_time_stop_countdown
            .merge(callbacks.on_remain_time_stop_countdown);
    }

    pub(crate) fn on_password_required(
        &self,
        required: RequiredInfoType,
        native: Arc<dyn NativeSdk>,
        life: Arc<Lifecycle>,
        scope: Arc<SessionScope>,
    ) {
        if required == RequiredInfoType::None {
            tracing::debug!("password request without a required field ignored");
            return;
        }
        let prompt = PasswordPrompt::issue(&self.password_prompts, required, native, life, scope);
        if !self.on_password_required.emit(prompt) {
            tracing::warn!("password required ({required:?}) but no handler registered");
        }
    }

    pub(crate) fn on_webinar_need_register(
        &self,
        kind: WebinarNeedRegisterType,
        url: Option<String>,
        native: Arc<dyn NativeSdk>,
        life: Arc<Lifecycle>,
        scope: Arc<SessionScope>,
    ) {
        if kind == WebinarNeedRegisterType::None {
            tracing::debug!("webinar registration request without a kind ignored");
            return;
        }
        let prompt =
            WebinarRegistrationPrompt::issue(&self.webinar_prompts, kind, url, native, life, scope);
        if !self.on_webinar_need_register.emit(prompt) {
            tracing::warn!("webinar registration ({kind:?}) needed but no handler registered");
        }
    }

    /// Dispatch meeting notices that carry no continuation. Returns `false`
    /// for events this hub does not own.
    pub(crate) fn handle_notice(&self, event: NativeEvent) -> bool {
        match event {
            NativeEvent::FreeMeetingNeedUpgrade { kind, gift_url } => {
                self.on_free_meeting_need_upgrade.emit((kind, gift_url));
            }
            NativeEvent::FreeMeetingGiftTrialStarted => {
                self.on_gift_trial_started.emit(());
            }
            NativeEvent::FreeMeetingGiftTrialStopped => {
                self.on_gift_trial_stopped.emit(());
            }
            NativeEvent::FreeMeetingUpgradedToPro => {
                self.on_upgraded_to_pro.emit(());
            }
            NativeEvent::AirPlayInstructionWindow { show, host_name } => {
                self.on_air_play_instruction.emit((show, host_name));
            }
            NativeEvent::EndOtherMeetingToJoin => {
                self.on_end_other_meeting_to_join.emit(());
            }
            NativeEvent::FreeMeetingRemainTime { seconds } => {
                self.on_free_meeting_remain_time.emit(seconds);
            }
            NativeEvent::FreeMeetingRemainTimeStopCountDown => {
                self.on_remain_time_stop_countdown.emit(());
            }
            _ => return false,
        }
        true
    }

    /// Forget cached switch values. Used when the native library restarts.
    pub(crate) fn clear_toggles(&self) {
        self.toggles.clear();
    }

    pub(crate) fn invalidate_prompts(&self) {
        self.password_prompts.invalidate();
        self.webinar_prompts.invalidate();
    }
}

/// Meeting-UI configuration: which buttons and dialogs appear, where
/// windows sit, and network marking.
pub struct ConfigurationController {
    meeting: Arc<MeetingInner>,
    cap: Capability,
}

impl ConfigurationController {
    pub(crate) fn new(meeting: Arc<MeetingInner>, cap: Capability) -> Self {
        Self { meeting, cap }
    }

    pub fn is_valid(&self) -> bool {
        self.cap.is_valid()
    }

    fn execute(&self, command: ConfigCommand) -> SdkResult {
        tracing::debug!("config command: {command:?}");
        self.meeting.native.execute(Command::Config(command))
    }

    /// Turn one switch on or off. Writing the current value again is a
    /// no-op.
    pub fn set_toggle(&self, toggle: ConfigToggle, enabled: bool) -> SdkResult {
        self.cap.check()?;
        self.meeting.config.toggles.set_with(toggle, enabled, || {
            self.execute(ConfigCommand::SetToggle { toggle, enabled })
        })
    }

    /// Place the floating video window, in screen coordinates or relative
    /// to `parent`.
    pub fn set_float_video_pos(
        &self,
        position: Position,
        self_window: Option<&str>,
        parent: Option<&str>,
    ) -> SdkResult {
        self.cap.check()?;
        let (self_window, parent) = parse_handles(self_window, parent)?;
        self.execute(ConfigCommand::SetFloatVideoPos {
            position,
            self_window,
            parent,
        })
    }

    pub fn set_meeting_ui_pos(
        &self,
        position: Position,
        self_window: Option<&str>,
        parent: Option<&str>,
    ) -> SdkResult {
        self.cap.check()?;
        let (self_window, parent) = parse_handles(self_window, parent)?;
        self.execute(ConfigCommand::SetMeetingUiPos {
            position,
            self_window,
            parent,
        })
    }

    pub fn set_direct_share_monitor(&self, monitor_id: &str) -> SdkResult {
        self.cap.check()?;
        let monitor_id = monitor_id.trim();
        if monitor_id.is_empty() {
            return Err(SdkError::InvalidParameter);
        }
        self.execute(ConfigCommand::SetDirectShareMonitor(monitor_id.to_string()))
    }

    /// Prefill the webinar registration form.
    pub fn prepopulate_webinar_registration(&self, email: &str, user_name: &str) -> SdkResult {
        self.cap.check()?;
        let user_name = user_name.trim();
        if !is_plausible_email(email) || user_name.is_empty() {
            return Err(SdkError::InvalidParameter);
        }
        self.execute(ConfigCommand::PrePopulateWebinarRegistration {
            email: email.trim().to_string(),
            user_name: user_name.to_string(),
        })
    }

    /// Set DSCP marks for audio and video packets. `reset` restores the
    /// native defaults and ignores the values.
    pub fn config_dscp(&self, audio: u8, video: u8, reset: bool) -> SdkResult {
        self.cap.check()?;
        if !reset && (audio > MAX_DSCP || video > MAX_DSCP) {
            return Err(SdkError::InvalidParameter);
        }
        self.execute(ConfigCommand::ConfigDscp {
            audio,
            video,
            reset,
        })
    }

    /// End the meeting after `minutes` when the host is alone.
    pub fn set_max_duration_for_only_host(&self, minutes: u32) -> SdkResult {
        self.cap.check()?;
        if minutes == 0 {
            return Err(SdkError::InvalidParameter);
        }
        self.execute(ConfigCommand::SetMaxDurationForOnlyHost { minutes })
    }

    pub fn show_invite_dialog_tab(&self, page: InviteDlgTabPage, show: bool) -> SdkResult {
        self.cap.check()?;
        self.execute(ConfigCommand::ShowInviteDialogTab { page, show })
    }

    pub fn show_h323_tab(&self, page: H323TabPage, show: bool) -> SdkResult {
        self.cap.check()?;
        self.execute(ConfigCommand::ShowH323Tab { page, show })
    }

    /// Restore every switch to its native default.
    pub fn reset(&self) -> SdkResult {
        self.cap.check()?;
        self.execute(ConfigCommand::Reset)?;
        self.meeting.config.toggles.clear();
        Ok(())
    }
}

fn parse_handles(
    self_window: Option<&str>,
    parent: Option<&str>,
) -> SdkResult<(Option<WindowHandle>, Option<WindowHandle>)> {
    let self_window = self_window.map(WindowHandle::parse_hex).transpose()?;
    let parent = parent.map(WindowHandle::parse_hex).transpose()?;
    Ok((self_window, parent))
}
