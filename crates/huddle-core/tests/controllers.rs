use std::sync::Arc;

use huddle_core::catalogue::{MeetingStatus, UserRole};
use huddle_core::native::{
    AudioCommand, ConfigCommand, ConfigToggle, ShareCommand, SplitScreenInfo, UiCommand,
    WallViewPage,
};
use huddle_core::{
    Command, ConfigCallbacks, JoinRequest, LoopbackSdk, MeetingSession, NativeEvent, Sdk,
    SdkError, StartRequest, UserId, UserInfo,
};

struct Harness {
    native: Arc<LoopbackSdk>,
    sdk: Sdk,
    meeting: MeetingSession,
}

fn harness() -> Harness {
    let native = Arc::new(LoopbackSdk::new());
    let sdk = Sdk::new(native.clone());
    let meeting = open(&sdk);
    Harness {
        native,
        sdk,
        meeting,
    }
}

fn open(sdk: &Sdk) -> MeetingSession {
    sdk.initialize(&huddle_core::InitOptions::new("/x", "https://zoom.us"))
        .unwrap();
    sdk.auth().unwrap().authenticate("key", "secret").unwrap();
    sdk.meeting().unwrap()
}

/// Start a meeting with the local user as host.
fn hosting() -> Harness {
    let h = harness();
    h.meeting.start(StartRequest::default()).unwrap();
    assert_eq!(h.meeting.status(), MeetingStatus::InMeeting);
    h.native.clear_commands();
    h
}

fn guest(id: UserId, name: &str) -> UserInfo {
    UserInfo {
        user_id: id,
        user_name: name.to_string(),
        role: UserRole::Attendee,
        is_video_on: true,
        ..Default::default()
    }
}

#[test]
fn switches_start_fresh_after_reinitialize() {
    let h = hosting();
    let audio = h.meeting.audio(Default::default()).unwrap();
    let config = h.meeting.configuration(ConfigCallbacks::default()).unwrap();
    audio.play_chime_on_enter_exit(true).unwrap();
    config
        .set_toggle(ConfigToggle::InviteButtonOnMeetingUi, false)
        .unwrap();

    h.sdk.cleanup().unwrap();
    let meeting = open(&h.sdk);
    meeting.start(StartRequest::default()).unwrap();
    let audio = meeting.audio(Default::default()).unwrap();
    let config = meeting.configuration(ConfigCallbacks::default()).unwrap();
    h.native.clear_commands();

    audio.play_chime_on_enter_exit(true).unwrap();
    config
        .set_toggle(ConfigToggle::InviteButtonOnMeetingUi, false)
        .unwrap();
    assert_eq!(
        h.native.commands(),
        vec![
            Command::Audio(AudioCommand::PlayChimeOnEnterExit(true)),
            Command::Config(ConfigCommand::SetToggle {
                toggle: ConfigToggle::InviteButtonOnMeetingUi,
                enabled: false,
            }),
        ]
    );
}

#[test]
fn meeting_switches_reset_when_meeting_ends() {
    let h = hosting();
    let audio = h.meeting.audio(Default::default()).unwrap();
    audio.play_chime_on_enter_exit(true).unwrap();
    h.meeting.leave(true).unwrap();
    assert_eq!(h.meeting.status(), MeetingStatus::Ended);

    h.meeting.start(StartRequest::default()).unwrap();
    let audio = h.meeting.audio(Default::default()).unwrap();
    h.native.clear_commands();
    audio.play_chime_on_enter_exit(true).unwrap();
    assert_eq!(
        h.native.last_command(),
        Some(Command::Audio(AudioCommand::PlayChimeOnEnterExit(true)))
    );
}

#[test]
fn share_switches_and_stop_are_idempotent() {
    let h = hosting();
    let share = h.meeting.share(Default::default()).unwrap();

    share.stop_share().unwrap();
    assert_eq!(
        share.share_computer_sound_while_sharing(true),
        Err(SdkError::MeetingYouHaveNoShare)
    );
    assert_eq!(
        share.optimize_for_full_screen_video_clip_while_sharing(true),
        Err(SdkError::MeetingYouHaveNoShare)
    );
    assert!(h.native.commands().is_empty());

    share.share_computer_sound(true).unwrap();
    share.share_computer_sound(true).unwrap();
    assert_eq!(h.native.commands().len(), 1);

    share.start_app_share("0x1f04").unwrap();
    assert_eq!(share.is_sharing(), Ok(true));
    h.native.clear_commands();
    share.share_computer_sound_while_sharing(false).unwrap();
    share.stop_share().unwrap();
    assert_eq!(share.is_sharing(), Ok(false));
    assert_eq!(
        h.native.commands(),
        vec![
            Command::Share(ShareCommand::ShareComputerSound {
                enable: false,
                while_sharing: true,
            }),
            Command::Share(ShareCommand::Stop),
        ]
    );
    assert_eq!(share.start_app_share("0"), Err(SdkError::InvalidParameter));
    assert_eq!(h.native.last_command(), Some(Command::Share(ShareCommand::Stop)));
}

#[test]
fn audio_mutes_are_idempotent() {
    let h = harness();
    h.native.add_user(guest(42, "Carol"));
    h.native.add_user(guest(43, "Dave"));
    h.meeting.start(StartRequest::default()).unwrap();
    h.native.clear_commands();
    let audio = h.meeting.audio(Default::default()).unwrap();

    assert_eq!(audio.mute(7, true), Err(SdkError::InvalidParameter));
    assert_eq!(audio.unmute(7), Err(SdkError::InvalidParameter));

    audio.mute(42, true).unwrap();
    audio.mute(42, true).unwrap();
    assert_eq!(h.native.commands().len(), 1);

    audio.mute_all(false).unwrap();
    audio.mute_all(false).unwrap();
    assert_eq!(
        h.native.commands()[1..].to_vec(),
        vec![Command::Audio(AudioCommand::MuteAll {
            allow_unmute_by_self: false,
        })]
    );

    h.native.clear_commands();
    audio.unmute(43).unwrap();
    audio.unmute(43).unwrap();
    assert_eq!(
        h.native.commands(),
        vec![Command::Audio(AudioCommand::Unmute { user_id: 43 })]
    );
}

#[test]
fn wall_paging_stops_at_the_edges() {
    let h = hosting();
    let ui = h.meeting.ui(Default::default()).unwrap();
    h.native.set_wall_view_page(WallViewPage {
        current: 1,
        total: 2,
    });

    ui.show_wall_page(true).unwrap();
    assert!(h.native.commands().is_empty());

    ui.show_wall_page(false).unwrap();
    assert_eq!(
        ui.wall_view_page(),
        Ok(WallViewPage {
            current: 2,
            total: 2,
        })
    );
    ui.show_wall_page(false).unwrap();
    assert_eq!(
        h.native.commands(),
        vec![Command::Ui(UiCommand::ShowWallPage { previous: false })]
    );
}

#[test]
fn split_screen_needs_support_and_skips_current_state() {
    let h = hosting();
    let ui = h.meeting.ui(Default::default()).unwrap();
    assert_eq!(
        ui.switch_split_screen(true),
        Err(SdkError::MeetingDontSupportFeature)
    );

    h.native.set_split_screen(SplitScreenInfo {
        supported: true,
        in_split_screen: false,
    });
    ui.switch_split_screen(false).unwrap();
    assert!(h.native.commands().is_empty());

    ui.switch_split_screen(true).unwrap();
    ui.switch_split_screen(true).unwrap();
    assert_eq!(
        h.native.commands(),
        vec![Command::Ui(UiCommand::SwitchSplitScreen(true))]
    );
    assert!(ui.split_screen_info().unwrap().in_split_screen);
}

#[test]
fn configuration_validates_and_caches() {
    let h = hosting();
    let config = h.meeting.configuration(ConfigCallbacks::default()).unwrap();
    let toggle = ConfigToggle::InviteButtonOnMeetingUi;

    config.set_toggle(toggle, false).unwrap();
    config.set_toggle(toggle, false).unwrap();
    assert_eq!(h.native.commands().len(), 1);

    assert_eq!(config.config_dscp(64, 10, false), Err(SdkError::InvalidParameter));
    assert_eq!(config.config_dscp(10, 64, false), Err(SdkError::InvalidParameter));
    config.config_dscp(63, 0, false).unwrap();
    config.config_dscp(255, 255, true).unwrap();

    assert_eq!(
        config.prepopulate_webinar_registration("not-an-email", "Alice"),
        Err(SdkError::InvalidParameter)
    );
    assert_eq!(
        config.prepopulate_webinar_registration("alice@example.com", "  "),
        Err(SdkError::InvalidParameter)
    );
    config
        .prepopulate_webinar_registration(" alice@example.com ", "Alice")
        .unwrap();
    assert_eq!(
        h.native.last_command(),
        Some(Command::Config(ConfigCommand::PrePopulateWebinarRegistration {
            email: "alice@example.com".into(),
            user_name: "Alice".into(),
        }))
    );

    assert_eq!(
        config.set_max_duration_for_only_host(0),
        Err(SdkError::InvalidParameter)
    );
    config.set_max_duration_for_only_host(40).unwrap();

    config.reset().unwrap();
    h.native.clear_commands();
    config.set_toggle(toggle, false).unwrap();
    assert_eq!(
        h.native.commands(),
        vec![Command::Config(ConfigCommand::SetToggle {
            toggle,
            enabled: false,
        })]
    );
}

#[test]
fn other_meeting_in_progress_frees_the_slot() {
    let h = harness();
    h.native.set_auto_progress(false);
    h.meeting
        .join(JoinRequest::by_number(123456789, "Alice"))
        .unwrap();
    assert!(h.meeting.session_id().is_some());

    h.native.inject(NativeEvent::MeetingStatus {
        status: MeetingStatus::OtherMeetingInProgress,
        result: 0,
    });
    assert_eq!(h.meeting.session_id(), None);
    assert_eq!(h.meeting.status(), MeetingStatus::OtherMeetingInProgress);
    h.meeting
        .join(JoinRequest::by_number(123456789, "Alice"))
        .unwrap();
}
