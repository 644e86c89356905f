use std::sync::{Arc, Mutex};
use std::time::Duration;

use huddle_core::catalogue::{
    ConnectionQuality, MeetingStatus, RequiredInfoType, UserRole, VideoStatus,
    WebinarNeedRegisterType,
};
use huddle_core::native::{ConfigCommand, ConfigToggle, MeetingCommand};
use huddle_core::{
    Command, ConfigCallbacks, DeviceInfo, DeviceKind, InitOptions, JoinRequest, LoopbackSdk,
    MeetingSession, NativeEvent, PasswordPrompt, Sdk, SdkError, StartRequest, StatusEvent,
    UserId, UserInfo, VideoCallbacks, WebinarRegistrationPrompt, handler, result_code,
};

struct Harness {
    native: Arc<LoopbackSdk>,
    sdk: Sdk,
    meeting: MeetingSession,
}

fn options() -> InitOptions {
    InitOptions::new("/x", "https://zoom.us")
}

fn harness() -> Harness {
    let native = Arc::new(LoopbackSdk::new());
    let sdk = Sdk::new(native.clone());
    sdk.initialize(&options()).unwrap();
    sdk.auth().unwrap().authenticate("key", "secret").unwrap();
    let meeting = sdk.meeting().unwrap();
    Harness {
        native,
        sdk,
        meeting,
    }
}

fn record_statuses(meeting: &MeetingSession) -> Arc<Mutex<Vec<MeetingStatus>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    meeting.set_status_callback(handler(move |event: StatusEvent| {
        sink.lock().unwrap().push(event.status);
    }));
    seen
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
fn initialize_then_empty_meeting_info() {
    let h = harness();
    assert!(h.sdk.is_initialized());
    let info = h.meeting.info();
    assert_eq!(info.topic, "");
    assert_eq!(info.number, 0);
}

#[test]
fn missing_required_option_never_yields_auth() {
    let native = Arc::new(LoopbackSdk::new());
    let sdk = Sdk::new(native.clone());
    let mut opts = options();
    opts.domain = None;
    let err = sdk.initialize(&opts).unwrap_err();
    assert_eq!(err, SdkError::Uninitialize);
    assert!(!native.is_initialized());
    assert_eq!(sdk.auth().err(), Some(SdkError::Uninitialize));
}

#[test]
fn module_load_failure_is_surfaced() {
    let native = Arc::new(LoopbackSdk::new());
    native.fail_load(true);
    let sdk = Sdk::new(native);
    assert_eq!(sdk.initialize(&options()), Err(SdkError::ModuleLoadFailed));
    assert!(!sdk.is_initialized());
}

#[test]
fn reinitialize_result_is_not_masked() {
    let h = harness();
    let result = h.sdk.initialize(&options());
    assert_eq!(result, Err(SdkError::OtherSdkInstanceRunning));
    assert_eq!(result_code(&result), 14);
}

#[test]
fn meeting_requires_auth() {
    let native = Arc::new(LoopbackSdk::new());
    let sdk = Sdk::new(native);
    sdk.initialize(&options()).unwrap();
    assert_eq!(sdk.meeting().err(), Some(SdkError::Unauthentication));
}

#[test]
fn second_join_is_rejected_without_status() {
    let h = harness();
    h.meeting
        .join(JoinRequest::by_number(111222333, "Bob"))
        .unwrap();
    assert_eq!(h.meeting.status(), MeetingStatus::InMeeting);

    let seen = record_statuses(&h.meeting);
    let second = JoinRequest::by_number(123456789, "Alice").with_password("abc");
    assert_eq!(h.meeting.join(second), Err(SdkError::WrongUsage));
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(h.meeting.status(), MeetingStatus::InMeeting);
}

#[test]
fn non_host_cannot_end_meeting() {
    let h = harness();
    h.meeting
        .join(JoinRequest::by_number(123456789, "Alice"))
        .unwrap();
    h.native.clear_commands();

    assert_eq!(h.meeting.leave(true), Err(SdkError::NoPermission));
    assert_eq!(h.meeting.status(), MeetingStatus::InMeeting);
    assert!(h.native.commands().is_empty());
}

#[test]
fn host_ends_meeting_and_controllers_die() {
    let h = harness();
    let seen = record_statuses(&h.meeting);
    h.meeting.start(StartRequest::default()).unwrap();
    let video = h.meeting.video(VideoCallbacks::default()).unwrap();
    assert!(video.is_valid());

    h.meeting.leave(true).unwrap();
    assert_eq!(h.meeting.status(), MeetingStatus::Ended);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            MeetingStatus::Connecting,
            MeetingStatus::InMeeting,
            MeetingStatus::Disconnecting,
            MeetingStatus::Ended,
        ]
    );
    assert!(!video.is_valid());
    assert_eq!(video.mute(0), Err(SdkError::Uninitialize));

    // A fresh meeting does not revive the old controller.
    h.meeting.start(StartRequest::default()).unwrap();
    assert_eq!(video.mute(0), Err(SdkError::Uninitialize));
    assert!(h.meeting.video(VideoCallbacks::default()).unwrap().is_valid());
}

#[test]
fn controllers_need_an_active_meeting() {
    let h = harness();
    let video = h.meeting.video(VideoCallbacks::default()).unwrap();
    let audio = h.meeting.audio(Default::default()).unwrap();
    let share = h.meeting.share(Default::default()).unwrap();
    let ui = h.meeting.ui(Default::default()).unwrap();
    let config = h.meeting.configuration(ConfigCallbacks::default()).unwrap();
    let people = h.meeting.participants(Default::default()).unwrap();

    assert_eq!(video.mute(0), Err(SdkError::Uninitialize));
    assert_eq!(audio.join_voip(), Err(SdkError::Uninitialize));
    assert_eq!(share.stop_share(), Err(SdkError::Uninitialize));
    assert_eq!(ui.switch_to_video_wall(), Err(SdkError::Uninitialize));
    assert_eq!(
        config.set_toggle(ConfigToggle::InviteButtonOnMeetingUi, false),
        Err(SdkError::Uninitialize)
    );
    assert_eq!(people.participant_ids().err(), Some(SdkError::Uninitialize));
    assert!(h.native.commands().iter().all(|c| matches!(c, Command::Auth(_))));
}

#[test]
fn meeting_ops_outside_meeting_are_wrong_usage() {
    let h = harness();
    assert_eq!(h.meeting.leave(false), Err(SdkError::WrongUsage));
    assert_eq!(h.meeting.lock(), Err(SdkError::WrongUsage));
    assert_eq!(h.meeting.unlock(), Err(SdkError::WrongUsage));
}

#[test]
fn lock_is_idempotent() {
    let h = harness();
    h.meeting.start(StartRequest::default()).unwrap();
    h.meeting.lock().unwrap();
    assert!(h.meeting.overlay().locked);
    assert_eq!(h.meeting.status(), MeetingStatus::InMeeting);

    h.native.clear_commands();
    h.meeting.lock().unwrap();
    assert!(h.native.commands().is_empty());
    h.meeting.unlock().unwrap();
    assert_eq!(
        h.native.last_command(),
        Some(Command::Meeting(MeetingCommand::Unlock))
    );
}

#[test]
fn repeated_mute_fires_one_callback() {
    let h = harness();
    h.native.add_user(guest(42, "Carol"));
    h.meeting.start(StartRequest::default()).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let video = h
        .meeting
        .video(VideoCallbacks {
            on_user_video_status: Some(handler(move |(id, status): (UserId, VideoStatus)| {
                sink.lock().unwrap().push((id, status));
            })),
            ..Default::default()
        })
        .unwrap();

    video.mute(42).unwrap();
    video.mute(42).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![(42, VideoStatus::Off)]);
    assert_eq!(video.mute(7), Err(SdkError::InvalidParameter));
}

#[test]
fn device_change_replaces_camera_list() {
    let h = harness();
    h.native.set_devices(
        DeviceKind::Camera,
        vec![DeviceInfo::new("old", "Old cam", true)],
    );
    let settings = h.sdk.settings().unwrap();
    assert_eq!(settings.cameras().unwrap().len(), 1);

    let fresh = vec![
        DeviceInfo::new("a", "Front", true),
        DeviceInfo::new("b", "Rear", false),
        DeviceInfo::new("c", "USB", false),
    ];
    h.native.set_devices(DeviceKind::Camera, fresh.clone());
    h.native.inject(NativeEvent::DeviceListChanged {
        kind: DeviceKind::Camera,
        devices: fresh.clone(),
    });
    assert_eq!(settings.cameras().unwrap(), fresh);

    settings.select_camera("c").unwrap();
    let selected: Vec<_> = settings
        .cameras()
        .unwrap()
        .into_iter()
        .filter(|d| d.is_selected)
        .map(|d| d.id)
        .collect();
    assert_eq!(selected, vec!["c".to_string()]);
}

#[test]
fn quality_is_unknown_while_idle() {
    let h = harness();
    assert_eq!(h.meeting.status(), MeetingStatus::Idle);
    let quality = h.meeting.video_quality();
    assert_eq!(quality, ConnectionQuality::Unknown);
    assert_eq!(quality.code(), 0);

    h.meeting.start(StartRequest::default()).unwrap();
    assert_eq!(h.meeting.video_quality(), ConnectionQuality::Good);
}

#[test]
fn password_prompt_is_single_use() {
    let h = harness();
    h.native.set_auto_progress(false);

    let prompts = Arc::new(Mutex::new(Vec::<PasswordPrompt>::new()));
    let sink = prompts.clone();
    h.meeting
        .configuration(ConfigCallbacks {
            on_password_required: Some(handler(move |prompt: PasswordPrompt| {
                sink.lock().unwrap().push(prompt);
            })),
            ..Default::default()
        })
        .unwrap();

    h.meeting
        .join(JoinRequest::by_number(123456789, "Alice"))
        .unwrap();
    h.native.inject(NativeEvent::PasswordAndScreenNameRequired(
        RequiredInfoType::Password4WrongPassword,
    ));
    h.native.inject(NativeEvent::PasswordAndScreenNameRequired(
        RequiredInfoType::Password,
    ));

    let (stale, current) = {
        let list = prompts.lock().unwrap();
        assert_eq!(list.len(), 2);
        (list[0].clone(), list[1].clone())
    };
    assert_eq!(
        stale.submit_password_and_screen_name("abc", ""),
        Err(SdkError::WrongUsage)
    );
    assert_eq!(current.submit_screen_name("Alice"), Err(SdkError::WrongUsage));
    assert_eq!(
        current.submit_password_and_screen_name("", ""),
        Err(SdkError::InvalidParameter)
    );

    current.submit_password_and_screen_name("abc", "").unwrap();
    assert!(!current.is_live());
    assert_eq!(current.cancel(), Err(SdkError::WrongUsage));

    let answered = h
        .native
        .commands()
        .into_iter()
        .filter(|c| matches!(c, Command::Config(ConfigCommand::InputPasswordAndScreenName { .. })))
        .count();
    assert_eq!(answered, 1);
}

#[test]
fn prompt_dies_with_its_session() {
    let h = harness();
    h.native.set_auto_progress(false);

    let prompts = Arc::new(Mutex::new(Vec::<WebinarRegistrationPrompt>::new()));
    let sink = prompts.clone();
    h.meeting
        .configuration(ConfigCallbacks {
            on_webinar_need_register: Some(handler(move |p: WebinarRegistrationPrompt| {
                sink.lock().unwrap().push(p);
            })),
            ..Default::default()
        })
        .unwrap();

    h.meeting
        .join(JoinRequest::by_number(123456789, "Alice"))
        .unwrap();
    h.native.inject(NativeEvent::WebinarNeedRegister {
        kind: WebinarNeedRegisterType::ByEmailAndDisplayName,
        url: None,
    });
    h.native.inject(NativeEvent::MeetingStatus {
        status: MeetingStatus::Failed,
        result: 4,
    });

    let prompt = prompts.lock().unwrap()[0].clone();
    assert_eq!(prompt.register_by_url(), Err(SdkError::WrongUsage));
    assert_eq!(
        prompt.submit_email_and_screen_name("alice@example.com", "Alice"),
        Err(SdkError::WrongUsage)
    );
    assert_eq!(h.meeting.status(), MeetingStatus::Failed);
    assert_eq!(h.meeting.session_id(), None);
}

#[test]
fn cleanup_force_ends_meeting() {
    let h = harness();
    let seen = record_statuses(&h.meeting);
    h.meeting.start(StartRequest::default()).unwrap();
    let ui = h.meeting.ui(Default::default()).unwrap();

    h.sdk.cleanup().unwrap();
    assert_eq!(seen.lock().unwrap().last(), Some(&MeetingStatus::Ended));
    assert_eq!(ui.back_to_meeting(), Err(SdkError::Uninitialize));
    assert_eq!(h.meeting.lock(), Err(SdkError::Uninitialize));
    assert_eq!(h.sdk.cleanup(), Err(SdkError::Uninitialize));

    // Events from the old generation go nowhere.
    assert!(!h.native.inject(NativeEvent::LogoutConfirmed));
}

#[tokio::test]
async fn wait_for_in_meeting() {
    let h = harness();
    h.native.set_auto_progress(false);
    h.meeting
        .join(JoinRequest::by_vanity("alice.room", "Alice"))
        .unwrap();

    let waiter = {
        let meeting = h.meeting.clone();
        tokio::spawn(async move {
            meeting
                .wait_for_status(MeetingStatus::InMeeting, Duration::from_secs(2))
                .await
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    h.native.inject(NativeEvent::MeetingStatus {
        status: MeetingStatus::InMeeting,
        result: 0,
    });

    let event = waiter.await.unwrap().expect("status observed");
    assert_eq!(event.status, MeetingStatus::InMeeting);
    assert!(
        h.meeting
            .wait_for_status(MeetingStatus::Ended, Duration::from_millis(10))
            .await
            .is_none()
    );
}

#[test]
fn web_uri_join_is_admitted_like_join() {
    let h = harness();
    assert_eq!(
        h.meeting.handle_web_uri("https://zoom.us/j/123"),
        Err(SdkError::InvalidParameter)
    );
    h.meeting
        .handle_web_uri("zoommtg://zoom.us/join?confno=123456789")
        .unwrap();
    assert_eq!(h.meeting.status(), MeetingStatus::InMeeting);
    assert_eq!(
        h.meeting.handle_web_uri("zoommtg://zoom.us/join?confno=1"),
        Err(SdkError::WrongUsage)
    );
}
