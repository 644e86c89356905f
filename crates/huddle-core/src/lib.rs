//! Huddle core: a typed facade over a callback-driven conferencing SDK.
//!
//! The native library sits behind [`NativeSdk`]. Every mutating call
//! returns an [`SdkResult`] straight away; outcomes arrive later through
//! single-slot callbacks registered on the owning handle. Handles carry the
//! lifetime of what produced them and answer `Uninitialize` once that is
//! gone.
//!
//! [`LoopbackSdk`] is an in-process engine for tests and headless hosts.

pub mod auth;
pub mod catalogue;
pub mod config;
pub mod controls;
pub mod devices;
pub mod errors;
pub mod events;
pub mod loopback;
pub mod meeting;
pub mod native;
pub mod prompts;
pub mod sdk;
pub mod settings;

#[cfg(feature = "logging")]
mod logging;

pub use auth::{AuthSession, AuthState, AuthTicket};
pub use config::InitOptions;
pub use controls::{
    AudioCallbacks, AudioController, ConfigCallbacks, ConfigurationController,
    ParticipantsCallbacks, ParticipantsController, ShareCallbacks, ShareController, UiCallbacks,
    UiController, VideoCallbacks, VideoController,
};
pub use devices::{DeviceInfo, DeviceKind};
pub use errors::{ConfigError, ErrorClass, SdkError, SdkResult, result_code};
pub use events::{CallbackSlot, Handler, NativeEvent, SELF_USER, StatusEvent, StatusReason, UserId, UserInfo, handler};
pub use loopback::LoopbackSdk;
pub use meeting::{
    JoinRequest, JoinWithoutLoginRequest, MediaOptions, MeetingInfo, MeetingOverlay,
    MeetingSession, MeetingTarget, StartRequest, StartWithoutLoginRequest,
};
pub use native::{Command, NativeSdk, Secret, WindowHandle};
pub use prompts::{PasswordPrompt, WebinarRegistrationPrompt};
pub use sdk::Sdk;
pub use settings::Settings;

#[cfg(feature = "logging")]
pub use logging::init_logging;
