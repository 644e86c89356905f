use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::auth::{AuthInner, AuthSession, AuthState};
use crate::config::InitOptions;
use crate::errors::{SdkError, SdkResult};
use crate::events::{EventSink, NativeEvent};
use crate::meeting::{MeetingInner, MeetingSession};
use crate::native::NativeSdk;
use crate::settings::{Settings, SettingsInner};

/// Initialization state shared by every handle.
///
/// Handles remember the generation they were created in; `cleanup` bumps
/// it, so nothing obtained before a cleanup works after it, even once the
/// SDK is initialized again.
pub(crate) struct Lifecycle {
    initialized: AtomicBool,
    generation: AtomicU64,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            initialized: AtomicBool::new(false),
            generation: AtomicU64::new(1),
        }
    }

    pub(crate) fn current(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    pub(crate) fn check(&self, generation: u64) -> SdkResult {
        if self.is_initialized() && self.current() == generation {
            Ok(())
        } else {
            Err(SdkError::Uninitialize)
        }
    }

    fn open(&self) {
        self.initialized.store(true, Ordering::Release);
    }

    fn close(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.initialized.store(false, Ordering::Release);
    }
}

struct SdkCore {
    native: Arc<dyn NativeSdk>,
    life: Arc<Lifecycle>,
    auth: Arc<AuthInner>,
    meeting: Arc<MeetingInner>,
    settings: Arc<SettingsInner>,
}

/// Routes native events to the service that owns them.
///
/// Bound to one generation: events arriving after a cleanup are dropped.
struct Dispatcher {
    core: Weak<SdkCore>,
    generation: u64,
}

impl EventSink for Dispatcher {
    fn deliver(&self, event: NativeEvent) {
        let Some(core) = self.core.upgrade() else {
            return;
        };
        if core.life.check(self.generation).is_err() {
            tracing::debug!("event after cleanup dropped: {event:?}");
            return;
        }
        match event {
            NativeEvent::AuthResult(_)
            | NativeEvent::LogoutConfirmed
            | NativeEvent::IdentityExpired
            | NativeEvent::AuthIdentityExpiring
            | NativeEvent::LoginReturn { .. } => core.auth.handle_event(event),
            NativeEvent::DeviceListChanged { .. } | NativeEvent::DefaultDeviceChanged { .. } => {
                core.settings.handle_event(event)
            }
            other => {
                if !core.meeting.handle_event(other) {
                    tracing::debug!("unrouted native event");
                }
            }
        }
    }
}

/// Entry point: owns the native library and hands out service handles.
pub struct Sdk {
    core: Arc<SdkCore>,
}

impl Sdk {
    pub fn new(native: Arc<dyn NativeSdk>) -> Self {
        let life = Arc::new(Lifecycle::new());
        let core = SdkCore {
            auth: Arc::new(AuthInner::new(native.clone(), life.clone())),
            meeting: Arc::new(MeetingInner::new(native.clone(), life.clone())),
            settings: Arc::new(SettingsInner::new(native.clone(), life.clone())),
            native,
            life,
        };
        Self {
            core: Arc::new(core),
        }
    }

    /// Load and start the native library.
    ///
    /// Missing `path` or `domain` fails with `Uninitialize` before the
    /// library is touched. Whatever the library answers, including for a
    /// second initialization, is returned as is.
    pub fn initialize(&self, options: &InitOptions) -> SdkResult {
        options.validate()?;
        let sink = Arc::new(Dispatcher {
            core: Arc::downgrade(&self.core),
            generation: self.core.life.current(),
        });
        if let Err(e) = self.core.native.initialize(options, sink) {
            tracing::warn!("native initialize failed: {e}");
            return Err(e);
        }
        self.core.life.open();
        tracing::info!(
            "sdk initialized (native {}, generation {})",
            self.core.native.version(),
            self.core.life.current()
        );
        Ok(())
    }

    pub fn version(&self) -> String {
        self.core.native.version()
    }

    pub fn is_initialized(&self) -> bool {
        self.core.life.is_initialized()
    }

    /// Tear everything down. Any outstanding meeting is ended and every
    /// handle obtained so far stops working.
    pub fn cleanup(&self) -> SdkResult {
        if !self.core.life.is_initialized() {
            return Err(SdkError::Uninitialize);
        }
        self.core.meeting.force_end();
        self.core.auth.reset();
        self.core.settings.reset();
        self.core.life.close();
        tracing::info!("sdk cleaned up");
        self.core.native.cleanup()
    }

    pub fn auth(&self) -> SdkResult<AuthSession> {
        let generation = self.core.life.current();
        self.core.life.check(generation)?;
        Ok(AuthSession::new(self.core.auth.clone(), generation))
    }

    /// The meeting service. Requires a successful authentication.
    pub fn meeting(&self) -> SdkResult<MeetingSession> {
        let generation = self.core.life.current();
        self.core.life.check(generation)?;
        if self.core.auth.state() != AuthState::Success {
            return Err(SdkError::Unauthentication);
        }
        Ok(MeetingSession::new(self.core.meeting.clone(), generation))
    }

    pub fn settings(&self) -> SdkResult<Settings> {
        let generation = self.core.life.current();
        self.core.life.check(generation)?;
        Ok(Settings::new(self.core.settings.clone(), generation))
    }
}
