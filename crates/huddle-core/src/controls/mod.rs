//! Meeting sub-controllers.
//!
//! Every controller carries a [`Capability`] captured when it was obtained.
//! The capability becomes usable when that meeting is entered and dies
//! with it; afterwards every operation fails with `Uninitialize`.

mod audio;
mod configuration;
mod participants;
mod share;
mod ui;
mod video;

pub use audio::{AudioCallbacks, AudioController};
pub use configuration::{ConfigCallbacks, ConfigurationController};
pub use participants::{ParticipantsCallbacks, ParticipantsController};
pub use share::{ShareCallbacks, ShareController};
pub use ui::{UiCallbacks, UiController};
pub use video::{VideoCallbacks, VideoController};

pub(crate) use audio::AudioHub;
pub(crate) use configuration::ConfigHub;
pub(crate) use participants::ParticipantsHub;
pub(crate) use share::ShareHub;
pub(crate) use ui::UiHub;
pub(crate) use video::VideoHub;

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use crate::errors::{SdkError, SdkResult};
use crate::events::{UserId, UserInfo};
use crate::meeting::SessionScope;
use crate::native::NativeSdk;
use crate::sdk::Lifecycle;

#[derive(Clone)]
pub(crate) struct Capability {
    life: Arc<Lifecycle>,
    generation: u64,
    scope: Arc<SessionScope>,
}

impl Capability {
    pub(crate) fn new(life: Arc<Lifecycle>, generation: u64, scope: Arc<SessionScope>) -> Self {
        Self {
            life,
            generation,
            scope,
        }
    }

    pub(crate) fn check(&self) -> SdkResult {
        self.life.check(self.generation)?;
        if self.scope.is_active() {
            Ok(())
        } else {
            tracing::debug!("call through inactive session scope {}", self.scope.id());
            Err(SdkError::Uninitialize)
        }
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.check().is_ok()
    }
}

/// Look up a participant; `0` is the local user.
pub(crate) fn resolve_user(native: &dyn NativeSdk, user_id: UserId) -> SdkResult<UserInfo> {
    native.user_info(user_id).ok_or(SdkError::InvalidParameter)
}

/// Last value written for each switch, so repeated writes of the same
/// state do not reach the native layer.
pub(crate) struct ToggleCache<K> {
    values: Mutex<HashMap<K, bool>>,
}

impl<K: Eq + Hash + Copy> ToggleCache<K> {
    pub(crate) fn is_current(&self, key: K, value: bool) -> bool {
        self.lock().get(&key) == Some(&value)
    }

    pub(crate) fn record(&self, key: K, value: bool) {
        self.lock().insert(key, value);
    }

    pub(crate) fn clear(&self) {
        self.lock().clear();
    }

    /// Apply `write` unless `value` is already current; record on success.
    pub(crate) fn set_with(&self, key: K, value: bool, write: impl FnOnce() -> SdkResult) -> SdkResult {
        if self.is_current(key, value) {
            return Ok(());
        }
        write()?;
        self.record(key, value);
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<K, bool>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K> Default for ToggleCache<K> {
    fn default() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
        }
    }
}
