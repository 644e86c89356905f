//! Device and preference settings.
//!
//! Settings live outside any meeting: they only need an initialized SDK.
//! Device lists are cached on first read and replaced wholesale whenever
//! the native layer reports a change.

use std::sync::Arc;

use crate::catalogue::{EchoCancellationLevel, SettingTabPage};
use crate::devices::{DeviceInfo, DeviceKind, DeviceRegistry};
use crate::errors::{SdkError, SdkResult};
use crate::events::{CallbackSlot, Handler, NativeEvent};
use crate::native::{Command, NativeSdk, Position, SettingCommand, SettingToggle, VolumeEndpoint, WindowHandle};
use crate::sdk::Lifecycle;

pub const MAX_VOLUME: f32 = 255.0;

#[derive(Default)]
struct DeviceSlots {
    list_changed: CallbackSlot<Vec<DeviceInfo>>,
    /// `(device_id, device_name)`
    default_changed: CallbackSlot<(String, String)>,
}

pub(crate) struct SettingsInner {
    native: Arc<dyn NativeSdk>,
    life: Arc<Lifecycle>,
    devices: DeviceRegistry,
    cameras: DeviceSlots,
    microphones: DeviceSlots,
    speakers: DeviceSlots,
}

impl SettingsInner {
    pub(crate) fn new(native: Arc<dyn NativeSdk>, life: Arc<Lifecycle>) -> Self {
        Self {
            native,
            life,
            devices: DeviceRegistry::new(),
            cameras: DeviceSlots::default(),
            microphones: DeviceSlots::default(),
            speakers: DeviceSlots::default(),
        }
    }

    fn slots(&self, kind: DeviceKind) -> &DeviceSlots {
        match kind {
            DeviceKind::Camera => &self.cameras,
            DeviceKind::Microphone => &self.microphones,
            DeviceKind::Speaker => &self.speakers,
        }
    }

    pub(crate) fn handle_event(&self, event: NativeEvent) {
        match event {
            NativeEvent::DeviceListChanged { kind, devices } => {
                self.devices.replace(kind, devices.clone());
                self.slots(kind).list_changed.emit(devices);
            }
            NativeEvent::DefaultDeviceChanged {
                kind,
                device_id,
                device_name,
            } => {
                tracing::info!("default {kind:?} is now {device_name} ({device_id})");
                self.devices.mark_selected(kind, &device_id);
                self.slots(kind)
                    .default_changed
                    .emit((device_id, device_name));
            }
            other => tracing::debug!("not a settings event: {other:?}"),
        }
    }

    pub(crate) fn reset(&self) {
        self.devices.clear();
    }
}

/// Handle over device and preference settings.
#[derive(Clone)]
pub struct Settings {
    inner: Arc<SettingsInner>,
    generation: u64,
}

impl Settings {
    pub(crate) fn new(inner: Arc<SettingsInner>, generation: u64) -> Self {
        Self { inner, generation }
    }

    fn check(&self) -> SdkResult {
        self.inner.life.check(self.generation)
    }

    fn execute(&self, command: SettingCommand) -> SdkResult {
        tracing::debug!("setting command: {command:?}");
        self.inner.native.execute(Command::Setting(command))
    }

    /// Devices of one kind. Read from the native layer once, then kept in
    /// step by change notifications.
    pub fn devices(&self, kind: DeviceKind) -> SdkResult<Vec<DeviceInfo>> {
        self.check()?;
        let native = &self.inner.native;
        Ok(self.inner.devices.list_or_load(kind, || native.devices(kind)))
    }

    pub fn cameras(&self) -> SdkResult<Vec<DeviceInfo>> {
        self.devices(DeviceKind::Camera)
    }

    pub fn microphones(&self) -> SdkResult<Vec<DeviceInfo>> {
        self.devices(DeviceKind::Microphone)
    }

    pub fn speakers(&self) -> SdkResult<Vec<DeviceInfo>> {
        self.devices(DeviceKind::Speaker)
    }

    /// Make `device_id` the active device of its kind. Selecting the
    /// current device succeeds without a native call.
    pub fn select_device(&self, kind: DeviceKind, device_id: &str) -> SdkResult {
        let device_id = device_id.trim();
        if device_id.is_empty() {
            self.check()?;
            return Err(SdkError::InvalidParameter);
        }
        self.devices(kind)?;
        if self.inner.devices.check_selectable(kind, device_id)? {
            return Ok(());
        }
        self.execute(SettingCommand::SelectDevice {
            kind,
            device_id: device_id.to_string(),
        })?;
        self.inner.devices.mark_selected(kind, device_id);
        tracing::info!("{kind:?} {device_id} selected");
        Ok(())
    }

    pub fn select_camera(&self, device_id: &str) -> SdkResult {
        self.select_device(DeviceKind::Camera, device_id)
    }

    pub fn select_microphone(&self, device_id: &str) -> SdkResult {
        self.select_device(DeviceKind::Microphone, device_id)
    }

    pub fn select_speaker(&self, device_id: &str) -> SdkResult {
        self.select_device(DeviceKind::Speaker, device_id)
    }

    pub fn is_enabled(&self, toggle: SettingToggle) -> SdkResult<bool> {
        self.check()?;
        Ok(self.inner.native.toggle(toggle))
    }

    /// Switch a preference. Writing the current value is a no-op.
    ///
    /// Stereo audio needs the original microphone input enabled first, and
    /// GPU share acceleration needs OS support.
    pub fn enable(&self, toggle: SettingToggle, enabled: bool) -> SdkResult {
        self.check()?;
        let native = &self.inner.native;
        if native.toggle(toggle) == enabled {
            return Ok(());
        }
        if enabled {
            match toggle {
                SettingToggle::StereoAudio if !native.toggle(SettingToggle::MicOriginalInput) => {
                    tracing::warn!("stereo audio refused: original input is off");
                    return Err(SdkError::WrongUsage);
                }
                SettingToggle::AccelerateGpuWhenShare if !native.supports_gpu_share_acceleration() => {
                    return Err(SdkError::SettingOsDontSupport);
                }
                _ => {}
            }
        }
        self.execute(SettingCommand::SetToggle { toggle, enabled })
    }

    pub fn echo_cancellation_level(&self) -> SdkResult<EchoCancellationLevel> {
        self.check()?;
        Ok(self.inner.native.echo_cancellation_level())
    }

    pub fn set_echo_cancellation(&self, level: EchoCancellationLevel) -> SdkResult {
        if self.echo_cancellation_level()? == level {
            return Ok(());
        }
        self.execute(SettingCommand::SetEchoCancellation(level))
    }

    pub fn volume(&self, endpoint: VolumeEndpoint) -> SdkResult<f32> {
        self.check()?;
        Ok(self.inner.native.volume(endpoint))
    }

    /// Set microphone or speaker volume, `0.0..=255.0`.
    pub fn set_volume(&self, endpoint: VolumeEndpoint, level: f32) -> SdkResult {
        self.check()?;
        if !level.is_finite() || !(0.0..=MAX_VOLUME).contains(&level) {
            return Err(SdkError::InvalidParameter);
        }
        self.execute(SettingCommand::SetVolume { endpoint, level })
    }

    /// Open the settings dialog on `tab`, optionally parented to a hex
    /// window handle.
    pub fn show_dialog(&self, parent: Option<&str>, position: Position, tab: SettingTabPage) -> SdkResult {
        self.check()?;
        let parent = parent.map(WindowHandle::parse_hex).transpose()?;
        self.execute(SettingCommand::ShowDialog {
            parent,
            position,
            tab,
        })
    }

    pub fn hide_dialog(&self) -> SdkResult {
        self.check()?;
        self.execute(SettingCommand::HideDialog)
    }

    /// Replace the device-list handler for `kind`, returning the previous one.
    pub fn set_device_list_callback(
        &self,
        kind: DeviceKind,
        handler: Handler<Vec<DeviceInfo>>,
    ) -> Option<Handler<Vec<DeviceInfo>>> {
        self.inner.slots(kind).list_changed.replace(handler)
    }

    pub fn set_default_device_callback(
        &self,
        kind: DeviceKind,
        handler: Handler<(String, String)>,
    ) -> Option<Handler<(String, String)>> {
        self.inner.slots(kind).default_changed.replace(handler)
    }
}
