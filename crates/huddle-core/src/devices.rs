use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::errors::{SdkError, SdkResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceKind {
    Camera,
    Microphone,
    Speaker,
}

/// One audio or video endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: String,
    pub name: String,
    pub is_selected: bool,
}

impl DeviceInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>, is_selected: bool) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_selected,
        }
    }
}

/// Cached device lists, one per kind.
///
/// Lists are only ever swapped wholesale; a change notification replaces
/// everything known about that kind.
#[derive(Default)]
pub struct DeviceRegistry {
    lists: Mutex<HashMap<DeviceKind, Vec<DeviceInfo>>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&self, kind: DeviceKind, devices: Vec<DeviceInfo>) {
        tracing::debug!("{kind:?} list replaced ({} devices)", devices.len());
        self.lock().insert(kind, devices);
    }

    /// Cached list, or `None` if this kind was never enumerated.
    pub fn cached(&self, kind: DeviceKind) -> Option<Vec<DeviceInfo>> {
        self.lock().get(&kind).cloned()
    }

    /// Cached list, populating it through `load` on first use.
    pub fn list_or_load(
        &self,
        kind: DeviceKind,
        load: impl FnOnce() -> Vec<DeviceInfo>,
    ) -> Vec<DeviceInfo> {
        if let Some(list) = self.cached(kind) {
            return list;
        }
        let list = load();
        self.lock().entry(kind).or_insert(list).clone()
    }

    /// Check that `id` names a known device. Returns `true` if it is already
    /// the selected one.
    pub fn check_selectable(&self, kind: DeviceKind, id: &str) -> SdkResult<bool> {
        let lists = self.lock();
        let device = lists
            .get(&kind)
            .and_then(|list| list.iter().find(|d| d.id == id))
            .ok_or(SdkError::InvalidParameter)?;
        Ok(device.is_selected)
    }

    /// Mark `id` selected and every other device of that kind unselected.
    pub fn mark_selected(&self, kind: DeviceKind, id: &str) {
        if let Some(list) = self.lock().get_mut(&kind) {
            for device in list.iter_mut() {
                device.is_selected = device.id == id;
            }
        }
    }

    /// Forget every list.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<DeviceKind, Vec<DeviceInfo>>> {
        self.lists.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cams() -> Vec<DeviceInfo> {
        vec![
            DeviceInfo::new("cam-a", "Front", true),
            DeviceInfo::new("cam-b", "USB", false),
        ]
    }

    #[test]
    fn replace_discards_previous_entries() {
        let reg = DeviceRegistry::new();
        reg.replace(DeviceKind::Camera, cams());
        reg.replace(DeviceKind::Camera, vec![DeviceInfo::new("cam-c", "Dock", false)]);

        let list = reg.cached(DeviceKind::Camera).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "cam-c");
    }

    #[test]
    fn load_runs_once() {
        let reg = DeviceRegistry::new();
        assert_eq!(reg.list_or_load(DeviceKind::Microphone, Vec::new).len(), 0);
        let list = reg.list_or_load(DeviceKind::Microphone, || panic!("cached list expected"));
        assert!(list.is_empty());
    }

    #[test]
    fn select_is_exclusive() {
        let reg = DeviceRegistry::new();
        reg.replace(DeviceKind::Camera, cams());

        assert_eq!(reg.check_selectable(DeviceKind::Camera, "cam-b"), Ok(false));
        reg.mark_selected(DeviceKind::Camera, "cam-b");

        let list = reg.cached(DeviceKind::Camera).unwrap();
        let selected: Vec<_> = list.iter().filter(|d| d.is_selected).map(|d| d.id.as_str()).collect();
        assert_eq!(selected, vec!["cam-b"]);
        assert_eq!(reg.check_selectable(DeviceKind::Camera, "cam-b"), Ok(true));
    }

    #[test]
    fn unknown_device_is_invalid() {
        let reg = DeviceRegistry::new();
        assert_eq!(
            reg.check_selectable(DeviceKind::Speaker, "nope"),
            Err(SdkError::InvalidParameter)
        );
        reg.replace(DeviceKind::Speaker, vec![DeviceInfo::new("spk", "Speakers", true)]);
        assert_eq!(
            reg.check_selectable(DeviceKind::Speaker, "nope"),
            Err(SdkError::InvalidParameter)
        );
    }
}
