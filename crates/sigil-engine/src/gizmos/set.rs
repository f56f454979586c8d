use std::any::TypeId;
use std::collections::{HashMap, HashSet};

use super::{
    DefaultGizmoConfigGroup, GizmoConfig, GizmoConfigGroup, GizmoConfigStore, GizmoStorage,
    Gizmos,
};

/// Gizmo data of one group, ready for rendering.
#[derive(Debug, Clone)]
pub struct GizmoBatch {
    pub group: TypeId,
    pub config: GizmoConfig,
    pub storage: GizmoStorage,
}

impl GizmoBatch {
    /// Returns `true` if this batch was recorded through group `T`.
    pub fn is<T: GizmoConfigGroup>(&self) -> bool {
        self.group == TypeId::of::<T>()
    }
}

/// Per-frame gizmo recorder: group configs plus one storage per group.
///
/// Typical frame:
/// 1. `set.gizmos::<MyGroup>().line(..)` from anywhere that holds the set
/// 2. `set.take_batches()` right before rendering
/// 3. `set.recycle(batches)` once the batches are uploaded
pub struct GizmoSet {
    store: GizmoConfigStore,
    storages: HashMap<TypeId, GizmoStorage>,
    /// Cleared storages handed back through [`GizmoSet::recycle`].
    spare: Vec<GizmoStorage>,
    warned_invalid: HashSet<TypeId>,
}

impl Default for GizmoSet {
    fn default() -> Self {
        Self::new()
    }
}

impl GizmoSet {
    /// Creates a set with [`DefaultGizmoConfigGroup`] registered.
    pub fn new() -> Self {
        let mut set = Self {
            store: GizmoConfigStore::new(),
            storages: HashMap::new(),
            spare: Vec::new(),
            warned_invalid: HashSet::new(),
        };
        set.init_group::<DefaultGizmoConfigGroup>();
        set
    }

    /// Registers `T` with default settings if it is not registered yet.
    pub fn init_group<T: GizmoConfigGroup + Default>(&mut self) {
        self.store.register::<T>();
        self.storages.entry(TypeId::of::<T>()).or_default();
    }

    /// Registers `T` (or replaces its settings) with an explicit config.
    pub fn insert_group<T: GizmoConfigGroup>(&mut self, group: T, config: GizmoConfig) {
        self.store.insert(config, group);
        self.storages.entry(TypeId::of::<T>()).or_default();
        self.warned_invalid.remove(&TypeId::of::<T>());
    }

    /// Drawing handle for group `T`, registering it on first use.
    pub fn gizmos<T: GizmoConfigGroup + Default>(&mut self) -> Gizmos<'_> {
        self.init_group::<T>();
        let enabled = self
            .store
            .config::<T>()
            .map(|(config, _)| config.enabled)
            .unwrap_or(false);
        let storage = self.storages.entry(TypeId::of::<T>()).or_default();
        Gizmos::new(storage, enabled)
    }

    pub fn config_store(&self) -> &GizmoConfigStore {
        &self.store
    }

    pub fn config_store_mut(&mut self) -> &mut GizmoConfigStore {
        &mut self.store
    }

    /// Drains every group's recorded data into batches, in registration
    /// order. Disabled, empty or invalid groups produce no batch; their data
    /// is discarded. An invalid config is reported once per group.
    ///
    /// Each drained storage is replaced by a recycled one when available.
    pub fn take_batches(&mut self) -> Vec<GizmoBatch> {
        let mut batches = Vec::new();
        for (group, config) in self.store.iter() {
            let Some(storage) = self.storages.get_mut(&group) else {
                continue;
            };
            if !config.enabled || storage.is_empty() {
                storage.clear();
                continue;
            }

            if let Err(err) = config.validate() {
                if self.warned_invalid.insert(group) {
                    log::warn!(
                        "gizmo group {} skipped: {err}",
                        self.store.group_name(&group).unwrap_or("<unknown>")
                    );
                }
                storage.clear();
                continue;
            }

            let fresh = self.spare.pop().unwrap_or_default();
            batches.push(GizmoBatch {
                group,
                config: *config,
                storage: std::mem::replace(storage, fresh),
            });
        }
        batches
    }

    /// Returns the storages of rendered batches so their allocations are
    /// reused by later frames.
    pub fn recycle(&mut self, batches: Vec<GizmoBatch>) {
        self.spare.extend(batches.into_iter().map(|mut batch| {
            batch.storage.clear();
            batch.storage
        }));
    }

    /// Discards everything recorded this frame.
    pub fn clear(&mut self) {
        self.storages.values_mut().for_each(GizmoStorage::clear);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::palette::{RED, WHITE};
    use glam::Vec3;

    #[derive(Default)]
    struct Overlay;
    impl GizmoConfigGroup for Overlay {}

    #[test]
    fn batches_follow_registration_order() {
        let mut set = GizmoSet::new();
        set.init_group::<Overlay>();

        set.gizmos::<Overlay>().line(Vec3::ZERO, Vec3::X, RED);
        set.gizmos::<DefaultGizmoConfigGroup>().line(Vec3::ZERO, Vec3::Y, WHITE);

        let batches = set.take_batches();
        assert_eq!(batches.len(), 2);
        assert!(batches[0].is::<DefaultGizmoConfigGroup>());
        assert!(batches[1].is::<Overlay>());
    }

    #[test]
    fn take_batches_drains_storage() {
        let mut set = GizmoSet::new();
        set.gizmos::<DefaultGizmoConfigGroup>().billboard(Vec3::ONE, RED);
        assert_eq!(set.take_batches().len(), 1);
        assert!(set.take_batches().is_empty());
    }

    #[test]
    fn disabled_group_is_skipped() {
        let mut set = GizmoSet::new();
        set.insert_group(Overlay, GizmoConfig { enabled: false, ..Default::default() });
        set.gizmos::<Overlay>().line(Vec3::ZERO, Vec3::X, RED);
        assert!(set.take_batches().is_empty());
    }

    #[test]
    fn disabling_after_recording_discards_data() {
        let mut set = GizmoSet::new();
        set.gizmos::<DefaultGizmoConfigGroup>().line(Vec3::ZERO, Vec3::X, RED);
        set.config_store_mut()
            .config_mut::<DefaultGizmoConfigGroup>()
            .unwrap()
            .0
            .enabled = false;
        assert!(set.take_batches().is_empty());

        set.config_store_mut()
            .config_mut::<DefaultGizmoConfigGroup>()
            .unwrap()
            .0
            .enabled = true;
        assert!(set.take_batches().is_empty());
    }

    #[test]
    fn batch_carries_group_config() {
        let mut set = GizmoSet::new();
        set.insert_group(Overlay, GizmoConfig::default().with_depth_bias(-1.0));
        set.gizmos::<Overlay>().line(Vec3::ZERO, Vec3::X, RED);
        let batches = set.take_batches();
        assert_eq!(batches[0].config.depth_bias, -1.0);
        assert_eq!(batches[0].storage.list_segment_count(), 1);
    }

    #[test]
    fn gizmos_registers_unknown_group() {
        let mut set = GizmoSet::new();
        assert!(!set.config_store().contains::<Overlay>());
        set.gizmos::<Overlay>();
        assert!(set.config_store().contains::<Overlay>());
    }

    #[test]
    fn invalid_group_is_skipped_and_drained() {
        let mut set = GizmoSet::new();
        set.insert_group(Overlay, GizmoConfig { line_width: -5.0, ..Default::default() });
        set.gizmos::<Overlay>().line(Vec3::ZERO, Vec3::X, RED);
        set.gizmos::<DefaultGizmoConfigGroup>().line(Vec3::ZERO, Vec3::Y, WHITE);

        let batches = set.take_batches();
        assert_eq!(batches.len(), 1);
        assert!(batches[0].is::<DefaultGizmoConfigGroup>());
        assert!(set.storages[&TypeId::of::<Overlay>()].is_empty());
        assert!(set.warned_invalid.contains(&TypeId::of::<Overlay>()));

        set.insert_group(Overlay, GizmoConfig::default());
        set.gizmos::<Overlay>().line(Vec3::ZERO, Vec3::X, RED);
        assert_eq!(set.take_batches().len(), 1);
    }

    #[test]
    fn recycled_storage_keeps_its_allocation() {
        let mut set = GizmoSet::new();
        let group = TypeId::of::<DefaultGizmoConfigGroup>();
        for _ in 0..64 {
            set.gizmos::<DefaultGizmoConfigGroup>().line(Vec3::ZERO, Vec3::X, RED);
        }
        let batches = set.take_batches();
        let capacity = batches[0].storage.list_positions.capacity();
        assert!(capacity >= 128);
        set.recycle(batches);
        assert_eq!(set.spare.len(), 1);
        assert!(set.spare[0].is_empty());

        set.gizmos::<DefaultGizmoConfigGroup>().line(Vec3::ZERO, Vec3::X, RED);
        let batches = set.take_batches();
        assert!(set.spare.is_empty());
        assert!(set.storages[&group].is_empty());
        assert_eq!(set.storages[&group].list_positions.capacity(), capacity);
        set.recycle(batches);
    }

    #[test]
    fn clear_discards_recorded_data() {
        let mut set = GizmoSet::new();
        set.gizmos::<DefaultGizmoConfigGroup>().line(Vec3::ZERO, Vec3::X, RED);
        set.clear();
        assert!(set.take_batches().is_empty());
    }
}
