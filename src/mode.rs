//! Resolving and updating the monitor set of a display mode.

use log::debug;

use crate::types::{CustomModeConfig, LiveMonitors, ModeMonitors, MonitorConfig, ScreenConfig};

/// Multi-monitor arrangement a monitor set belongs to.
///
/// The single-monitor case is not a mode: it has no set and is reached
/// through [`ScreenConfig::monitor`] instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayMode {
    Custom(String),
    Mirror,
    Extend,
    OnlyOne,
}

/// What to do with existing custom profiles when a new profile name is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NewProfilePolicy {
    /// The new profile becomes the only custom profile.
    #[default]
    ReplaceAll,
    /// The new profile is added after the existing ones.
    Append,
}

impl ScreenConfig {
    /// Monitor set stored for `mode`, empty when nothing was stored yet.
    pub fn monitor_set(&self, mode: &DisplayMode) -> &[MonitorConfig] {
        let set = match mode {
            DisplayMode::Custom(name) => self
                .custom
                .iter()
                .find(|custom| &custom.name == name)
                .map(|custom| &custom.monitors),
            DisplayMode::Mirror => self.mirror.as_ref().map(|m| &m.monitors),
            DisplayMode::Extend => self.extend.as_ref().map(|m| &m.monitors),
            DisplayMode::OnlyOne => self.only_one.as_ref().map(|m| &m.monitors),
        };
        set.map(Vec::as_slice).unwrap_or_default()
    }

    /// Mutable monitor set stored for `mode`, if any.
    pub fn monitor_set_mut(&mut self, mode: &DisplayMode) -> Option<&mut Vec<MonitorConfig>> {
        match mode {
            DisplayMode::Custom(name) => self
                .custom
                .iter_mut()
                .find(|custom| &custom.name == name)
                .map(|custom| &mut custom.monitors),
            DisplayMode::Mirror => self.mirror.as_mut().map(|m| &mut m.monitors),
            DisplayMode::Extend => self.extend.as_mut().map(|m| &mut m.monitors),
            DisplayMode::OnlyOne => self.only_one.as_mut().map(|m| &mut m.monitors),
        }
    }

    /// Stored monitor with `uuid` in the set of `mode`.
    ///
    /// A single-monitor screen always answers with its `single` entry, the
    /// mode and UUID are not consulted.
    pub fn monitor(&self, single: bool, mode: &DisplayMode, uuid: &str) -> Option<&MonitorConfig> {
        if single {
            return self.single.as_ref();
        }
        monitor_by_uuid(self.monitor_set(mode), uuid)
    }

    pub fn custom_names(&self) -> impl Iterator<Item = &str> {
        self.custom.iter().map(|custom| custom.name.as_str())
    }

    /// Replaces the monitor set of `mode`.
    ///
    /// Storing a custom profile under a name that does not exist yet drops
    /// every other custom profile; see [`ScreenConfig::set_monitor_set_with`].
    pub fn set_monitor_set(&mut self, mode: &DisplayMode, configs: Vec<MonitorConfig>) {
        self.set_monitor_set_with(mode, configs, NewProfilePolicy::ReplaceAll);
    }

    pub fn set_monitor_set_with(
        &mut self,
        mode: &DisplayMode,
        configs: Vec<MonitorConfig>,
        policy: NewProfilePolicy,
    ) {
        match mode {
            DisplayMode::Custom(name) => {
                if let Some(custom) = self.custom.iter_mut().find(|c| &c.name == name) {
                    custom.monitors = configs;
                    return;
                }

                let custom = CustomModeConfig {
                    name: name.clone(),
                    monitors: configs,
                };
                match policy {
                    NewProfilePolicy::ReplaceAll => {
                        if !self.custom.is_empty() {
                            debug!(
                                "New custom profile {name:?} replaces {} stored profile(s)",
                                self.custom.len()
                            );
                        }
                        self.custom = vec![custom];
                    }
                    NewProfilePolicy::Append => self.custom.push(custom),
                }
            }
            DisplayMode::Mirror => {
                self.mirror.get_or_insert_with(ModeMonitors::default).monitors = configs;
            }
            DisplayMode::Extend => {
                self.extend.get_or_insert_with(ModeMonitors::default).monitors = configs;
            }
            DisplayMode::OnlyOne => self.merge_only_one(configs),
        }
    }

    /// Stores a proposed only-one set, keeping the last known mode of
    /// monitors that are now disabled.
    ///
    /// Disabled entries take width, height, refresh rate, rotation and
    /// reflection from the stored entry with the same UUID. Disabled entries
    /// without a stored entry are dropped. X and Y stay as proposed.
    pub fn merge_only_one(&mut self, proposed: Vec<MonitorConfig>) {
        let container = self.only_one.get_or_insert_with(ModeMonitors::default);
        let old = std::mem::take(&mut container.monitors);

        container.monitors = proposed
            .into_iter()
            .filter_map(|mut cfg| {
                if cfg.enabled {
                    return Some(cfg);
                }
                let Some(prev) = monitor_by_uuid(&old, &cfg.uuid) else {
                    debug!("Dropping disabled monitor {} without stored mode", cfg.uuid);
                    return None;
                };
                cfg.width = prev.width;
                cfg.height = prev.height;
                cfg.refresh_rate = prev.refresh_rate;
                cfg.rotation = prev.rotation;
                cfg.reflect = prev.reflect;
                Some(cfg)
            })
            .collect();
    }

    /// Refreshes stored names in every set of this screen.
    pub fn sync_names(&mut self, live: &LiveMonitors) {
        for custom in self.custom.iter_mut() {
            sync_names(&mut custom.monitors, live);
        }
        for container in [&mut self.mirror, &mut self.extend, &mut self.only_one]
            .into_iter()
            .flatten()
        {
            sync_names(&mut container.monitors, live);
        }
        if let Some(single) = self.single.as_mut() {
            sync_names(std::slice::from_mut(single), live);
        }
    }
}

pub fn monitor_by_uuid<'a>(configs: &'a [MonitorConfig], uuid: &str) -> Option<&'a MonitorConfig> {
    configs.iter().find(|cfg| cfg.uuid == uuid)
}

/// Makes the monitor with `uuid` the only primary one of `configs`.
///
/// Every other entry loses its primary flag, also when `uuid` is not part
/// of the set.
pub fn set_primary(configs: &mut [MonitorConfig], uuid: &str) {
    for cfg in configs {
        cfg.primary = cfg.uuid == uuid;
    }
}

/// Copies the current output name of each live monitor into stored configs.
pub fn sync_names(configs: &mut [MonitorConfig], live: &LiveMonitors) {
    for cfg in configs {
        if let Some(mon) = live.values().find(|mon| mon.uuid == cfg.uuid) {
            cfg.name = mon.name.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LiveMonitor;

    fn monitor(uuid: &str, enabled: bool) -> MonitorConfig {
        MonitorConfig {
            uuid: uuid.to_string(),
            name: format!("out-{uuid}"),
            enabled,
            ..Default::default()
        }
    }

    fn sized(uuid: &str, width: u16, height: u16) -> MonitorConfig {
        MonitorConfig {
            width,
            height,
            refresh_rate: 60.0,
            rotation: crate::types::ROTATION_90,
            reflect: crate::types::REFLECT_Y,
            x: 1920,
            y: 0,
            ..monitor(uuid, true)
        }
    }

    fn live(output: &str, uuid: &str) -> (String, LiveMonitor) {
        (
            output.to_string(),
            LiveMonitor {
                uuid: uuid.to_string(),
                name: output.to_string(),
                make: String::new(),
                model: String::new(),
                serial: String::new(),
                enabled: true,
                x: 0,
                y: 0,
                width: 1920,
                height: 1080,
                refresh_rate: 60.0,
                transform: 0,
            },
        )
    }

    fn custom(name: &str) -> DisplayMode {
        DisplayMode::Custom(name.to_string())
    }

    #[test]
    fn unset_modes_are_empty() {
        let screen = ScreenConfig::default();
        for mode in [
            custom("laptop+dock"),
            DisplayMode::Mirror,
            DisplayMode::Extend,
            DisplayMode::OnlyOne,
        ] {
            assert!(screen.monitor_set(&mode).is_empty(), "{mode:?}");
            assert_eq!(screen.monitor(false, &mode, "A"), None);
        }
    }

    #[test]
    fn custom_lookup_by_name() {
        let mut screen = ScreenConfig::default();
        screen.custom.push(CustomModeConfig {
            name: "laptop+dock".to_string(),
            monitors: vec![monitor("A", true), monitor("B", true)],
        });

        let set = screen.monitor_set(&custom("laptop+dock"));
        assert_eq!(set.len(), 2);
        assert_eq!(set[1].uuid, "B");
        assert!(screen.monitor_set(&custom("other")).is_empty());
    }

    #[test]
    fn monitor_by_mode_and_uuid() {
        let mut screen = ScreenConfig::default();
        screen.set_monitor_set(&DisplayMode::Extend, vec![monitor("A", true), monitor("B", true)]);

        let found = screen.monitor(false, &DisplayMode::Extend, "B").unwrap();
        assert_eq!(found.name, "out-B");
        assert_eq!(screen.monitor(false, &DisplayMode::Extend, "C"), None);
        assert_eq!(screen.monitor(false, &DisplayMode::Mirror, "A"), None);
    }

    #[test]
    fn single_screen_ignores_mode_and_uuid() {
        let mut screen = ScreenConfig::default();
        screen.set_monitor_set(&DisplayMode::Extend, vec![monitor("A", true)]);
        assert_eq!(screen.monitor(true, &DisplayMode::Extend, "A"), None);

        screen.single = Some(monitor("S", true));
        assert_eq!(screen.monitor(true, &DisplayMode::Extend, "A").unwrap().uuid, "S");
        assert_eq!(screen.monitor(true, &custom("nope"), "nope").unwrap().uuid, "S");
    }

    #[test]
    fn mirror_and_extend_are_created_on_first_write() {
        let mut screen = ScreenConfig::default();
        screen.set_monitor_set(&DisplayMode::Mirror, vec![monitor("A", true)]);
        assert!(screen.extend.is_none());
        assert_eq!(screen.mirror.as_ref().unwrap().monitors.len(), 1);

        screen.set_monitor_set(&DisplayMode::Mirror, vec![monitor("B", true), monitor("C", true)]);
        let uuids: Vec<_> = screen
            .monitor_set(&DisplayMode::Mirror)
            .iter()
            .map(|m| m.uuid.as_str())
            .collect();
        assert_eq!(uuids, ["B", "C"]);
    }

    #[test]
    fn existing_custom_profile_is_replaced_in_place() {
        let mut screen = ScreenConfig::default();
        screen.set_monitor_set_with(&custom("a"), vec![monitor("A", true)], NewProfilePolicy::Append);
        screen.set_monitor_set_with(&custom("b"), vec![monitor("B", true)], NewProfilePolicy::Append);

        screen.set_monitor_set(&custom("a"), vec![monitor("C", true)]);
        assert_eq!(screen.custom_names().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(screen.monitor_set(&custom("a"))[0].uuid, "C");
    }

    #[test]
    fn new_custom_profile_replaces_all_profiles_by_default() {
        let mut screen = ScreenConfig::default();
        screen.set_monitor_set(&custom("home"), vec![monitor("A", true)]);
        screen.set_monitor_set(&custom("office"), vec![monitor("B", true)]);

        assert_eq!(screen.custom_names().collect::<Vec<_>>(), ["office"]);
        assert!(screen.monitor_set(&custom("home")).is_empty());
    }

    #[test]
    fn new_custom_profile_can_be_appended() {
        let mut screen = ScreenConfig::default();
        screen.set_monitor_set(&custom("home"), vec![monitor("A", true)]);
        screen.set_monitor_set_with(
            &custom("office"),
            vec![monitor("B", true)],
            NewProfilePolicy::Append,
        );

        assert_eq!(screen.custom_names().collect::<Vec<_>>(), ["home", "office"]);
        assert_eq!(screen.monitor_set(&custom("home"))[0].uuid, "A");
    }

    #[test]
    fn only_one_restores_mode_of_disabled_monitor() {
        let mut screen = ScreenConfig::default();
        screen.set_monitor_set(&DisplayMode::OnlyOne, vec![sized("A", 1920, 1080)]);

        screen.set_monitor_set(&DisplayMode::OnlyOne, vec![monitor("A", false)]);

        let merged = screen.monitor_set(&DisplayMode::OnlyOne);
        assert_eq!(merged.len(), 1);
        let a = &merged[0];
        assert!(!a.enabled);
        assert_eq!((a.width, a.height), (1920, 1080));
        assert_eq!(a.refresh_rate, 60.0);
        assert_eq!(a.rotation, crate::types::ROTATION_90);
        assert_eq!(a.reflect, crate::types::REFLECT_Y);
        assert_eq!((a.x, a.y), (0, 0));
    }

    #[test]
    fn only_one_drops_unknown_disabled_monitor() {
        let mut screen = ScreenConfig::default();
        screen.set_monitor_set(&DisplayMode::OnlyOne, vec![monitor("B", false)]);
        assert!(screen.monitor_set(&DisplayMode::OnlyOne).is_empty());
        assert!(screen.only_one.is_some());
    }

    #[test]
    fn only_one_follows_proposed_order() {
        let mut screen = ScreenConfig::default();
        screen.set_monitor_set(
            &DisplayMode::OnlyOne,
            vec![sized("A", 1920, 1080), sized("B", 2560, 1440)],
        );

        let enabled_c = sized("C", 800, 600);
        screen.set_monitor_set(
            &DisplayMode::OnlyOne,
            vec![monitor("B", false), enabled_c.clone(), monitor("X", false), monitor("A", false)],
        );

        let merged = screen.monitor_set(&DisplayMode::OnlyOne);
        let uuids: Vec<_> = merged.iter().map(|m| m.uuid.as_str()).collect();
        assert_eq!(uuids, ["B", "C", "A"]);
        assert_eq!((merged[0].width, merged[0].height), (2560, 1440));
        assert_eq!(merged[1], enabled_c);
    }

    #[test]
    fn only_one_forgets_monitors_missing_from_proposal() {
        let mut screen = ScreenConfig::default();
        screen.set_monitor_set(&DisplayMode::OnlyOne, vec![sized("A", 1920, 1080)]);
        screen.set_monitor_set(&DisplayMode::OnlyOne, vec![sized("B", 1280, 1024)]);
        screen.set_monitor_set(&DisplayMode::OnlyOne, vec![monitor("A", false)]);
        assert!(screen.monitor_set(&DisplayMode::OnlyOne).is_empty());
    }

    #[test]
    fn primary_is_exclusive() {
        let mut set = vec![monitor("A", true), monitor("B", true), monitor("C", true)];
        set[0].primary = true;
        set[2].primary = true;

        set_primary(&mut set, "B");
        let primaries: Vec<_> = set.iter().filter(|m| m.primary).map(|m| m.uuid.as_str()).collect();
        assert_eq!(primaries, ["B"]);
    }

    #[test]
    fn primary_with_unknown_uuid_clears_all() {
        let mut set = vec![monitor("A", true), monitor("B", true)];
        set[0].primary = true;

        set_primary(&mut set, "Z");
        assert!(set.iter().all(|m| !m.primary));
    }

    #[test]
    fn primary_through_resolved_set() {
        let mut screen = ScreenConfig::default();
        screen.set_monitor_set(&custom("dock"), vec![monitor("A", true), monitor("B", true)]);

        set_primary(screen.monitor_set_mut(&custom("dock")).unwrap(), "A");
        assert!(screen.monitor(false, &custom("dock"), "A").unwrap().primary);
        assert!(!screen.monitor(false, &custom("dock"), "B").unwrap().primary);
        assert!(screen.monitor_set_mut(&DisplayMode::Mirror).is_none());
    }

    #[test]
    fn names_follow_live_monitors() {
        let live: LiveMonitors = [live("HDMI-1", "A"), live("eDP-1", "C")].into_iter().collect();
        let mut set = vec![monitor("A", true), monitor("B", true)];

        sync_names(&mut set, &live);
        assert_eq!(set[0].name, "HDMI-1");
        assert_eq!(set[1].name, "out-B");
    }

    #[test]
    fn names_sync_across_whole_screen() {
        let live: LiveMonitors = [live("DP-3", "A")].into_iter().collect();
        let mut screen = ScreenConfig::default();
        screen.set_monitor_set(&custom("dock"), vec![monitor("A", true)]);
        screen.set_monitor_set(&DisplayMode::Mirror, vec![monitor("A", true)]);
        screen.set_monitor_set(&DisplayMode::OnlyOne, vec![monitor("A", true)]);
        screen.single = Some(monitor("A", true));

        screen.sync_names(&live);
        assert_eq!(screen.monitor_set(&custom("dock"))[0].name, "DP-3");
        assert_eq!(screen.monitor_set(&DisplayMode::Mirror)[0].name, "DP-3");
        assert_eq!(screen.monitor_set(&DisplayMode::OnlyOne)[0].name, "DP-3");
        assert_eq!(screen.single.as_ref().unwrap().name, "DP-3");
    }
}
