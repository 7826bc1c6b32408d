/// Favorites group visibility and the enable/disable-all trigger.
///
/// Only the decision is made here; creating or removing the map layers for
/// the groups is left to the caller.
use serde::{Deserialize, Serialize};

/// A named group of favorite points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FavoriteGroup {
    pub name: String,
    pub hidden: bool,
    /// Number of favorites in the group.
    pub size: usize,
    /// Download URL of the group's layer, `None` once its layers are removed.
    pub url: Option<String>,
    pub add_to_map: bool,
}

/// Groups shown in the favorites menu: not hidden and not empty.
pub fn visible_groups(groups: &[FavoriteGroup]) -> Vec<&FavoriteGroup> {
    groups.iter().filter(|g| !g.hidden && g.size > 0).collect()
}

/// Groups that were on the map when the favorites were loaded.
pub fn initially_enabled(groups: &[FavoriteGroup]) -> Vec<&FavoriteGroup> {
    groups
        .iter()
        .filter(|g| g.url.is_some() && g.add_to_map)
        .collect()
}

/// Response to a change in the set of enabled groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupToggle {
    /// Every open group is enabled: create layers for all groups.
    EnableAll,
    /// No group is enabled while groups exist: remove all layers.
    DisableAll,
    Unchanged,
}

impl GroupToggle {
    /// Decides the response from the enabled count, the open (visible)
    /// count and the total number of groups.
    pub fn decide(enabled: usize, open: usize, total: usize) -> Self {
        if enabled == open {
            GroupToggle::EnableAll
        } else if enabled == 0 && total != 0 {
            GroupToggle::DisableAll
        } else {
            GroupToggle::Unchanged
        }
    }
}

/// Clears the layer URL of every group, as done when all layers are removed.
pub fn detach_all(groups: &mut [FavoriteGroup]) {
    for group in groups {
        group.url = None;
    }
}
