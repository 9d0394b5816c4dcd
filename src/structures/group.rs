use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Handle shared by every record of one synchronized frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Group {
    /// Group id.
    pub id: Uuid,
}

impl Group {
    /// Allocate a new group.
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }

    /// Membership of a record occupying the `name` slot of this group.
    pub fn element(&self, name: impl Into<String>) -> GroupElement {
        GroupElement {
            id: self.id,
            name: name.into(),
        }
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::new()
    }
}

/// Group membership of a record.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupElement {
    /// Group id.
    pub id: Uuid,
    /// Slot (channel) the record occupies.
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elements_share_group_id() {
        let group = Group::new();
        let camera = group.element("CAM_FRONT");
        let lidar = group.element("LIDAR_TOP");
        assert_eq!(camera.id, lidar.id);
        assert_ne!(camera, lidar);
        assert_ne!(Group::new().id, group.id);
    }
}
