// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host-element resolution for windows and doors.
//!
//! A window or door sits in an opening, which sits in a wall. The model
//! encodes this as nested placements: element placement → opening placement
//! → wall placement. The resolver walks that chain and finds the
//! standard-case wall whose own placement is the innermost one. A broken
//! chain or a missing wall records no host; downstream treats that as "no
//! parent face".

use rustc_hash::FxHashMap;
use tracing::debug;

use ifc_rooms_core::{EntityKind, ModelStore, Record};

/// IfcProduct: ObjectPlacement.
const ATTR_OBJECT_PLACEMENT: usize = 5;
/// IfcLocalPlacement: PlacementRelTo.
const ATTR_PLACEMENT_REL_TO: usize = 0;

/// Opening element → hosting wall element index.
#[derive(Debug, Default)]
pub struct HostIndex {
    /// All matching walls per opening element, in wall enumeration order.
    /// Only the first is consumed downstream.
    hosts: FxHashMap<u32, Vec<u32>>,
}

impl HostIndex {
    /// Resolve hosts for every window and door element in the model.
    pub fn build(store: &ModelStore) -> Self {
        let walls: Vec<&Record> = store
            .ids_of(EntityKind::WallStandardCase)
            .iter()
            .filter_map(|&id| store.record(id))
            .collect();

        let mut hosts: FxHashMap<u32, Vec<u32>> = FxHashMap::default();
        let openings = store
            .ids_of(EntityKind::Window)
            .iter()
            .chain(store.ids_of(EntityKind::Door).iter());

        for &element_id in openings {
            let Some(element) = store.record(element_id) else {
                continue;
            };
            let Some(wall_placement) = resolve_wall_placement(store, element) else {
                debug!(element = element_id, "placement chain does not reach a wall");
                continue;
            };

            for wall in &walls {
                if wall.get_ref(ATTR_OBJECT_PLACEMENT) == Some(wall_placement) {
                    hosts.entry(element_id).or_default().push(wall.id);
                }
            }
        }

        Self { hosts }
    }

    /// First hosting wall of an opening element, if any.
    pub fn host_of(&self, element_id: u32) -> Option<u32> {
        self.hosts.get(&element_id).and_then(|walls| walls.first()).copied()
    }
}

/// element placement → opening placement → wall placement id.
fn resolve_wall_placement(store: &ModelStore, element: &Record) -> Option<u32> {
    let element_placement = store.resolve_field(element, ATTR_OBJECT_PLACEMENT)?;
    let opening_placement = store.resolve_field(element_placement, ATTR_PLACEMENT_REL_TO)?;
    let wall_placement = store.resolve_field(opening_placement, ATTR_PLACEMENT_REL_TO)?;
    Some(wall_placement.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOSTED_WINDOW: &str = "\
#10=IFCWALLSTANDARDCASE('w',$,'Wall',$,$,#62,$,$);\n\
#11=IFCWINDOW('win',$,'Window',$,$,#60,$,$,1.2,0.9);\n\
#12=IFCDOOR('door',$,'Door',$,$,#70,$,$,2.1,0.9);\n\
#60=IFCLOCALPLACEMENT(#61,#80);\n\
#61=IFCLOCALPLACEMENT(#62,#80);\n\
#62=IFCLOCALPLACEMENT($,#80);\n\
#70=IFCLOCALPLACEMENT(#71,#80);\n\
#71=IFCLOCALPLACEMENT(#62,#80);\n\
#80=IFCAXIS2PLACEMENT3D(#81,$,$);\n\
#81=IFCCARTESIANPOINT((0.,0.,0.));\n";

    #[test]
    fn window_and_door_resolve_to_the_same_wall() {
        let store = ModelStore::open(HOSTED_WINDOW).unwrap();
        let hosts = HostIndex::build(&store);
        assert_eq!(hosts.host_of(11), Some(10));
        assert_eq!(hosts.host_of(12), Some(10));
    }

    #[test]
    fn broken_chain_records_no_host() {
        // window placement has no parent chain to a wall
        let content = "\
#10=IFCWALLSTANDARDCASE('w',$,'Wall',$,$,#62,$,$);\n\
#11=IFCWINDOW('win',$,'Window',$,$,#60,$,$,1.2,0.9);\n\
#60=IFCLOCALPLACEMENT($,#80);\n\
#62=IFCLOCALPLACEMENT($,#80);\n\
#80=IFCAXIS2PLACEMENT3D(#81,$,$);\n\
#81=IFCCARTESIANPOINT((0.,0.,0.));\n";
        let store = ModelStore::open(content).unwrap();
        let hosts = HostIndex::build(&store);
        assert_eq!(hosts.host_of(11), None);
    }

    #[test]
    fn placement_not_owned_by_any_wall_records_no_host() {
        let content = "\
#10=IFCWALLSTANDARDCASE('w',$,'Wall',$,$,#63,$,$);\n\
#11=IFCWINDOW('win',$,'Window',$,$,#60,$,$,1.2,0.9);\n\
#60=IFCLOCALPLACEMENT(#61,#80);\n\
#61=IFCLOCALPLACEMENT(#62,#80);\n\
#62=IFCLOCALPLACEMENT($,#80);\n\
#63=IFCLOCALPLACEMENT($,#80);\n\
#80=IFCAXIS2PLACEMENT3D(#81,$,$);\n\
#81=IFCCARTESIANPOINT((0.,0.,0.));\n";
        let store = ModelStore::open(content).unwrap();
        let hosts = HostIndex::build(&store);
        assert_eq!(hosts.host_of(11), None);
    }

    #[test]
    fn one_wall_may_host_many_openings() {
        let store = ModelStore::open(HOSTED_WINDOW).unwrap();
        let hosts = HostIndex::build(&store);
        // both openings resolved against the single wall
        assert_eq!(hosts.host_of(11), hosts.host_of(12));
    }
}
