// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary-condition tags.

use serde::Serialize;
use smallvec::SmallVec;

use crate::error::{Error, Result};

/// Cross-references attached to a Surface condition: sibling sub-opening
/// id, its parent face id, and its room id.
pub type ConditionObjects = SmallVec<[String; 3]>;

/// What lies on the far side of a face or sub-opening.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum BoundaryCondition {
    /// Exterior boundary; never carries cross-references.
    Outdoors {
        boundary_condition_objects: ConditionObjects,
    },
    /// Interior partition; cross-references accumulate only after sibling
    /// matching succeeds.
    Surface {
        boundary_condition_objects: ConditionObjects,
    },
}

impl BoundaryCondition {
    pub fn outdoors() -> Self {
        BoundaryCondition::Outdoors {
            boundary_condition_objects: SmallVec::new(),
        }
    }

    pub fn surface() -> Self {
        BoundaryCondition::Surface {
            boundary_condition_objects: SmallVec::new(),
        }
    }

    pub fn surface_with(objects: ConditionObjects) -> Self {
        BoundaryCondition::Surface {
            boundary_condition_objects: objects,
        }
    }

    pub fn is_surface(&self) -> bool {
        matches!(self, BoundaryCondition::Surface { .. })
    }

    pub fn objects(&self) -> &[String] {
        match self {
            BoundaryCondition::Outdoors {
                boundary_condition_objects,
            }
            | BoundaryCondition::Surface {
                boundary_condition_objects,
            } => boundary_condition_objects,
        }
    }
}

/// Map a boundary's internal-or-external tag to its condition.
///
/// Pure: the same literal always yields the same tagged result with an
/// empty reference list. Values outside {EXTERNAL, INTERNAL} (including an
/// unset attribute) are an error; the pipeline recovers by defaulting to
/// Outdoors with a warning.
pub fn classify(tag: Option<&str>) -> Result<BoundaryCondition> {
    match tag {
        Some("EXTERNAL") => Ok(BoundaryCondition::outdoors()),
        Some("INTERNAL") => Ok(BoundaryCondition::surface()),
        other => Err(Error::UnknownBoundaryType(
            other.unwrap_or("<unset>").to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn classification_is_idempotent() {
        for _ in 0..3 {
            assert_eq!(classify(Some("EXTERNAL")).unwrap(), BoundaryCondition::outdoors());
            assert_eq!(classify(Some("INTERNAL")).unwrap(), BoundaryCondition::surface());
        }
        assert!(classify(Some("EXTERNAL")).unwrap().objects().is_empty());
        assert!(classify(Some("INTERNAL")).unwrap().objects().is_empty());
    }

    #[test]
    fn unknown_tags_are_errors() {
        assert!(matches!(
            classify(Some("NOTDEFINED")),
            Err(Error::UnknownBoundaryType(_))
        ));
        assert!(matches!(classify(None), Err(Error::UnknownBoundaryType(_))));
    }

    #[test]
    fn serialized_shape_matches_the_output_schema() {
        let outdoors = serde_json::to_value(BoundaryCondition::outdoors()).unwrap();
        assert_eq!(
            outdoors,
            serde_json::json!({"type": "Outdoors", "boundary_condition_objects": []})
        );

        let surface = BoundaryCondition::surface_with(smallvec![
            "aaaa0001".to_string(),
            "aaaa0002".to_string(),
            "aaaa0003".to_string(),
        ]);
        let value = serde_json::to_value(surface).unwrap();
        assert_eq!(value["type"], "Surface");
        assert_eq!(value["boundary_condition_objects"][2], "aaaa0003");
    }
}
