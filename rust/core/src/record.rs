// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed records and attribute values.
//!
//! Entity kinds are a closed enum over the record types the room pipeline
//! consumes, resolved once at ingestion. Everything else folds into
//! [`EntityKind::Other`] so reference chains through auxiliary records
//! (owner history, representations, ...) still resolve.

use crate::parser::Token;

/// Entity kinds the pipeline dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Space,
    RelSpaceBoundary,
    Wall,
    WallStandardCase,
    Slab,
    Window,
    Door,
    ConnectionSurfaceGeometry,
    CurveBoundedPlane,
    Plane,
    Axis2Placement3D,
    LocalPlacement,
    Polyline,
    CartesianPoint,
    Direction,
    /// Any entity type outside the set above.
    Other,
}

impl EntityKind {
    /// Resolve a STEP type tag (e.g. `IFCWALLSTANDARDCASE`) to its kind.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "IFCSPACE" => EntityKind::Space,
            "IFCRELSPACEBOUNDARY" => EntityKind::RelSpaceBoundary,
            "IFCWALL" => EntityKind::Wall,
            "IFCWALLSTANDARDCASE" => EntityKind::WallStandardCase,
            "IFCSLAB" => EntityKind::Slab,
            "IFCWINDOW" => EntityKind::Window,
            "IFCDOOR" => EntityKind::Door,
            "IFCCONNECTIONSURFACEGEOMETRY" => EntityKind::ConnectionSurfaceGeometry,
            "IFCCURVEBOUNDEDPLANE" => EntityKind::CurveBoundedPlane,
            "IFCPLANE" => EntityKind::Plane,
            "IFCAXIS2PLACEMENT3D" => EntityKind::Axis2Placement3D,
            "IFCLOCALPLACEMENT" => EntityKind::LocalPlacement,
            "IFCPOLYLINE" => EntityKind::Polyline,
            "IFCCARTESIANPOINT" => EntityKind::CartesianPoint,
            "IFCDIRECTION" => EntityKind::Direction,
            _ => EntityKind::Other,
        }
    }

    /// Display name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Space => "IfcSpace",
            EntityKind::RelSpaceBoundary => "IfcRelSpaceBoundary",
            EntityKind::Wall => "IfcWall",
            EntityKind::WallStandardCase => "IfcWallStandardCase",
            EntityKind::Slab => "IfcSlab",
            EntityKind::Window => "IfcWindow",
            EntityKind::Door => "IfcDoor",
            EntityKind::ConnectionSurfaceGeometry => "IfcConnectionSurfaceGeometry",
            EntityKind::CurveBoundedPlane => "IfcCurveBoundedPlane",
            EntityKind::Plane => "IfcPlane",
            EntityKind::Axis2Placement3D => "IfcAxis2Placement3D",
            EntityKind::LocalPlacement => "IfcLocalPlacement",
            EntityKind::Polyline => "IfcPolyline",
            EntityKind::CartesianPoint => "IfcCartesianPoint",
            EntityKind::Direction => "IfcDirection",
            EntityKind::Other => "<other>",
        }
    }

    /// Wall-family kinds bound walls in space boundaries.
    pub fn is_wall_family(&self) -> bool {
        matches!(self, EntityKind::Wall | EntityKind::WallStandardCase)
    }
}

/// Decoded attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Entity reference: `#123`
    EntityRef(u32),
    /// String literal
    String(String),
    /// Integer
    Integer(i64),
    /// Float
    Float(f64),
    /// Enum literal: `.FLOOR.`
    Enum(String),
    /// List of values
    List(Vec<AttributeValue>),
    /// Null: `$`
    Null,
    /// Derived: `*`
    Derived,
}

impl AttributeValue {
    /// Convert a parser token into an owned attribute value.
    pub fn from_token(token: &Token) -> Self {
        match token {
            Token::EntityRef(id) => AttributeValue::EntityRef(*id),
            Token::String(s) => AttributeValue::String((*s).to_string()),
            Token::Integer(i) => AttributeValue::Integer(*i),
            Token::Float(f) => AttributeValue::Float(*f),
            Token::Enum(e) => AttributeValue::Enum((*e).to_string()),
            Token::List(items) => {
                AttributeValue::List(items.iter().map(Self::from_token).collect())
            }
            // Typed values like IFCPARAMETERVALUE(0.) keep only their payload;
            // the wrapper type carries no information the pipeline uses.
            Token::TypedValue(_, args) => match args.as_slice() {
                [single] => Self::from_token(single),
                many => AttributeValue::List(many.iter().map(Self::from_token).collect()),
            },
            Token::Null => AttributeValue::Null,
            Token::Derived => AttributeValue::Derived,
        }
    }

    #[inline]
    pub fn as_entity_ref(&self) -> Option<u32> {
        match self {
            AttributeValue::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    #[inline]
    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_enum(&self) -> Option<&str> {
        match self {
            AttributeValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null | AttributeValue::Derived)
    }
}

/// Decoded entity record: id, kind, positional attributes.
#[derive(Debug, Clone)]
pub struct Record {
    pub id: u32,
    pub kind: EntityKind,
    pub attributes: Vec<AttributeValue>,
}

impl Record {
    pub fn new(id: u32, kind: EntityKind, attributes: Vec<AttributeValue>) -> Self {
        Self {
            id,
            kind,
            attributes,
        }
    }

    /// Attribute by position.
    pub fn get(&self, index: usize) -> Option<&AttributeValue> {
        self.attributes.get(index)
    }

    /// Entity-reference attribute by position.
    pub fn get_ref(&self, index: usize) -> Option<u32> {
        self.get(index).and_then(|v| v.as_entity_ref())
    }

    /// String attribute by position.
    pub fn get_string(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|v| v.as_string())
    }

    /// Enum attribute by position.
    pub fn get_enum(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|v| v.as_enum())
    }

    /// Float attribute by position.
    pub fn get_float(&self, index: usize) -> Option<f64> {
        self.get(index).and_then(|v| v.as_float())
    }

    /// List attribute by position.
    pub fn get_list(&self, index: usize) -> Option<&[AttributeValue]> {
        self.get(index).and_then(|v| v.as_list())
    }
}
