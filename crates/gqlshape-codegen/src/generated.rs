//! Generated shapes: what a run hands to the emitter.

use serde::Serialize;
use std::fmt;

/// Innermost type of a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BaseType {
    /// A schema scalar and the host type it maps to.
    Scalar { name: String, host: String },
    /// A type registered in the same run (object, enum, interface, union,
    /// input object).
    Generated { name: String },
}

impl BaseType {
    pub fn name(&self) -> &str {
        match self {
            BaseType::Scalar { name, .. } | BaseType::Generated { name } => name,
        }
    }
}

/// A resolved property type with nullability and list wrapping reapplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropertyType {
    Named {
        base: BaseType,
        nullable: bool,
    },
    List {
        element: Box<PropertyType>,
        nullable: bool,
    },
}

impl PropertyType {
    pub fn scalar(name: impl Into<String>, host: impl Into<String>, nullable: bool) -> Self {
        PropertyType::Named {
            base: BaseType::Scalar {
                name: name.into(),
                host: host.into(),
            },
            nullable,
        }
    }

    pub fn generated(name: impl Into<String>, nullable: bool) -> Self {
        PropertyType::Named {
            base: BaseType::Generated { name: name.into() },
            nullable,
        }
    }

    pub fn list(element: PropertyType, nullable: bool) -> Self {
        PropertyType::List {
            element: Box::new(element),
            nullable,
        }
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            PropertyType::Named { nullable, .. } | PropertyType::List { nullable, .. } => {
                *nullable
            }
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, PropertyType::List { .. })
    }

    /// The innermost base type, under any number of list layers.
    pub fn base(&self) -> &BaseType {
        match self {
            PropertyType::Named { base, .. } => base,
            PropertyType::List { element, .. } => element.base(),
        }
    }

    /// The same type with its outermost layer made nullable.
    pub fn into_nullable(self) -> Self {
        match self {
            PropertyType::Named { base, .. } => PropertyType::Named {
                base,
                nullable: true,
            },
            PropertyType::List { element, .. } => PropertyType::List {
                element,
                nullable: true,
            },
        }
    }
}

/// GraphQL notation, e.g. `[String!]!`.
impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nullable = match self {
            PropertyType::Named { base, nullable } => {
                f.write_str(base.name())?;
                nullable
            }
            PropertyType::List { element, nullable } => {
                write!(f, "[{}]", element)?;
                nullable
            }
        };
        if !nullable {
            f.write_str("!")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedProperty {
    /// Response key: the alias if one was given, else the field name.
    pub name: String,
    /// Schema field this property was selected from.
    pub field_name: String,
    #[serde(rename = "type")]
    pub ty: PropertyType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedEnumValue {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One concrete runtime type of an interface or union shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    /// Value of `__typename` that selects this variant.
    pub typename: String,
    /// Generated object type holding the variant's fields.
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratedKind {
    Object,
    Enum { values: Vec<GeneratedEnumValue> },
    Interface { variants: Vec<Variant> },
    Union { variants: Vec<Variant> },
    InputObject,
}

/// A synthesized shape for one level of a response (or one input type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedType {
    pub name: String,
    /// Schema type this shape was derived from.
    pub schema_type: String,
    pub kind: GeneratedKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub properties: Vec<GeneratedProperty>,
}

impl GeneratedType {
    pub fn property(&self, name: &str) -> Option<&GeneratedProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn variants(&self) -> &[Variant] {
        match &self.kind {
            GeneratedKind::Interface { variants } | GeneratedKind::Union { variants } => variants,
            _ => &[],
        }
    }

    /// One-line rendering used in diagnostics, e.g. `User { id: ID!, name: String }`.
    pub fn summary(&self) -> String {
        if let GeneratedKind::Enum { values } = &self.kind {
            let values: Vec<&str> = values.iter().map(|v| v.name.as_str()).collect();
            return format!("{} {{ {} }}", self.name, values.join(" | "));
        }
        let properties: Vec<String> = self
            .properties
            .iter()
            .map(|p| format!("{}: {}", p.name, p.ty))
            .collect();
        let mut summary = format!("{} {{ {} }}", self.name, properties.join(", "));
        let variants = self.variants();
        if !variants.is_empty() {
            let names: Vec<&str> = variants.iter().map(|v| v.type_name.as_str()).collect();
            summary.push_str(&format!(" as {}", names.join(" | ")));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_wrapping() {
        let ty = PropertyType::list(PropertyType::scalar("String", "String", false), false);
        assert_eq!(ty.to_string(), "[String!]!");
        let ty = PropertyType::list(PropertyType::generated("User", true), true);
        assert_eq!(ty.to_string(), "[User]");
    }

    #[test]
    fn base_reaches_through_lists() {
        let ty = PropertyType::list(
            PropertyType::list(PropertyType::generated("User", false), true),
            false,
        );
        assert_eq!(ty.base().name(), "User");
        assert!(ty.is_list());
        assert!(!ty.is_nullable());
    }

    #[test]
    fn into_nullable_only_touches_outer_layer() {
        let ty = PropertyType::list(PropertyType::scalar("Int", "i32", false), false)
            .into_nullable();
        assert_eq!(ty.to_string(), "[Int!]");
    }

    #[test]
    fn summary_of_enum_and_union() {
        let status = GeneratedType {
            name: "Status".to_string(),
            schema_type: "Status".to_string(),
            kind: GeneratedKind::Enum {
                values: vec![
                    GeneratedEnumValue {
                        name: "OPEN".to_string(),
                        description: None,
                    },
                    GeneratedEnumValue {
                        name: "CLOSED".to_string(),
                        description: None,
                    },
                ],
            },
            description: None,
            properties: Vec::new(),
        };
        assert_eq!(status.summary(), "Status { OPEN | CLOSED }");

        let search = GeneratedType {
            name: "SearchResult".to_string(),
            schema_type: "SearchResult".to_string(),
            kind: GeneratedKind::Union {
                variants: vec![Variant {
                    typename: "User".to_string(),
                    type_name: "User".to_string(),
                }],
            },
            description: None,
            properties: vec![GeneratedProperty {
                name: "__typename".to_string(),
                field_name: "__typename".to_string(),
                ty: PropertyType::scalar("String", "String", false),
                description: None,
            }],
        };
        assert_eq!(
            search.summary(),
            "SearchResult { __typename: String! } as User"
        );
    }

    #[test]
    fn serializes_property_type_tagged() {
        let ty = PropertyType::scalar("ID", "String", false);
        let json = serde_json::to_value(&ty).unwrap();
        assert_eq!(json["kind"], "named");
        assert_eq!(json["nullable"], false);
        assert_eq!(json["base"]["kind"], "scalar");
        assert_eq!(json["base"]["host"], "String");
    }
}
