use serde::{Deserialize, Serialize};

/// Unit attached to every demo property.
pub const DEFAULT_UNIT: &str = "a.u.";

/// Tumbling window applied to metrics that don't ask for another one.
pub const DEFAULT_METRIC_WINDOW: &str = "1m";

/// Name of the measurement the demo catalog derives everything from.
pub const MEASUREMENT_NAME: &str = "X";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    Double,
    Integer,
    Boolean,
}

/// Binds a symbol used in an expression to the property supplying its value.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub name: String,
    pub property: String,
}

/// What a property is computed from.
///
/// Measurements carry raw ingested values. Transforms are evaluated per
/// sample, metrics over a tumbling window given as an interval string
/// such as "1m" or "10m".
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum PropertyKind {
    Measurement,
    Transform {
        expression: String,
        variables: Vec<Variable>,
    },
    Metric {
        expression: String,
        variables: Vec<Variable>,
        window: String,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDefinition {
    pub name: String,
    pub data_type: DataType,
    pub unit: String,
    #[serde(flatten)]
    pub kind: PropertyKind,
}

/// Declarative schema submitted once to the remote, which assigns the
/// model and per-property identifiers.
///
/// Variable bindings reference other properties by name and are resolved
/// by the remote at submission time, not while building. An incomplete or
/// dangling binding is rejected by the service, not here.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelDefinition {
    pub name: String,
    pub properties: Vec<PropertyDefinition>,
}

impl ModelDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    pub fn measurement(self, name: &str) -> Self {
        self.property(name, PropertyKind::Measurement)
    }

    pub fn transform(self, name: &str, expression: &str, variables: &[(&str, &str)]) -> Self {
        self.property(
            name,
            PropertyKind::Transform {
                expression: expression.to_string(),
                variables: bind(variables),
            },
        )
    }

    pub fn metric(self, name: &str, expression: &str, variables: &[(&str, &str)]) -> Self {
        self.metric_over(name, expression, variables, DEFAULT_METRIC_WINDOW)
    }

    pub fn metric_over(
        self,
        name: &str,
        expression: &str,
        variables: &[(&str, &str)],
        window: &str,
    ) -> Self {
        self.property(
            name,
            PropertyKind::Metric {
                expression: expression.to_string(),
                variables: bind(variables),
                window: window.to_string(),
            },
        )
    }

    fn property(mut self, name: &str, kind: PropertyKind) -> Self {
        self.properties.push(PropertyDefinition {
            name: name.to_string(),
            data_type: DataType::Double,
            unit: DEFAULT_UNIT.to_string(),
            kind,
        });
        self
    }
}

/// The fixed demo schema: one raw signal and a catalog of values the
/// remote derives from it.
pub fn demo_model(name: &str) -> ModelDefinition {
    ModelDefinition::new(name)
        .measurement(MEASUREMENT_NAME)
        .transform("2X", "x * 2", &[("x", "X")])
        .metric("avgX", "avg(x)", &[("x", "X")])
        .metric("lastX", "x", &[("x", "X")])
        .metric_over("lastX_10m", "x", &[("x", "X")], "10m")
        .metric("latestX", "latest(x)", &[("x", "X")])
        .metric("TrueX", "eq(x, true)", &[("x", "X")])
        // cumulative seconds the signal has held a value above zero
        .metric("XTrueDuration", "statetime(x)", &[("x", "X")])
}

fn bind(variables: &[(&str, &str)]) -> Vec<Variable> {
    variables
        .iter()
        .map(|(name, property)| Variable {
            name: name.to_string(),
            property: property.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bindings(kind: &PropertyKind) -> &[Variable] {
        match kind {
            PropertyKind::Measurement => &[],
            PropertyKind::Transform { variables, .. } => variables,
            PropertyKind::Metric { variables, .. } => variables,
        }
    }

    #[test]
    fn demo_catalog_lists_all_derived_properties() {
        let definition = demo_model("test-model");

        let names: Vec<&str> = definition
            .properties
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(
            names,
            [
                "X",
                "2X",
                "avgX",
                "lastX",
                "lastX_10m",
                "latestX",
                "TrueX",
                "XTrueDuration"
            ]
        );
    }

    #[test]
    fn every_binding_references_an_earlier_property() {
        let definition = demo_model("test-model");

        let mut seen: Vec<&str> = Vec::new();
        for property in &definition.properties {
            for variable in bindings(&property.kind) {
                assert!(
                    seen.contains(&variable.property.as_str()),
                    "{} binds {} to {} which is not defined before it",
                    property.name,
                    variable.name,
                    variable.property,
                );
            }
            seen.push(property.name.as_str());
        }
    }

    #[test]
    fn default_window_applies_unless_overridden() {
        let definition = demo_model("test-model");

        let window_of = |name: &str| {
            definition
                .properties
                .iter()
                .find(|p| p.name == name)
                .and_then(|p| match &p.kind {
                    PropertyKind::Metric { window, .. } => Some(window.clone()),
                    _ => None,
                })
                .unwrap()
        };

        assert_eq!(window_of("avgX"), "1m");
        assert_eq!(window_of("lastX"), "1m");
        assert_eq!(window_of("lastX_10m"), "10m");
    }

    #[test]
    fn definition_wire_shape() {
        let definition = ModelDefinition::new("m")
            .measurement("X")
            .transform("2X", "x * 2", &[("x", "X")]);

        assert_eq!(
            serde_json::to_value(&definition).unwrap(),
            json!({
                "name": "m",
                "properties": [
                    {
                        "name": "X",
                        "dataType": "DOUBLE",
                        "unit": "a.u.",
                        "kind": "measurement",
                    },
                    {
                        "name": "2X",
                        "dataType": "DOUBLE",
                        "unit": "a.u.",
                        "kind": "transform",
                        "expression": "x * 2",
                        "variables": [{ "name": "x", "property": "X" }],
                    },
                ],
            })
        );
    }
}
