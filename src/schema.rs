//! Declared input columns for the pricing model.
//!
//! The order here is the order the model was trained on. It is checked
//! against the artifact's `feature_names` before the server starts.

use serde_json::Value;

use crate::error::{RequestError, SchemaError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// Non-negative integer counts.
    Count,
    Continuous,
    /// One-hot encoded category, 0 or 1.
    Indicator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub kind: FeatureKind,
}

const fn spec(name: &'static str, kind: FeatureKind) -> FeatureSpec {
    FeatureSpec { name, kind }
}

const RIDE_PRICING: [FeatureSpec; 15] = [
    spec("number_of_riders", FeatureKind::Count),
    spec("number_of_drivers", FeatureKind::Count),
    spec("number_of_past_rides", FeatureKind::Count),
    spec("average_ratings", FeatureKind::Continuous),
    spec("expected_ride_duration", FeatureKind::Continuous),
    spec("demand_supply_ratio", FeatureKind::Continuous),
    spec("location_category_Suburban", FeatureKind::Indicator),
    spec("location_category_Urban", FeatureKind::Indicator),
    spec("customer_loyalty_status_Regular", FeatureKind::Indicator),
    spec("customer_loyalty_status_Silver", FeatureKind::Indicator),
    spec("time_of_booking_Evening", FeatureKind::Indicator),
    spec("time_of_booking_Morning", FeatureKind::Indicator),
    spec("time_of_booking_Night", FeatureKind::Indicator),
    spec("vehicle_type_Premium", FeatureKind::Indicator),
    spec("duration_ratings_interaction", FeatureKind::Continuous),
];

#[derive(Debug, Clone)]
pub struct FeatureSchema {
    features: Vec<FeatureSpec>,
}

impl FeatureSchema {
    pub fn new(features: Vec<FeatureSpec>) -> Self {
        Self { features }
    }

    /// The 15 ride request columns.
    pub fn ride_pricing() -> Self {
        Self::new(RIDE_PRICING.to_vec())
    }

    pub fn features(&self) -> &[FeatureSpec] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.features.iter().map(|f| f.name)
    }

    /// Fails on the first position where the schema and the model disagree.
    pub fn check_against(&self, model_features: &[String]) -> Result<(), SchemaError> {
        if self.features.len() != model_features.len() {
            return Err(SchemaError::Length {
                schema: self.features.len(),
                model: model_features.len(),
            });
        }
        for (index, (f, m)) in self.features.iter().zip(model_features).enumerate() {
            if f.name != m.as_str() {
                return Err(SchemaError::Column {
                    index,
                    schema: f.name.to_string(),
                    model: m.clone(),
                });
            }
        }
        Ok(())
    }

    /// Builds one ordered row from a JSON object. Unknown keys are ignored.
    pub fn extract(&self, body: &Value) -> Result<Vec<f64>, RequestError> {
        let obj = body.as_object().ok_or(RequestError::NotAnObject)?;
        let mut row = Vec::with_capacity(self.features.len());
        for f in &self.features {
            let v = obj.get(f.name).ok_or(RequestError::MissingField(f.name))?;
            row.push(to_f64(f.name, v)?);
        }
        Ok(row)
    }
}

fn to_f64(field: &'static str, v: &Value) -> Result<f64, RequestError> {
    match v {
        Value::Number(n) => n.as_f64().ok_or_else(|| RequestError::InvalidValue {
            field,
            found: n.to_string(),
        }),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        other => Err(RequestError::InvalidValue {
            field,
            found: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_request() -> Value {
        json!({
            "number_of_riders": 50,
            "number_of_drivers": 20,
            "number_of_past_rides": 10,
            "average_ratings": 4.5,
            "expected_ride_duration": 30,
            "demand_supply_ratio": 2.5,
            "location_category_Suburban": 0,
            "location_category_Urban": 1,
            "customer_loyalty_status_Regular": 1,
            "customer_loyalty_status_Silver": 0,
            "time_of_booking_Evening": 0,
            "time_of_booking_Morning": 1,
            "time_of_booking_Night": 0,
            "vehicle_type_Premium": 0,
            "duration_ratings_interaction": 135.0
        })
    }

    #[test]
    fn ride_pricing_has_fifteen_columns_in_order() {
        let s = FeatureSchema::ride_pricing();
        assert_eq!(s.len(), 15);
        let names: Vec<_> = s.names().collect();
        assert_eq!(names[0], "number_of_riders");
        assert_eq!(names[6], "location_category_Suburban");
        assert_eq!(names[14], "duration_ratings_interaction");
        assert_eq!(s.features()[3].kind, FeatureKind::Continuous);
        assert_eq!(s.features()[13].kind, FeatureKind::Indicator);
    }

    #[test]
    fn extract_follows_schema_order_not_key_order() {
        let row = FeatureSchema::ride_pricing().extract(&full_request()).unwrap();
        assert_eq!(
            row,
            vec![50.0, 20.0, 10.0, 4.5, 30.0, 2.5, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 135.0]
        );
    }

    #[test]
    fn empty_object_reports_first_field() {
        let err = FeatureSchema::ride_pricing().extract(&json!({})).unwrap_err();
        assert!(matches!(err, RequestError::MissingField("number_of_riders")));
    }

    #[test]
    fn reports_first_missing_in_schema_order() {
        let mut body = full_request();
        let obj = body.as_object_mut().unwrap();
        obj.remove("vehicle_type_Premium");
        obj.remove("average_ratings");
        let err = FeatureSchema::ride_pricing().extract(&body).unwrap_err();
        assert!(matches!(err, RequestError::MissingField("average_ratings")));
    }

    #[test]
    fn bools_are_indicators() {
        let mut body = full_request();
        body["vehicle_type_Premium"] = json!(true);
        let row = FeatureSchema::ride_pricing().extract(&body).unwrap();
        assert_eq!(row[13], 1.0);
    }

    #[test]
    fn rejects_strings_and_nulls() {
        let mut body = full_request();
        body["demand_supply_ratio"] = json!("high");
        let err = FeatureSchema::ride_pricing().extract(&body).unwrap_err();
        assert!(matches!(err, RequestError::InvalidValue { field: "demand_supply_ratio", .. }));

        body["demand_supply_ratio"] = Value::Null;
        assert!(FeatureSchema::ride_pricing().extract(&body).is_err());
    }

    #[test]
    fn rejects_non_object_body() {
        let err = FeatureSchema::ride_pricing().extract(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, RequestError::NotAnObject));
    }

    #[test]
    fn negative_counts_pass_through() {
        let mut body = full_request();
        body["number_of_riders"] = json!(-3);
        let row = FeatureSchema::ride_pricing().extract(&body).unwrap();
        assert_eq!(row[0], -3.0);
    }

    #[test]
    fn check_against_matching_names() {
        let s = FeatureSchema::ride_pricing();
        let model: Vec<String> = s.names().map(String::from).collect();
        assert!(s.check_against(&model).is_ok());
    }

    #[test]
    fn check_against_detects_swapped_columns() {
        let s = FeatureSchema::ride_pricing();
        let mut model: Vec<String> = s.names().map(String::from).collect();
        model.swap(0, 1);
        match s.check_against(&model).unwrap_err() {
            SchemaError::Column { index, schema, model } => {
                assert_eq!(index, 0);
                assert_eq!(schema, "number_of_riders");
                assert_eq!(model, "number_of_drivers");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn check_against_detects_length_mismatch() {
        let s = FeatureSchema::ride_pricing();
        let model: Vec<String> = s.names().take(14).map(String::from).collect();
        assert!(matches!(
            s.check_against(&model),
            Err(SchemaError::Length { schema: 15, model: 14 })
        ));
    }
}
