//! Property-based tests using proptest
//!
//! These tests verify the function app discriminator, the standard column
//! transforms and row projection using randomized inputs.

use azure_tables::azure::models::Site;
use azure_tables::plugin::transform::{id_to_akas, subscription_from_id};
use azure_tables::plugin::{ColumnValue, ResourceTable};
use azure_tables::tables::app_service_function_app::is_function_app;
use azure_tables::tables::AppServiceFunctionAppTable;
use proptest::prelude::*;
use serde_json::{json, Value};

/// Generate site kinds the way ARM reports them (comma separated markers)
fn arb_kind() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            Just("app"),
            Just("functionapp"),
            Just("linux"),
            Just("container"),
            Just("workflowapp"),
            Just("api"),
        ],
        1..4,
    )
    .prop_map(|parts| parts.join(","))
}

/// Generate an ARM resource id for a site
fn arb_site_id() -> impl Strategy<Value = (String, String)> {
    (
        "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
        "[A-Za-z][A-Za-z0-9-]{0,20}",
        "[A-Za-z][A-Za-z0-9-]{0,20}",
    )
        .prop_map(|(sub, rg, name)| {
            let id = format!(
                "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Web/sites/{}",
                sub, rg, name
            );
            (sub, id)
        })
}

fn arb_site() -> impl Strategy<Value = Value> {
    (arb_site_id(), prop::option::of(arb_kind())).prop_map(|((_, id), kind)| {
        json!({
            "id": id,
            "name": id.rsplit('/').next().unwrap_or_default(),
            "kind": kind,
        })
    })
}

fn arb_site_list() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::vec(arb_site(), 0..50)
}

fn to_sites(values: &[Value]) -> Vec<Site> {
    values
        .iter()
        .map(|v| serde_json::from_value(v.clone()).unwrap())
        .collect()
}

proptest! {
    /// The discriminator is exactly "kind contains functionapp"
    #[test]
    fn discriminator_matches_kind_substring(kind in prop::option::of(arb_kind())) {
        let expected = kind.as_deref().is_some_and(|k| k.contains("functionapp"));
        let site: Site = serde_json::from_value(json!({"kind": kind})).unwrap();
        prop_assert_eq!(is_function_app(&site), expected);
    }

    /// Filtering keeps exactly the function apps, in order, and is idempotent
    #[test]
    fn filter_keeps_function_apps_in_order(values in arb_site_list()) {
        let sites = to_sites(&values);
        let filtered: Vec<&Site> = sites.iter().filter(|s| is_function_app(s)).collect();

        prop_assert!(filtered.len() <= sites.len());
        prop_assert!(filtered.iter().all(|s| is_function_app(s)));

        let expected: Vec<_> = values
            .iter()
            .filter(|v| v["kind"].as_str().is_some_and(|k| k.contains("functionapp")))
            .map(|v| v["id"].as_str().unwrap_or_default().to_string())
            .collect();
        let actual: Vec<_> = filtered.iter().map(|s| s.id.clone().unwrap_or_default()).collect();
        prop_assert_eq!(actual, expected);

        let twice = filtered.iter().filter(|s| is_function_app(s)).count();
        prop_assert_eq!(twice, filtered.len());
    }

    /// akas always holds the id and its lowercase form
    #[test]
    fn akas_are_id_and_lowercase_id((_, id) in arb_site_id()) {
        let akas = id_to_akas(Some(&id));
        let ColumnValue::Json(Value::Array(items)) = akas else {
            return Err(TestCaseError::fail("akas should be a JSON array"));
        };

        prop_assert_eq!(items.len(), 2);
        let expected0 = format!("azure://{}", id);
        let expected1 = format!("azure://{}", id.to_lowercase());
        prop_assert_eq!(items[0].as_str(), Some(expected0.as_str()));
        prop_assert_eq!(items[1].as_str(), Some(expected1.as_str()));
    }

    /// The subscription id is recovered from any well-formed resource id
    #[test]
    fn subscription_is_third_segment((sub, id) in arb_site_id()) {
        prop_assert_eq!(subscription_from_id(&id), Some(sub.as_str()));
    }

    /// Projection yields every column, whatever the record contains
    #[test]
    fn projection_has_every_column(value in arb_site()) {
        let table = AppServiceFunctionAppTable::new();
        let site: Site = serde_json::from_value(value).unwrap();
        let row = table.definition().project(&site);

        prop_assert_eq!(row.len(), table.definition().columns.len());
        prop_assert_eq!(row.get("title"), row.get("name"));
    }
}
