//! Shared column transforms and descriptions

use super::column::ColumnValue;

/// Description of the standard columns every resource table carries
pub fn resource_interface_description(column: &str) -> &'static str {
    match column {
        "akas" => "Array of globally unique identifier strings (also known as) for the resource.",
        "tags" => "A map of tags for the resource.",
        "title" => "Title of the resource.",
        _ => "",
    }
}

/// `["azure://<id>", "azure://<lowercase id>"]`
pub fn id_to_akas(id: Option<&str>) -> ColumnValue {
    let Some(id) = id else {
        return ColumnValue::Null;
    };
    let akas = [
        format!("azure://{}", id),
        format!("azure://{}", id.to_lowercase()),
    ];
    ColumnValue::json(Some(&akas))
}

/// Subscription segment of an ARM id:
/// `/subscriptions/<sub>/resourceGroups/...` -> `<sub>`
pub fn subscription_from_id(id: &str) -> Option<&str> {
    id.split('/').nth(2).filter(|s| !s.is_empty())
}

pub fn id_to_subscription_id(id: Option<&str>) -> ColumnValue {
    id.and_then(subscription_from_id).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_akas() {
        let value = id_to_akas(Some("/subscriptions/SUB/resourceGroups/RG/providers/Microsoft.Web/sites/App"));
        assert_eq!(
            value,
            ColumnValue::Json(json!([
                "azure:///subscriptions/SUB/resourceGroups/RG/providers/Microsoft.Web/sites/App",
                "azure:///subscriptions/sub/resourcegroups/rg/providers/microsoft.web/sites/app"
            ]))
        );
        assert!(id_to_akas(None).is_null());
    }

    #[test]
    fn test_subscription_from_id() {
        assert_eq!(
            subscription_from_id("/subscriptions/abc/resourceGroups/rg"),
            Some("abc")
        );
        assert_eq!(subscription_from_id("no-slashes"), None);
        assert!(id_to_subscription_id(Some("")).is_null());
    }

    #[test]
    fn test_standard_descriptions() {
        assert!(resource_interface_description("akas").contains("globally unique"));
        assert_eq!(resource_interface_description("region"), "");
    }
}
