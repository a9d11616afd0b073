//! Microsoft.Web resource records (api-version 2020-06-01)
//!
//! Only the fields the tables project are modelled. Everything is optional:
//! ARM omits properties freely and an empty-bodied success decodes to the
//! default record.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// A web app or function app (`Microsoft.Web/sites`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Site {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// e.g. `functionapp,linux` or `app`
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, rename = "type")]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub properties: Option<SiteProperties>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteProperties {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub host_names: Option<Vec<String>>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub host_names_disabled: Option<bool>,
    #[serde(default)]
    pub reserved: Option<bool>,
    #[serde(default)]
    pub site_config: Option<Value>,
    #[serde(default)]
    pub client_affinity_enabled: Option<bool>,
    #[serde(default)]
    pub client_cert_enabled: Option<bool>,
    #[serde(default)]
    pub default_host_name: Option<String>,
    #[serde(default)]
    pub outbound_ip_addresses: Option<String>,
    #[serde(default)]
    pub possible_outbound_ip_addresses: Option<String>,
    #[serde(default)]
    pub resource_group: Option<String>,
    #[serde(default)]
    pub https_only: Option<bool>,
}

impl Site {
    pub fn properties(&self) -> Option<&SiteProperties> {
        self.properties.as_ref()
    }
}

/// An App Service plan (`Microsoft.Web/serverfarms`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppServicePlan {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, rename = "type")]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub sku: Option<SkuDescription>,
    #[serde(default)]
    pub properties: Option<AppServicePlanProperties>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppServicePlanProperties {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub subscription: Option<String>,
    #[serde(default)]
    pub maximum_number_of_workers: Option<i64>,
    #[serde(default)]
    pub per_site_scaling: Option<bool>,
    #[serde(default)]
    pub maximum_elastic_worker_count: Option<i64>,
    #[serde(default)]
    pub is_spot: Option<bool>,
    #[serde(default)]
    pub reserved: Option<bool>,
    #[serde(default)]
    pub is_xenon: Option<bool>,
    #[serde(default)]
    pub hyper_v: Option<bool>,
    #[serde(default)]
    pub provisioning_state: Option<String>,
    #[serde(default)]
    pub resource_group: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkuDescription {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub capacity: Option<i64>,
}

impl AppServicePlan {
    pub fn properties(&self) -> Option<&AppServicePlanProperties> {
        self.properties.as_ref()
    }

    pub fn sku(&self) -> Option<&SkuDescription> {
        self.sku.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_deserialize() {
        let site: Site = serde_json::from_str(
            r#"{
                "id": "/subscriptions/sub-1/resourceGroups/rg1/providers/Microsoft.Web/sites/fn1",
                "name": "fn1",
                "kind": "functionapp,linux",
                "location": "West Europe",
                "type": "Microsoft.Web/sites",
                "tags": {"env": "dev"},
                "properties": {
                    "state": "Running",
                    "hostNames": ["fn1.azurewebsites.net"],
                    "httpsOnly": true,
                    "defaultHostName": "fn1.azurewebsites.net",
                    "resourceGroup": "rg1",
                    "siteConfig": {"numberOfWorkers": 1}
                }
            }"#,
        )
        .unwrap();

        let props = site.properties().unwrap();
        assert_eq!(site.resource_type.as_deref(), Some("Microsoft.Web/sites"));
        assert_eq!(props.state.as_deref(), Some("Running"));
        assert_eq!(props.https_only, Some(true));
        assert_eq!(props.resource_group.as_deref(), Some("rg1"));
        assert_eq!(props.site_config.as_ref().unwrap()["numberOfWorkers"], 1);
    }

    #[test]
    fn test_plan_deserialize() {
        let plan: AppServicePlan = serde_json::from_str(
            r#"{
                "id": "/subscriptions/sub-1/resourceGroups/rg1/providers/Microsoft.Web/serverfarms/plan1",
                "name": "plan1",
                "sku": {"name": "P1v2", "tier": "PremiumV2", "size": "P1v2", "family": "Pv2", "capacity": 2},
                "properties": {"hyperV": false, "maximumNumberOfWorkers": 30, "subscription": "sub-1", "provisioningState": "Succeeded"}
            }"#,
        )
        .unwrap();

        assert_eq!(plan.sku().unwrap().capacity, Some(2));
        let props = plan.properties().unwrap();
        assert_eq!(props.hyper_v, Some(false));
        assert_eq!(props.maximum_number_of_workers, Some(30));
        assert_eq!(props.provisioning_state.as_deref(), Some("Succeeded"));
    }

    #[test]
    fn test_empty_body_is_default() {
        let site: Site = serde_json::from_str("{}").unwrap();
        assert!(site.id.is_none());
        assert!(site.properties().is_none());
    }
}
