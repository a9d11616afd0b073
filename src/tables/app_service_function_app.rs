//! `azure_app_service_function_app`
//!
//! Function apps share the `Microsoft.Web/sites` listing with web apps and
//! are told apart by their `kind`.

use crate::azure::models::{Site, SiteProperties};
use crate::azure::web::AppsClient;
use crate::azure::Session;
use crate::error::Result;
use crate::plugin::transform::{id_to_akas, id_to_subscription_id, resource_interface_description};
use crate::plugin::{
    Column, ColumnType, ColumnValue, GetConfig, ListStream, QueryKey, ResourceTable,
    TableDefinition,
};
use async_trait::async_trait;

pub const TABLE_NAME: &str = "azure_app_service_function_app";

/// Substring of `kind` that marks a site as a function app
const FUNCTION_APP_KIND: &str = "functionapp";

pub struct AppServiceFunctionAppTable {
    definition: TableDefinition<Site>,
}

impl AppServiceFunctionAppTable {
    pub fn new() -> Self {
        Self {
            definition: TableDefinition {
                name: TABLE_NAME,
                description: "Azure App Service Function App",
                get_config: GetConfig {
                    key_columns: &["name", "resource_group"],
                    ignore_error_codes: &["ResourceNotFound", "ResourceGroupNotFound"],
                },
                columns: columns(),
            },
        }
    }
}

impl Default for AppServiceFunctionAppTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Property accessor shorthand
fn prop<'a, T>(site: &'a Site, f: impl FnOnce(&'a SiteProperties) -> Option<T>) -> Option<T> {
    site.properties().and_then(f)
}

fn columns() -> Vec<Column<Site>> {
    vec![
        Column::new(
            "name",
            ColumnType::String,
            "The friendly name that identifies the app service function app",
            |s: &Site| s.name.as_deref().into(),
        ),
        Column::new(
            "id",
            ColumnType::String,
            "Contains ID to identify an app service function app uniquely",
            |s: &Site| s.id.as_deref().into(),
        ),
        Column::new(
            "kind",
            ColumnType::String,
            "Contains the kind of the resource",
            |s: &Site| s.kind.as_deref().into(),
        ),
        Column::new(
            "state",
            ColumnType::String,
            "Current state of the app",
            |s: &Site| prop(s, |p| p.state.as_deref()).into(),
        ),
        Column::new(
            "type",
            ColumnType::String,
            "The resource type of the app service function app",
            |s: &Site| s.resource_type.as_deref().into(),
        ),
        Column::new(
            "client_affinity_enabled",
            ColumnType::Bool,
            "Specify whether client affinity is enabled",
            |s: &Site| prop(s, |p| p.client_affinity_enabled).into(),
        ),
        Column::new(
            "client_cert_enabled",
            ColumnType::Bool,
            "Specify whether client certificate authentication is enabled",
            |s: &Site| prop(s, |p| p.client_cert_enabled).into(),
        ),
        Column::new(
            "default_site_hostname",
            ColumnType::String,
            "Default hostname of the app",
            |s: &Site| prop(s, |p| p.default_host_name.as_deref()).into(),
        ),
        Column::new(
            "enabled",
            ColumnType::Bool,
            "Specify whether the app is enabled",
            |s: &Site| prop(s, |p| p.enabled).into(),
        ),
        Column::new(
            "host_name_disabled",
            ColumnType::Bool,
            "Specify whether the public hostnames of the app is disabled",
            |s: &Site| prop(s, |p| p.host_names_disabled).into(),
        ),
        Column::new(
            "https_only",
            ColumnType::Bool,
            "Specify whether configuring a web site to accept only https requests",
            |s: &Site| prop(s, |p| p.https_only).into(),
        ),
        Column::new(
            "outbound_ip_addresses",
            ColumnType::String,
            "List of IP addresses that the app uses for outbound connections (e.g. database access)",
            |s: &Site| prop(s, |p| p.outbound_ip_addresses.as_deref()).into(),
        ),
        Column::new(
            "possible_outbound_ip_addresses",
            ColumnType::String,
            "List of possible IP addresses that the app uses for outbound connections (e.g. database access)",
            |s: &Site| prop(s, |p| p.possible_outbound_ip_addresses.as_deref()).into(),
        ),
        Column::new(
            "reserved",
            ColumnType::Bool,
            "Specify whether the app is reserved",
            |s: &Site| prop(s, |p| p.reserved).into(),
        ),
        Column::new(
            "host_names",
            ColumnType::Json,
            "A list of hostnames associated with the app",
            |s: &Site| ColumnValue::json(prop(s, |p| p.host_names.as_ref())),
        ),
        Column::new(
            "site_config",
            ColumnType::Json,
            "A map of all configuration for the app",
            |s: &Site| ColumnValue::json(prop(s, |p| p.site_config.as_ref())),
        ),
        // Standard columns
        Column::new(
            "title",
            ColumnType::String,
            resource_interface_description("title"),
            |s: &Site| s.name.as_deref().into(),
        ),
        Column::new(
            "tags",
            ColumnType::Json,
            resource_interface_description("tags"),
            |s: &Site| ColumnValue::json(s.tags.as_ref()),
        ),
        Column::new(
            "akas",
            ColumnType::Json,
            resource_interface_description("akas"),
            |s: &Site| id_to_akas(s.id.as_deref()),
        ),
        Column::new(
            "region",
            ColumnType::String,
            "The Azure region in which the resource is located",
            |s: &Site| s.location.as_deref().into(),
        ),
        Column::new(
            "resource_group",
            ColumnType::String,
            "The name of the resource group in which the app service function app is created",
            |s: &Site| prop(s, |p| p.resource_group.as_deref()).into(),
        ),
        Column::new(
            "subscription_id",
            ColumnType::String,
            "The Azure Subscription ID in which the resource is located",
            |s: &Site| id_to_subscription_id(s.id.as_deref()),
        ),
    ]
}

/// Whether a site is a function app rather than a web app
pub fn is_function_app(site: &Site) -> bool {
    site.kind
        .as_deref()
        .is_some_and(|kind| kind.contains(FUNCTION_APP_KIND))
}

//// FETCH FUNCTIONS ////

pub async fn list_app_service_function_apps(
    session: &Session,
    stream: &ListStream<'_, Site>,
) -> Result<()> {
    let client = AppsClient::new(session);
    let mut pager = client.list()?;

    while pager.not_done() {
        pager.next().await?;
        // Filtering out all the web apps
        for site in pager.values().iter().filter(|s| is_function_app(s)) {
            if !stream.stream_list_item(site).await {
                tracing::debug!("{}: consumer closed, stopping listing", TABLE_NAME);
                return Ok(());
            }
        }
    }

    Ok(())
}

//// HYDRATE FUNCTIONS ////

pub async fn get_app_service_function_app(
    session: &Session,
    key: &QueryKey,
) -> Result<Option<Site>> {
    tracing::trace!("get_app_service_function_app");

    // ARM rejects an empty resource group name with an opaque validation error
    if key.resource_group.is_empty() {
        return Ok(None);
    }

    let client = AppsClient::new(session);
    let site = client.get(&key.resource_group, &key.name).await?;

    // Some lookups answer with an empty body instead of a not-found error
    if site.id.as_deref().is_some_and(|id| !id.is_empty()) {
        return Ok(Some(site));
    }

    Ok(None)
}

#[async_trait]
impl ResourceTable for AppServiceFunctionAppTable {
    type Record = Site;

    fn definition(&self) -> &TableDefinition<Site> {
        &self.definition
    }

    async fn list(&self, session: &Session, stream: &ListStream<'_, Site>) -> Result<()> {
        list_app_service_function_apps(session, stream).await
    }

    async fn get(&self, session: &Session, key: &QueryKey) -> Result<Option<Site>> {
        get_app_service_function_app(session, key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::Table;
    use serde_json::json;

    fn site(value: serde_json::Value) -> Site {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_is_function_app() {
        assert!(is_function_app(&site(json!({"kind": "functionapp"}))));
        assert!(is_function_app(&site(json!({"kind": "functionapp,linux,container"}))));
        assert!(!is_function_app(&site(json!({"kind": "app"}))));
        assert!(!is_function_app(&site(json!({}))));
    }

    #[test]
    fn test_schema() {
        let table = AppServiceFunctionAppTable::new();
        let names: Vec<_> = table.columns().iter().map(|c| c.name).collect();

        assert_eq!(table.name(), TABLE_NAME);
        assert_eq!(names.len(), 22);
        assert_eq!(&names[..3], &["name", "id", "kind"]);
        assert_eq!(
            &names[16..],
            &["title", "tags", "akas", "region", "resource_group", "subscription_id"]
        );
        assert_eq!(table.key_columns(), &["name", "resource_group"]);
    }

    #[test]
    fn test_projection() {
        let table = AppServiceFunctionAppTable::new();
        let row = table.definition().project(&site(json!({
            "id": "/subscriptions/sub-1/resourceGroups/rg1/providers/Microsoft.Web/sites/fn1",
            "name": "fn1",
            "kind": "functionapp",
            "location": "eastus",
            "tags": {"team": "core"},
            "properties": {
                "state": "Running",
                "httpsOnly": true,
                "hostNames": ["fn1.azurewebsites.net"],
                "resourceGroup": "rg1"
            }
        })));

        assert_eq!(row["title"], ColumnValue::String("fn1".to_string()));
        assert_eq!(row["state"], ColumnValue::String("Running".to_string()));
        assert_eq!(row["https_only"], ColumnValue::Bool(true));
        assert_eq!(row["enabled"], ColumnValue::Null);
        assert_eq!(row["host_names"], ColumnValue::Json(json!(["fn1.azurewebsites.net"])));
        assert_eq!(row["tags"], ColumnValue::Json(json!({"team": "core"})));
        assert_eq!(row["region"], ColumnValue::String("eastus".to_string()));
        assert_eq!(row["resource_group"], ColumnValue::String("rg1".to_string()));
        assert_eq!(row["subscription_id"], ColumnValue::String("sub-1".to_string()));
    }
}
