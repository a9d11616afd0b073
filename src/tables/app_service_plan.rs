//! `azure_app_service_plan`

use crate::azure::models::{AppServicePlan, AppServicePlanProperties, SkuDescription};
use crate::azure::web::AppServicePlansClient;
use crate::azure::Session;
use crate::error::Result;
use crate::plugin::transform::{id_to_akas, resource_interface_description};
use crate::plugin::{
    Column, ColumnType, ColumnValue, GetConfig, ListStream, QueryKey, ResourceTable,
    TableDefinition,
};
use async_trait::async_trait;

pub const TABLE_NAME: &str = "azure_app_service_plan";

pub struct AppServicePlanTable {
    definition: TableDefinition<AppServicePlan>,
}

impl AppServicePlanTable {
    pub fn new() -> Self {
        Self {
            definition: TableDefinition {
                name: TABLE_NAME,
                description: "Azure App Service Plan",
                get_config: GetConfig {
                    key_columns: &["name", "resource_group"],
                    ignore_error_codes: &["ResourceNotFound", "ResourceGroupNotFound"],
                },
                columns: columns(),
            },
        }
    }
}

impl Default for AppServicePlanTable {
    fn default() -> Self {
        Self::new()
    }
}

fn prop<'a, T>(
    plan: &'a AppServicePlan,
    f: impl FnOnce(&'a AppServicePlanProperties) -> Option<T>,
) -> Option<T> {
    plan.properties().and_then(f)
}

fn sku<'a, T>(plan: &'a AppServicePlan, f: impl FnOnce(&'a SkuDescription) -> Option<T>) -> Option<T> {
    plan.sku().and_then(f)
}

fn columns() -> Vec<Column<AppServicePlan>> {
    vec![
        Column::new(
            "name",
            ColumnType::String,
            "The friendly name that identifies the app service plan",
            |p: &AppServicePlan| p.name.as_deref().into(),
        ),
        Column::new(
            "id",
            ColumnType::String,
            "Contains ID to identify an app service plan uniquely",
            |p: &AppServicePlan| p.id.as_deref().into(),
        ),
        Column::new(
            "kind",
            ColumnType::String,
            "Contains the kind of the resource",
            |p: &AppServicePlan| p.kind.as_deref().into(),
        ),
        Column::new(
            "type",
            ColumnType::String,
            "The resource type of the app service plan",
            |p: &AppServicePlan| p.resource_type.as_deref().into(),
        ),
        Column::new(
            "hyper_v",
            ColumnType::Bool,
            "Specify whether resource is Hyper-V container app service plan",
            |p: &AppServicePlan| prop(p, |pr| pr.hyper_v).into(),
        )
        .with_default(ColumnValue::Bool(false)),
        Column::new(
            "is_spot",
            ColumnType::Bool,
            "Specify whether this App Service Plan owns spot instances, or not",
            |p: &AppServicePlan| prop(p, |pr| pr.is_spot).into(),
        )
        .with_default(ColumnValue::Bool(false)),
        Column::new(
            "is_xenon",
            ColumnType::Bool,
            "Specify whether resource is Hyper-V container app service plan",
            |p: &AppServicePlan| prop(p, |pr| pr.is_xenon).into(),
        )
        .with_default(ColumnValue::Bool(false)),
        Column::new(
            "maximum_elastic_worker_count",
            ColumnType::Int,
            "Maximum number of total workers allowed for this ElasticScaleEnabled App Service Plan",
            |p: &AppServicePlan| prop(p, |pr| pr.maximum_elastic_worker_count).into(),
        ),
        Column::new(
            "maximum_number_of_workers",
            ColumnType::Int,
            "Maximum number of instances that can be assigned to this App Service plan",
            |p: &AppServicePlan| prop(p, |pr| pr.maximum_number_of_workers).into(),
        ),
        Column::new(
            "per_site_scaling",
            ColumnType::Bool,
            "Specify whether apps assigned to this App Service plan can be scaled independently",
            |p: &AppServicePlan| prop(p, |pr| pr.per_site_scaling).into(),
        )
        .with_default(ColumnValue::Bool(false)),
        Column::new(
            "provisioning_state",
            ColumnType::String,
            "Provisioning state of the App Service Environment",
            |p: &AppServicePlan| prop(p, |pr| pr.provisioning_state.as_deref()).into(),
        ),
        Column::new(
            "reserved",
            ColumnType::Bool,
            "Specify whether the resource is Linux app service plan, or not",
            |p: &AppServicePlan| prop(p, |pr| pr.reserved).into(),
        )
        .with_default(ColumnValue::Bool(false)),
        Column::new(
            "sku_capacity",
            ColumnType::Int,
            "Current number of instances assigned to the resource.",
            |p: &AppServicePlan| sku(p, |s| s.capacity).into(),
        ),
        Column::new(
            "sku_family",
            ColumnType::String,
            "Family code of the resource SKU",
            |p: &AppServicePlan| sku(p, |s| s.family.as_deref()).into(),
        ),
        Column::new(
            "sku_name",
            ColumnType::String,
            "Name of the resource SKU",
            |p: &AppServicePlan| sku(p, |s| s.name.as_deref()).into(),
        ),
        Column::new(
            "sku_size",
            ColumnType::String,
            "Size specifier of the resource SKU",
            |p: &AppServicePlan| sku(p, |s| s.size.as_deref()).into(),
        ),
        Column::new(
            "sku_tier",
            ColumnType::String,
            "Service tier of the resource SKU",
            |p: &AppServicePlan| sku(p, |s| s.tier.as_deref()).into(),
        ),
        Column::new(
            "status",
            ColumnType::String,
            "App Service plan status",
            |p: &AppServicePlan| prop(p, |pr| pr.status.as_deref()).into(),
        ),
        // Standard columns
        Column::new(
            "title",
            ColumnType::String,
            resource_interface_description("title"),
            |p: &AppServicePlan| p.name.as_deref().into(),
        ),
        Column::new(
            "tags",
            ColumnType::Json,
            resource_interface_description("tags"),
            |p: &AppServicePlan| ColumnValue::json(p.tags.as_ref()),
        ),
        Column::new(
            "akas",
            ColumnType::Json,
            resource_interface_description("akas"),
            |p: &AppServicePlan| id_to_akas(p.id.as_deref()),
        ),
        Column::new(
            "region",
            ColumnType::String,
            "The Azure region in which the resource is located",
            |p: &AppServicePlan| p.location.as_deref().into(),
        ),
        Column::new(
            "resource_group",
            ColumnType::String,
            "The name of the resource group in which the app service plan is created",
            |p: &AppServicePlan| prop(p, |pr| pr.resource_group.as_deref()).into(),
        ),
        Column::new(
            "subscription_id",
            ColumnType::String,
            "The Azure Subscription ID in which the resource is located",
            |p: &AppServicePlan| prop(p, |pr| pr.subscription.as_deref()).into(),
        ),
    ]
}

//// FETCH FUNCTIONS ////

pub async fn list_app_service_plans(
    session: &Session,
    stream: &ListStream<'_, AppServicePlan>,
) -> Result<()> {
    let client = AppServicePlansClient::new(session);
    let mut pager = client.list(true)?;

    while pager.not_done() {
        pager.next().await?;
        for plan in pager.values() {
            if !stream.stream_list_item(&plan).await {
                tracing::debug!("{}: consumer closed, stopping listing", TABLE_NAME);
                return Ok(());
            }
        }
    }

    Ok(())
}

//// HYDRATE FUNCTIONS ////

pub async fn get_app_service_plan(
    session: &Session,
    key: &QueryKey,
) -> Result<Option<AppServicePlan>> {
    tracing::trace!("get_app_service_plan");

    // resourceGroupName can't be empty
    if key.resource_group.is_empty() {
        return Ok(None);
    }

    let client = AppServicePlansClient::new(session);
    let plan = client.get(&key.resource_group, &key.name).await?;

    if plan.id.as_deref().is_some_and(|id| !id.is_empty()) {
        return Ok(Some(plan));
    }

    Ok(None)
}

#[async_trait]
impl ResourceTable for AppServicePlanTable {
    type Record = AppServicePlan;

    fn definition(&self) -> &TableDefinition<AppServicePlan> {
        &self.definition
    }

    async fn list(&self, session: &Session, stream: &ListStream<'_, AppServicePlan>) -> Result<()> {
        list_app_service_plans(session, stream).await
    }

    async fn get(&self, session: &Session, key: &QueryKey) -> Result<Option<AppServicePlan>> {
        get_app_service_plan(session, key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::Table;
    use serde_json::json;

    #[test]
    fn test_schema() {
        let table = AppServicePlanTable::new();
        let columns = table.columns();

        assert_eq!(table.name(), TABLE_NAME);
        assert_eq!(table.description(), "Azure App Service Plan");
        assert_eq!(columns.len(), 24);

        let capacity = columns.iter().find(|c| c.name == "sku_capacity").unwrap();
        assert_eq!(capacity.column_type, "INT");
    }

    #[test]
    fn test_bool_defaults_apply_to_empty_properties() {
        let table = AppServicePlanTable::new();
        let plan: AppServicePlan = serde_json::from_value(json!({
            "id": "/subscriptions/sub-1/resourceGroups/rg1/providers/Microsoft.Web/serverfarms/plan1",
            "name": "plan1"
        }))
        .unwrap();
        let row = table.definition().project(&plan);

        for column in ["hyper_v", "is_spot", "is_xenon", "per_site_scaling", "reserved"] {
            assert_eq!(row[column], ColumnValue::Bool(false), "{}", column);
        }
        assert_eq!(row["sku_capacity"], ColumnValue::Null);
        assert_eq!(row["subscription_id"], ColumnValue::Null);
    }

    #[test]
    fn test_projection_reads_sku_and_properties() {
        let table = AppServicePlanTable::new();
        let plan: AppServicePlan = serde_json::from_value(json!({
            "id": "/subscriptions/sub-1/resourceGroups/rg1/providers/Microsoft.Web/serverfarms/plan1",
            "name": "plan1",
            "location": "westeurope",
            "sku": {"name": "EP1", "tier": "ElasticPremium", "capacity": 1},
            "properties": {
                "isSpot": true,
                "maximumElasticWorkerCount": 20,
                "status": "Ready",
                "subscription": "sub-1",
                "resourceGroup": "rg1"
            }
        }))
        .unwrap();
        let row = table.definition().project(&plan);

        assert_eq!(row["is_spot"], ColumnValue::Bool(true));
        assert_eq!(row["maximum_elastic_worker_count"], ColumnValue::Int(20));
        assert_eq!(row["sku_tier"], ColumnValue::String("ElasticPremium".to_string()));
        assert_eq!(row["sku_capacity"], ColumnValue::Int(1));
        assert_eq!(row["status"], ColumnValue::String("Ready".to_string()));
        assert_eq!(row["subscription_id"], ColumnValue::String("sub-1".to_string()));
        assert_eq!(row["region"], ColumnValue::String("westeurope".to_string()));
    }
}
