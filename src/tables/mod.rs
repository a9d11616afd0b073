//! Azure App Service tables
//!
//! - [`app_service_function_app`] - `azure_app_service_function_app`
//! - [`app_service_plan`] - `azure_app_service_plan`

pub mod app_service_function_app;
pub mod app_service_plan;

pub use app_service_function_app::AppServiceFunctionAppTable;
pub use app_service_plan::AppServicePlanTable;

use crate::plugin::Table;
use std::sync::Arc;

/// Every table this plugin serves
pub fn all_tables() -> Vec<Arc<dyn Table>> {
    vec![
        Arc::new(AppServiceFunctionAppTable::new()),
        Arc::new(AppServicePlanTable::new()),
    ]
}
