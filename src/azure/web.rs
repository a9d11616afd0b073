//! Microsoft.Web clients
//!
//! Typed list/get calls for sites and App Service plans.

use super::models::{AppServicePlan, Site};
use super::pager::Pager;
use super::session::Session;
use crate::error::Result;
use reqwest::StatusCode;

pub const WEB_PROVIDER: &str = "Microsoft.Web";
pub const WEB_API_VERSION: &str = "2020-06-01";

/// Client for `Microsoft.Web/sites`
pub struct AppsClient<'a> {
    session: &'a Session,
}

impl<'a> AppsClient<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Every site in the subscription, web apps and function apps alike
    pub fn list(&self) -> Result<Pager<'a, Site>> {
        let url = self
            .session
            .provider_url(WEB_PROVIDER, "sites", WEB_API_VERSION)?;
        Ok(Pager::new(self.session, url))
    }

    /// An empty-bodied success decodes to an empty record
    pub async fn get(&self, resource_group: &str, name: &str) -> Result<Site> {
        let url = self.session.resource_url(
            resource_group,
            WEB_PROVIDER,
            "sites",
            name,
            WEB_API_VERSION,
        )?;
        self.session.get_json_accepting(&url, &[]).await
    }
}

/// Client for `Microsoft.Web/serverfarms`
pub struct AppServicePlansClient<'a> {
    session: &'a Session,
}

impl<'a> AppServicePlansClient<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// All plans in the subscription. `detailed` asks ARM for the full
    /// property set instead of the summary view.
    pub fn list(&self, detailed: bool) -> Result<Pager<'a, AppServicePlan>> {
        let mut url = self
            .session
            .provider_url(WEB_PROVIDER, "serverfarms", WEB_API_VERSION)?;
        if detailed {
            url.query_pairs_mut().append_pair("detailed", "true");
        }
        Ok(Pager::new(self.session, url))
    }

    /// The serverfarms endpoint answers a missing plan with a bare 404 or
    /// an empty-bodied success, both of which decode to an empty record.
    pub async fn get(&self, resource_group: &str, name: &str) -> Result<AppServicePlan> {
        let url = self.session.resource_url(
            resource_group,
            WEB_PROVIDER,
            "serverfarms",
            name,
            WEB_API_VERSION,
        )?;
        self.session
            .get_json_accepting(&url, &[StatusCode::NOT_FOUND])
            .await
    }
}
