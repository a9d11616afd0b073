//! Azure Resource Manager interaction module
//!
//! A small ARM REST client: authentication, sessions scoped to a
//! subscription, pagination and the Microsoft.Web resource types.
//!
//! # Module Structure
//!
//! - [`auth`] - Token credentials (static token, client secret, Azure CLI)
//! - [`session`] - Subscription-scoped session and URL builders
//! - [`http`] - HTTP utilities and ARM error decoding
//! - [`pager`] - `nextLink` pagination
//! - [`models`] - Site and App Service plan records
//! - [`web`] - Microsoft.Web list/get clients
//!
//! # Example
//!
//! ```ignore
//! use azure_tables::azure::{session::Session, web::AppsClient};
//!
//! async fn example(session: &Session) -> azure_tables::Result<()> {
//!     let mut pager = AppsClient::new(session).list()?;
//!     while pager.not_done() {
//!         pager.next().await?;
//!         for site in pager.values() {
//!             println!("{:?}", site.name);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod http;
pub mod models;
pub mod pager;
pub mod session;
pub mod web;

pub use session::Session;
