//! Business dashboard: services, sites and deals fetched side by side.

use chrono::NaiveDate;
use tracing::debug;
use zendulge_domain::{Activatable, Deal, Service, Site};

use super::mount::MountToken;
use crate::api::{Deals, GatewayError, ResourceGateway, Services, Sites};
use crate::notify::{Notification, NotificationSink};

/// Each collection loads independently; one failure does not hide the rest.
#[derive(Debug)]
pub struct Dashboard {
    pub services: Result<Vec<Service>, GatewayError>,
    pub sites: Result<Vec<Site>, GatewayError>,
    pub deals: Result<Vec<Deal>, GatewayError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DashboardSummary {
    pub active_services: usize,
    pub active_sites: usize,
    pub running_deals: usize,
}

impl Dashboard {
    pub fn summary(&self, today: NaiveDate) -> DashboardSummary {
        fn active<T: Activatable>(items: &Result<Vec<T>, GatewayError>) -> usize {
            items
                .as_ref()
                .map(|items| items.iter().filter(|item| item.is_active()).count())
                .unwrap_or(0)
        }
        DashboardSummary {
            active_services: active(&self.services),
            active_sites: active(&self.sites),
            running_deals: self
                .deals
                .as_ref()
                .map(|deals| deals.iter().filter(|deal| deal.is_running(today)).count())
                .unwrap_or(0),
        }
    }

    /// One toast per collection that failed to load.
    pub fn report_failures(&self, sink: &dyn NotificationSink) {
        let failures = [
            ("services", self.services.is_err()),
            ("sites", self.sites.is_err()),
            ("deals", self.deals.is_err()),
        ];
        for (label, failed) in failures {
            if failed {
                sink.notify(Notification::failure(format!("Failed to load {}", label)));
            }
        }
    }
}

/// Loads the dashboard concurrently. Returns `None` when the owning view was
/// unmounted before the results arrived.
pub async fn load_dashboard<G>(
    gateway: &G,
    business_id: &str,
    token: &MountToken,
) -> Option<Dashboard>
where
    G: ResourceGateway<Services> + ResourceGateway<Sites> + ResourceGateway<Deals>,
{
    let (services, sites, deals) = tokio::join!(
        ResourceGateway::<Services>::list(gateway, business_id),
        ResourceGateway::<Sites>::list(gateway, business_id),
        ResourceGateway::<Deals>::list(gateway, business_id),
    );
    if !token.is_mounted() {
        debug!(business = business_id, "dashboard results dropped after unmount");
        return None;
    }
    Some(Dashboard {
        services,
        sites,
        deals,
    })
}
