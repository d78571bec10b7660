pub mod chart_service;
pub mod opening_balance_service;
pub mod partner_service;
pub mod product_service;
pub mod tenant_service;
pub mod user_service;

pub use chart_service::{ChartError, ChartService, ImportSummary, NewAccount};
pub use opening_balance_service::{BalanceError, LineWithAccount, OpeningBalanceService, PeriodTotals};
pub use partner_service::{NewPartner, PartnerError, PartnerService, UpdatePartner};
pub use product_service::{NewProduct, ProductError, ProductService, UpdateProduct};
pub use tenant_service::{CreateTenant, TenantError, TenantService, UpdateTenant};
pub use user_service::{UserError, UserService};

use crate::config;

/// Clamped pagination window shared by the list endpoints
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        let api = &config::config().api;
        let limit = limit
            .unwrap_or(api.default_page_size)
            .clamp(1, api.max_page_size);
        let offset = offset.unwrap_or(0).max(0);
        Self { limit, offset }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_clamps_to_configured_bounds() {
        let page = Page::new(Some(1_000_000), Some(-5));
        assert!(page.limit <= config::config().api.max_page_size);
        assert_eq!(page.offset, 0);

        let page = Page::new(Some(0), None);
        assert_eq!(page.limit, 1);

        let page = Page::default();
        assert_eq!(page.limit, config::config().api.default_page_size);
    }
}
