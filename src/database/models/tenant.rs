use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A customer organization in the system registry. Each tenant owns a
/// dedicated business database named by `database`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub id: Uuid,
    /// URL-safe identifier, unique among non-deleted tenants
    pub slug: String,
    /// Display name of the company
    pub name: String,
    /// Vietnamese enterprise tax code (ma so thue)
    pub tax_code: String,
    /// Business classification collected during onboarding
    pub business_type: Option<String>,
    pub database: String,
    pub onboarding_step: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub trashed_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Tenant {
    pub fn onboarding(&self) -> OnboardingStep {
        OnboardingStep::parse(&self.onboarding_step).unwrap_or(OnboardingStep::BusinessProfile)
    }
}

/// User membership in a tenant, with role
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TenantMember {
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Ordered onboarding wizard steps. A step can only be completed after every
/// prior step; `Done` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    BusinessProfile,
    ChartOfAccounts,
    OpeningBalance,
    Done,
}

impl OnboardingStep {
    pub const ALL: [OnboardingStep; 4] = [
        OnboardingStep::BusinessProfile,
        OnboardingStep::ChartOfAccounts,
        OnboardingStep::OpeningBalance,
        OnboardingStep::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OnboardingStep::BusinessProfile => "business_profile",
            OnboardingStep::ChartOfAccounts => "chart_of_accounts",
            OnboardingStep::OpeningBalance => "opening_balance",
            OnboardingStep::Done => "done",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.as_str() == s)
    }

    /// The step that follows this one; `Done` has no successor
    pub fn next(&self) -> Option<Self> {
        match self {
            OnboardingStep::BusinessProfile => Some(OnboardingStep::ChartOfAccounts),
            OnboardingStep::ChartOfAccounts => Some(OnboardingStep::OpeningBalance),
            OnboardingStep::OpeningBalance => Some(OnboardingStep::Done),
            OnboardingStep::Done => None,
        }
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_order_is_monotonic() {
        assert!(OnboardingStep::BusinessProfile < OnboardingStep::ChartOfAccounts);
        assert!(OnboardingStep::OpeningBalance < OnboardingStep::Done);
    }

    #[test]
    fn parse_round_trips() {
        for step in OnboardingStep::ALL {
            assert_eq!(OnboardingStep::parse(step.as_str()), Some(step));
        }
        assert_eq!(OnboardingStep::parse("unknown"), None);
    }

    #[test]
    fn next_walks_the_wizard() {
        assert_eq!(
            OnboardingStep::BusinessProfile.next(),
            Some(OnboardingStep::ChartOfAccounts)
        );
        assert_eq!(OnboardingStep::Done.next(), None);
    }
}
