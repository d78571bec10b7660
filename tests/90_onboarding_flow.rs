//! Full onboarding walk: register, create a tenant, select it, import the
//! standard chart, post a balanced opening balance, lock the period.
//!
//! Needs a bootstrapped environment (`ketoan db init`, Postgres, Redis);
//! opt in with KETOAN_E2E=1.

mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

// Valid check digit: weighted sum of 010010942 is 135, 135 % 11 = 3, check = 7
const TEST_TAX_CODE: &str = "0100109427";

async fn register_user(client: &reqwest::Client, base_url: &str) -> Result<(String, Value)> {
    let suffix = common::unique_suffix();
    let email = format!("e2e-{}@ketoan.test", suffix);

    let res = client
        .post(format!("{}/auth/register", base_url))
        .json(&json!({
            "email": email,
            "name": "E2E Operator",
            "password": "rat-la-bi-mat",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED, "register failed");

    let body: Value = res.json().await?;
    let token = body["data"]["token"].as_str().expect("token").to_string();
    Ok((token, body["data"]["user"].clone()))
}

#[tokio::test]
async fn onboarding_to_locked_opening_balance() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        eprintln!("skipping: set KETOAN_E2E=1 to run end-to-end suites");
        return Ok(());
    };
    let client = reqwest::Client::new();
    let base = &server.base_url;

    // Register and sign in
    let (account_token, _user) = register_user(&client, base).await?;

    // Create a tenant
    let suffix = common::unique_suffix();
    let slug = format!("e2e-tenant-{}", suffix);
    let res = client
        .post(format!("{}/api/tenants", base))
        .bearer_auth(&account_token)
        .json(&json!({
            "slug": slug,
            "name": "Cong ty TNHH E2E",
            "tax_code": TEST_TAX_CODE,
            "business_type": "trading",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED, "tenant create failed");
    let tenant: Value = res.json().await?;
    let tenant_id = tenant["data"]["id"].as_str().expect("tenant id").to_string();
    assert_eq!(tenant["data"]["onboarding_step"], "business_profile");

    // Business data needs a tenant token; the account token is not enough
    let res = client
        .get(format!("{}/api/data/accounts", base))
        .bearer_auth(&account_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Select the tenant
    let res = client
        .post(format!("{}/api/tenants/{}/select", base, tenant_id))
        .bearer_auth(&account_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK, "tenant select failed");
    let selected: Value = res.json().await?;
    let tenant_token = selected["data"]["token"].as_str().expect("tenant token").to_string();
    assert_eq!(selected["data"]["tenant"]["role"], "owner");

    // whoami reflects the selection
    let res = client
        .get(format!("{}/api/auth/whoami", base))
        .bearer_auth(&tenant_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let who: Value = res.json().await?;
    assert_eq!(who["data"]["tenant_id"].as_str(), Some(tenant_id.as_str()));

    // Complete the business profile step
    let res = client
        .put(format!("{}/api/tenants/{}/onboarding", base, tenant_id))
        .bearer_auth(&account_token)
        .json(&json!({ "step": "business_profile" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Skipping ahead is rejected
    let res = client
        .put(format!("{}/api/tenants/{}/onboarding", base, tenant_id))
        .bearer_auth(&account_token)
        .json(&json!({ "step": "opening_balance" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Import the standard chart; re-import is idempotent
    let res = client
        .post(format!("{}/api/data/accounts/import", base))
        .bearer_auth(&tenant_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK, "chart import failed");
    let summary: Value = res.json().await?;
    let inserted = summary["data"]["inserted"].as_u64().expect("inserted");
    assert!(inserted > 50);

    let res = client
        .post(format!("{}/api/data/accounts/import", base))
        .bearer_auth(&tenant_token)
        .send()
        .await?;
    let summary: Value = res.json().await?;
    assert_eq!(summary["data"]["inserted"].as_u64(), Some(0));

    let res = client
        .put(format!("{}/api/tenants/{}/onboarding", base, tenant_id))
        .bearer_auth(&account_token)
        .json(&json!({ "step": "chart_of_accounts" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Open a period and post a balanced opening balance
    let res = client
        .post(format!("{}/api/data/opening-balances", base))
        .bearer_auth(&tenant_token)
        .json(&json!({ "fiscal_year": 2026, "start_date": "2026-01-01" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED, "period create failed");
    let period: Value = res.json().await?;
    let period_id = period["data"]["id"].as_str().expect("period id").to_string();

    // A second draft is rejected
    let res = client
        .post(format!("{}/api/data/opening-balances", base))
        .bearer_auth(&tenant_token)
        .json(&json!({ "fiscal_year": 2027, "start_date": "2027-01-01" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    for (code, debit, credit) in [("111", "50000000", "0"), ("411", "0", "50000000")] {
        let res = client
            .put(format!("{}/api/data/opening-balances/{}/lines", base, period_id))
            .bearer_auth(&tenant_token)
            .json(&json!({ "account_code": code, "debit": debit, "credit": credit }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK, "line upsert failed for {}", code);
    }

    // Totals balance, so the lock goes through
    let res = client
        .get(format!("{}/api/data/opening-balances/{}", base, period_id))
        .bearer_auth(&tenant_token)
        .send()
        .await?;
    let shown: Value = res.json().await?;
    assert_eq!(shown["data"]["balanced"], true);

    let res = client
        .post(format!("{}/api/data/opening-balances/{}/lock", base, period_id))
        .bearer_auth(&tenant_token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK, "lock failed");

    // Locked means no more line changes
    let res = client
        .put(format!("{}/api/data/opening-balances/{}/lines", base, period_id))
        .bearer_auth(&tenant_token)
        .json(&json!({ "account_code": "112", "debit": "1", "credit": "0" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Finish the wizard
    for step in ["opening_balance"] {
        let res = client
            .put(format!("{}/api/tenants/{}/onboarding", base, tenant_id))
            .bearer_auth(&account_token)
            .json(&json!({ "step": step }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
    }

    let res = client
        .get(format!("{}/api/tenants/{}/onboarding", base, tenant_id))
        .bearer_auth(&account_token)
        .send()
        .await?;
    let progress: Value = res.json().await?;
    assert_eq!(progress["data"]["done"], true);

    Ok(())
}

#[tokio::test]
async fn duplicate_registration_conflicts() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        eprintln!("skipping: set KETOAN_E2E=1 to run end-to-end suites");
        return Ok(());
    };
    let client = reqwest::Client::new();
    let base = &server.base_url;

    let suffix = common::unique_suffix();
    let email = format!("dup-{}@ketoan.test", suffix);
    let payload = json!({
        "email": email,
        "name": "Dup",
        "password": "mat-khau-dai",
    });

    let res = client
        .post(format!("{}/auth/register", base))
        .json(&payload)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/auth/register", base))
        .json(&payload)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    Ok(())
}

#[tokio::test]
async fn invalid_tax_code_is_a_field_error() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        eprintln!("skipping: set KETOAN_E2E=1 to run end-to-end suites");
        return Ok(());
    };
    let client = reqwest::Client::new();
    let base = &server.base_url;

    let (token, _) = register_user(&client, base).await?;

    let res = client
        .post(format!("{}/api/tenants", base))
        .bearer_auth(&token)
        .json(&json!({
            "slug": format!("bad-tax-{}", common::unique_suffix()),
            "name": "Cong ty sai MST",
            "tax_code": "0100109421",
        }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["tax_code"].is_string());

    Ok(())
}
