//! Test data fixtures.

use helios_tenant_router::tenant::IdentityClaims;
use serde_json::{Value, json};

/// Public base URL used by every test server.
pub const SERVER_URL: &str = "https://fhir.example.com";

/// A realistic tenant ID.
pub const TENANT: &str = "915b76f7-8744-4010-bd31-a1e4c0d9fc64";

/// Claim listing the caller's tenants.
pub const CLAIM_PATH: &str = "cognito:groups";

/// Prefix of each entry in the tenant claim.
pub const CLAIM_PREFIX: &str = "tenantprefix:";

/// Scope granting every tenant.
pub const ALL_TENANTS_SCOPE: &str = "tenants/all";

/// A caller whose tenant claim lists `tenants`.
pub fn member_of(tenants: &[&str]) -> IdentityClaims {
    let groups: Vec<String> = tenants
        .iter()
        .map(|t| format!("{}{}", CLAIM_PREFIX, t))
        .collect();
    claims(json!({
        "sub": "practitioner-1",
        "scope": ["openid", "profile"],
        "cognito:groups": groups
    }))
}

/// A caller holding the all-tenants scope and no tenant claim entries.
pub fn all_tenants_admin() -> IdentityClaims {
    claims(json!({
        "sub": "admin",
        "scope": ["openid", ALL_TENANTS_SCOPE],
        "cognito:groups": []
    }))
}

/// A caller whose audience names `tenant`.
pub fn audience_for(tenant: &str) -> IdentityClaims {
    claims(json!({
        "sub": "service-1",
        "aud": format!("{}/tenant/{}", SERVER_URL, tenant)
    }))
}

/// A caller without any tenant claim.
pub fn no_tenant_claim() -> IdentityClaims {
    claims(json!({
        "sub": "practitioner-2",
        "scope": ["openid"]
    }))
}

/// Builds claims from a JSON object.
pub fn claims(value: Value) -> IdentityClaims {
    IdentityClaims::from_value(value).expect("claims must be a JSON object")
}

/// A minimal Patient.
pub fn patient(family: &str) -> Value {
    json!({
        "resourceType": "Patient",
        "name": [{ "family": family }]
    })
}

/// A Patient with a fixed id.
pub fn patient_with_id(id: &str, family: &str) -> Value {
    json!({
        "resourceType": "Patient",
        "id": id,
        "name": [{ "family": family }]
    })
}
