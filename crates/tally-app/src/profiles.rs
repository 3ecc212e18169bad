// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;

use anyhow::{Context, Result};
use tally_table::{Record, SortState, TableProfile, compare_values};

use crate::model::{Client, EntityKind, Invoice, Payment, Router, Sector, ServicePlan};

/// A record type with its own list screen.
pub trait Entity: Record + Sized {
    const KIND: EntityKind;
    const SEARCH_FIELDS: &'static [&'static str];
    const DEFAULT_SORT: SortState;

    fn profile() -> Result<TableProfile<Self>> {
        TableProfile::new(Self::SEARCH_FIELDS, Self::DEFAULT_SORT)
            .with_context(|| format!("build {} table profile", Self::KIND.as_str()))
    }
}

impl Entity for Client {
    const KIND: EntityKind = EntityKind::Clients;
    const SEARCH_FIELDS: &'static [&'static str] = &[
        "name",
        "document_number",
        "phone",
        "address",
        "sector",
        "plan",
    ];
    const DEFAULT_SORT: SortState = SortState::asc("name");
}

impl Entity for Payment {
    const KIND: EntityKind = EntityKind::Payments;
    const SEARCH_FIELDS: &'static [&'static str] = &[
        "client_name",
        "reference",
        "method",
        "registered_by",
        "amount",
    ];
    const DEFAULT_SORT: SortState = SortState::desc("created_at");
}

impl Entity for Invoice {
    const KIND: EntityKind = EntityKind::Invoices;
    const SEARCH_FIELDS: &'static [&'static str] = &["number", "client_name", "status"];
    const DEFAULT_SORT: SortState = SortState::desc("issued_at");
}

impl Entity for ServicePlan {
    const KIND: EntityKind = EntityKind::Plans;
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "download_mbps", "price"];
    const DEFAULT_SORT: SortState = SortState::asc("name");

    fn profile() -> Result<TableProfile<Self>> {
        TableProfile::new(Self::SEARCH_FIELDS, Self::DEFAULT_SORT)
            .and_then(|profile| profile.with_comparator("name", plan_name_then_speed))
            .with_context(|| format!("build {} table profile", Self::KIND.as_str()))
    }
}

impl Entity for Router {
    const KIND: EntityKind = EntityKind::Routers;
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "ip_address", "location", "model"];
    const DEFAULT_SORT: SortState = SortState::asc("name");
}

impl Entity for Sector {
    const KIND: EntityKind = EntityKind::Sectors;
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "router_name"];
    const DEFAULT_SORT: SortState = SortState::asc("name");
}

// Plans sharing a name ("Hogar", "Hogar") list slowest first.
fn plan_name_then_speed(left: &ServicePlan, right: &ServicePlan) -> Ordering {
    compare_values(&left.field("name"), &right.field("name"))
        .then_with(|| left.download_mbps.total_cmp(&right.download_mbps))
}

#[cfg(test)]
mod tests {
    use super::{Entity, plan_name_then_speed};
    use crate::model::{Client, Invoice, Payment, Router, Sector, ServicePlan};
    use crate::ServicePlanId;
    use std::cmp::Ordering;

    fn plan(name: &str, download_mbps: f64) -> ServicePlan {
        ServicePlan {
            id: ServicePlanId::new(format!("{name}-{download_mbps}")),
            name: name.to_owned(),
            download_mbps,
            upload_mbps: None,
            price: 20.0,
            client_count: None,
        }
    }

    #[test]
    fn every_profile_validates_against_its_schema() -> anyhow::Result<()> {
        Client::profile()?;
        Payment::profile()?;
        Invoice::profile()?;
        ServicePlan::profile()?;
        Router::profile()?;
        Sector::profile()?;
        Ok(())
    }

    #[test]
    fn plan_names_tie_break_on_speed() {
        assert_eq!(
            plan_name_then_speed(&plan("Hogar", 10.0), &plan("hogar", 20.0)),
            Ordering::Less
        );
        assert_eq!(
            plan_name_then_speed(&plan("Empresa", 100.0), &plan("Hogar", 10.0)),
            Ordering::Less
        );
    }

    #[test]
    fn plans_carry_a_name_comparator() -> anyhow::Result<()> {
        let profile = ServicePlan::profile()?;
        assert!(profile.comparators().get("name").is_some());
        assert!(Client::profile()?.comparators().is_empty());
        Ok(())
    }
}
