// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tally_app::{
    Client, ClientId, ClientStatus, Invoice, InvoiceId, InvoiceStatus, Payment, PaymentId,
    PaymentMethod, Router, RouterId, Sector, SectorId, ServicePlan, ServicePlanId,
};
use time::format_description::well_known::Rfc3339;
use time::{Date, Duration, Month, OffsetDateTime, Time};

const FIRST_NAMES: [&str; 16] = [
    "Ana", "Luis", "María", "José", "Carmen", "Jorge", "Lucía", "Andrés", "Sofía", "Diego",
    "Valeria", "Martín", "Camila", "Óscar", "Elena", "Raúl",
];
const LAST_NAMES: [&str; 18] = [
    "Torres", "Pérez", "Gómez", "Rodríguez", "Zúñiga", "Castillo", "Vargas", "Mendoza", "Rojas",
    "Herrera", "Núñez", "Salazar", "Ortiz", "Molina", "Cordero", "Ávila", "Paredes", "Suárez",
];
const SECTOR_NAMES: [&str; 12] = [
    "Centro",
    "Norte",
    "Sur",
    "La Florida",
    "San Antonio",
    "El Recreo",
    "Los Ceibos",
    "Miraflores",
    "Las Palmas",
    "Santa Rosa",
    "El Carmen",
    "Bellavista",
];
const STREETS: [&str; 10] = [
    "Av. Central",
    "Calle Bolívar",
    "Av. Amazonas",
    "Calle Sucre",
    "Av. Los Shyris",
    "Calle Rocafuerte",
    "Av. 10 de Agosto",
    "Calle Olmedo",
    "Av. Colón",
    "Calle Mejía",
];
const PLAN_TIERS: [&str; 5] = ["Básico", "Hogar", "Hogar Plus", "Gamer", "Empresa"];
const PLAN_SPEEDS: [i32; 6] = [10, 20, 30, 50, 100, 200];
const ROUTER_MODELS: [&str; 5] = [
    "MikroTik CCR1036",
    "MikroTik RB4011",
    "MikroTik hEX S",
    "Ubiquiti EdgeRouter 4",
    "Cisco ISR 4331",
];
const OPERATORS: [&str; 4] = ["caja1", "caja2", "admin", "cobrador"];

const REFERENCE_YEAR: i32 = 2025;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn chance(&mut self, percent: u64) -> bool {
        self.next_u64() % 100 < percent
    }
}

/// Seeded generator for ISP records. Same seed, same records.
#[derive(Debug, Clone)]
pub struct IspFaker {
    rng: DeterministicRng,
    seed: u64,
    serial: u64,
}

impl IspFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
            serial: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn client(&mut self) -> Client {
        let serial = self.next_serial();
        let balance = if self.rng.chance(20) {
            None
        } else {
            Some(self.int_range_i64(0, 12_000) as f64 / 100.0)
        };
        let status = match self.rng.int_n(10) {
            0 => ClientStatus::Suspended,
            1 => ClientStatus::Retired,
            _ => ClientStatus::Active,
        };

        Client {
            id: ClientId::new(format!("cli-{serial:05}")),
            name: self.person_name(),
            document_number: format!("{:010}", self.int_range_i64(100_000_000, 2_499_999_999)),
            phone: if self.rng.chance(15) {
                None
            } else {
                Some(format!("09{:08}", self.int_range_i64(0, 99_999_999)))
            },
            address: Some(format!(
                "{} {}",
                self.pick(&STREETS),
                self.int_range_i64(1, 999)
            )),
            sector: Some(self.pick(&SECTOR_NAMES).to_owned()),
            plan: Some(self.plan_name()),
            status,
            balance,
            created_at: self.timestamp_in_year(REFERENCE_YEAR),
        }
    }

    pub fn payment(&mut self, client: &Client) -> Payment {
        let serial = self.next_serial();
        let method = match self.rng.int_n(4) {
            0 => PaymentMethod::Cash,
            1 => PaymentMethod::Transfer,
            2 => PaymentMethod::Card,
            _ => PaymentMethod::Deposit,
        };
        let reference = match method {
            PaymentMethod::Cash => None,
            _ => Some(format!("REF-{:08}", self.int_range_i64(0, 99_999_999))),
        };

        Payment {
            id: PaymentId::new(format!("pay-{serial:05}")),
            client_id: client.id.clone(),
            client_name: client.name.clone(),
            amount: self.int_range_i64(1_500, 8_000) as f64 / 100.0,
            method,
            reference,
            registered_by: self.pick(&OPERATORS).to_owned(),
            created_at: self.timestamp_in_year(REFERENCE_YEAR),
        }
    }

    pub fn invoice(&mut self, client: &Client) -> Invoice {
        let serial = self.next_serial();
        let status = match self.rng.int_n(6) {
            0 => InvoiceStatus::Overdue,
            1 => InvoiceStatus::Cancelled,
            2 | 3 => InvoiceStatus::Pending,
            _ => InvoiceStatus::Paid,
        };

        Invoice {
            id: InvoiceId::new(format!("inv-{serial:05}")),
            number: format!("001-001-{serial:09}"),
            client_id: client.id.clone(),
            client_name: client.name.clone(),
            amount: self.int_range_i64(1_500, 8_000) as f64 / 100.0,
            status,
            issued_at: self.timestamp_in_year(REFERENCE_YEAR),
            due_at: if self.rng.chance(10) {
                None
            } else {
                Some(self.timestamp_in_year(REFERENCE_YEAR + 1))
            },
        }
    }

    pub fn service_plan(&mut self) -> ServicePlan {
        let serial = self.next_serial();
        let tier = self.pick(&PLAN_TIERS);
        let download = PLAN_SPEEDS[self.rng.int_n(PLAN_SPEEDS.len())];

        ServicePlan {
            id: ServicePlanId::new(format!("plan-{serial:03}")),
            name: tier.to_owned(),
            download_mbps: f64::from(download),
            upload_mbps: if self.rng.chance(30) {
                None
            } else {
                Some(f64::from(download) / 2.0)
            },
            price: f64::from(download) * 0.6 + 15.0,
            client_count: Some(self.int_range_i64(0, 400)),
        }
    }

    pub fn router(&mut self) -> Router {
        let serial = self.next_serial();
        Router {
            id: RouterId::new(format!("rtr-{serial:03}")),
            name: format!("RTR-{}", self.pick(&SECTOR_NAMES).to_uppercase()),
            ip_address: format!(
                "10.{}.{}.1",
                self.int_range_i64(0, 255),
                self.int_range_i64(0, 255)
            ),
            location: if self.rng.chance(20) {
                None
            } else {
                Some(format!("Torre {}", self.pick(&SECTOR_NAMES)))
            },
            model: Some(self.pick(&ROUTER_MODELS).to_owned()),
            sector_count: self.int_range_i64(0, 12),
        }
    }

    pub fn sector(&mut self, router: &Router) -> Sector {
        let serial = self.next_serial();
        Sector {
            id: SectorId::new(format!("sec-{serial:03}")),
            name: self.pick(&SECTOR_NAMES).to_owned(),
            router_id: Some(router.id.clone()),
            router_name: Some(router.name.clone()),
            client_count: self.int_range_i64(0, 600),
        }
    }

    pub fn clients(&mut self, count: usize) -> Vec<Client> {
        (0..count).map(|_| self.client()).collect()
    }

    pub fn payments(&mut self, count: usize) -> Vec<Payment> {
        let clients = self.clients(count.div_ceil(3).max(1));
        (0..count)
            .map(|index| {
                let client = &clients[index % clients.len()];
                self.payment(client)
            })
            .collect()
    }

    pub fn invoices(&mut self, count: usize) -> Vec<Invoice> {
        let clients = self.clients(count.div_ceil(2).max(1));
        (0..count)
            .map(|index| {
                let client = &clients[index % clients.len()];
                self.invoice(client)
            })
            .collect()
    }

    pub fn service_plans(&mut self, count: usize) -> Vec<ServicePlan> {
        (0..count).map(|_| self.service_plan()).collect()
    }

    pub fn routers(&mut self, count: usize) -> Vec<Router> {
        (0..count).map(|_| self.router()).collect()
    }

    pub fn sectors(&mut self, count: usize) -> Vec<Sector> {
        let routers = self.routers(count.div_ceil(4).max(1));
        (0..count)
            .map(|index| {
                let router = &routers[index % routers.len()];
                self.sector(router)
            })
            .collect()
    }

    fn next_serial(&mut self) -> u64 {
        self.serial += 1;
        self.serial
    }

    fn person_name(&mut self) -> String {
        format!(
            "{} {} {}",
            self.pick(&FIRST_NAMES),
            self.pick(&LAST_NAMES),
            self.pick(&LAST_NAMES)
        )
    }

    fn plan_name(&mut self) -> String {
        let tier = self.pick(&PLAN_TIERS);
        let speed = PLAN_SPEEDS[self.rng.int_n(PLAN_SPEEDS.len())];
        format!("{tier} {speed} Mbps")
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range_i64(&mut self, min: i64, max: i64) -> i64 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + (self.rng.next_u64() % (span as u64)) as i64
    }

    fn timestamp_in_year(&mut self, year: i32) -> String {
        let start = midnight_utc(year, Month::January, 1);
        let end =
            midnight_utc(year, Month::December, 31) + Duration::days(1) - Duration::seconds(1);
        let span = (end.unix_timestamp() - start.unix_timestamp()) as u64;
        let offset = self.rng.next_u64() % (span + 1);
        let at = OffsetDateTime::from_unix_timestamp(start.unix_timestamp() + offset as i64)
            .expect("valid unix timestamp");
        at.format(&Rfc3339).expect("format RFC 3339 timestamp")
    }
}

/// Writes `records` as a JSON array snapshot, the shape the CLI loads.
pub fn write_snapshot<T: Serialize>(dir: &Path, name: &str, records: &[T]) -> Result<PathBuf> {
    let path = dir.join(name);
    let body = serde_json::to_string_pretty(records).context("encode snapshot")?;
    fs::write(&path, body).with_context(|| format!("write snapshot {}", path.display()))?;
    Ok(path)
}

pub fn temp_config_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let config_path = dir.path().join("config.toml");
    Ok((dir, config_path))
}

pub fn sector_names() -> &'static [&'static str] {
    &SECTOR_NAMES
}

pub fn plan_tiers() -> &'static [&'static str] {
    &PLAN_TIERS
}

fn midnight_utc(year: i32, month: Month, day: u8) -> OffsetDateTime {
    let date = Date::from_calendar_date(year, month, day).expect("valid calendar date");
    let midnight = Time::from_hms(0, 0, 0).expect("valid midnight");
    date.with_time(midnight).assume_utc()
}

#[cfg(test)]
mod tests {
    use super::{IspFaker, plan_tiers, sector_names, write_snapshot};
    use std::collections::BTreeSet;
    use tally_app::{Client, ClientStatus};

    #[test]
    fn new_deterministic_seed() {
        let mut left = IspFaker::new(42);
        let mut right = IspFaker::new(42);
        assert_eq!(left.clients(5), right.clients(5));
    }

    #[test]
    fn zero_seed_is_normalized() {
        assert_eq!(IspFaker::new(0).seed(), 1);
    }

    #[test]
    fn client_fields_are_populated() {
        let mut faker = IspFaker::new(1);
        let client = faker.client();

        assert!(client.id.as_str().starts_with("cli-"));
        assert_eq!(client.name.split(' ').count(), 3);
        assert_eq!(client.document_number.len(), 10);
        assert!(client.created_at.starts_with("2025-"));
        assert!(client.created_at.ends_with('Z'));
    }

    #[test]
    fn client_ids_are_unique() {
        let mut faker = IspFaker::new(7);
        let ids: BTreeSet<String> = faker
            .clients(200)
            .into_iter()
            .map(|client| client.id.as_str().to_owned())
            .collect();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn clients_cover_statuses_and_null_balances() {
        let mut faker = IspFaker::new(3);
        let clients = faker.clients(300);
        assert!(clients.iter().any(|client| client.status == ClientStatus::Suspended));
        assert!(clients.iter().any(|client| client.balance.is_none()));
        assert!(clients.iter().any(|client| client.balance.is_some()));
    }

    #[test]
    fn payments_reference_their_clients() {
        let mut faker = IspFaker::new(4);
        let payments = faker.payments(30);
        assert_eq!(payments.len(), 30);
        for payment in &payments {
            assert!(payment.client_id.as_str().starts_with("cli-"));
            assert!(payment.amount >= 15.0 && payment.amount <= 80.0);
        }
    }

    #[test]
    fn plans_use_known_tiers() {
        let mut faker = IspFaker::new(5);
        for plan in faker.service_plans(20) {
            assert!(plan_tiers().contains(&plan.name.as_str()));
            assert!(plan.download_mbps >= 10.0);
        }
    }

    #[test]
    fn sectors_point_at_routers() {
        let mut faker = IspFaker::new(6);
        for sector in faker.sectors(9) {
            assert!(sector_names().contains(&sector.name.as_str()));
            assert!(sector.router_id.is_some());
            assert!(sector.router_name.is_some());
        }
    }

    #[test]
    fn snapshot_round_trips_through_json() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let mut faker = IspFaker::new(8);
        let clients = faker.clients(3);

        let path = write_snapshot(temp.path(), "clients.json", &clients)?;
        let decoded: Vec<Client> = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        assert_eq!(decoded, clients);
        Ok(())
    }
}
