// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use tally_table::{FieldValue, Record};

use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Clients,
    Payments,
    Invoices,
    Plans,
    Routers,
    Sectors,
}

impl EntityKind {
    pub const ALL: [Self; 6] = [
        Self::Clients,
        Self::Payments,
        Self::Invoices,
        Self::Plans,
        Self::Routers,
        Self::Sectors,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Payments => "payments",
            Self::Invoices => "invoices",
            Self::Plans => "plans",
            Self::Routers => "routers",
            Self::Sectors => "sectors",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Clients => "Clients",
            Self::Payments => "Payments",
            Self::Invoices => "Invoices",
            Self::Plans => "Service plans",
            Self::Routers => "Routers",
            Self::Sectors => "Sectors",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "clients" => Some(Self::Clients),
            "payments" => Some(Self::Payments),
            "invoices" => Some(Self::Invoices),
            "plans" | "services" => Some(Self::Plans),
            "routers" => Some(Self::Routers),
            "sectors" => Some(Self::Sectors),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    Active,
    Suspended,
    Retired,
}

impl ClientStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Retired => "retired",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(Self::Active),
            "suspended" => Some(Self::Suspended),
            "retired" => Some(Self::Retired),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Card,
    Deposit,
}

impl PaymentMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Transfer => "transfer",
            Self::Card => "card",
            Self::Deposit => "deposit",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cash" => Some(Self::Cash),
            "transfer" => Some(Self::Transfer),
            "card" => Some(Self::Card),
            "deposit" => Some(Self::Deposit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "paid" => Some(Self::Paid),
            "overdue" => Some(Self::Overdue),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub document_number: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub plan: Option<String>,
    pub status: ClientStatus,
    #[serde(default)]
    pub balance: Option<f64>,
    pub created_at: String,
}

impl Record for Client {
    const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "document_number",
        "phone",
        "address",
        "sector",
        "plan",
        "status",
        "balance",
        "created_at",
    ];

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "id" => self.id.as_str().into(),
            "name" => self.name.as_str().into(),
            "document_number" => self.document_number.as_str().into(),
            "phone" => self.phone.as_deref().into(),
            "address" => self.address.as_deref().into(),
            "sector" => self.sector.as_deref().into(),
            "plan" => self.plan.as_deref().into(),
            "status" => self.status.as_str().into(),
            "balance" => self.balance.into(),
            "created_at" => self.created_at.as_str().into(),
            _ => FieldValue::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub client_id: ClientId,
    pub client_name: String,
    pub amount: f64,
    pub method: PaymentMethod,
    #[serde(default)]
    pub reference: Option<String>,
    pub registered_by: String,
    pub created_at: String,
}

impl Record for Payment {
    const FIELDS: &'static [&'static str] = &[
        "id",
        "client_id",
        "client_name",
        "amount",
        "method",
        "reference",
        "registered_by",
        "created_at",
    ];

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "id" => self.id.as_str().into(),
            "client_id" => self.client_id.as_str().into(),
            "client_name" => self.client_name.as_str().into(),
            "amount" => self.amount.into(),
            "method" => self.method.as_str().into(),
            "reference" => self.reference.as_deref().into(),
            "registered_by" => self.registered_by.as_str().into(),
            "created_at" => self.created_at.as_str().into(),
            _ => FieldValue::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub number: String,
    pub client_id: ClientId,
    pub client_name: String,
    pub amount: f64,
    pub status: InvoiceStatus,
    pub issued_at: String,
    #[serde(default)]
    pub due_at: Option<String>,
}

impl Record for Invoice {
    const FIELDS: &'static [&'static str] = &[
        "id",
        "number",
        "client_id",
        "client_name",
        "amount",
        "status",
        "issued_at",
        "due_at",
    ];

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "id" => self.id.as_str().into(),
            "number" => self.number.as_str().into(),
            "client_id" => self.client_id.as_str().into(),
            "client_name" => self.client_name.as_str().into(),
            "amount" => self.amount.into(),
            "status" => self.status.as_str().into(),
            "issued_at" => self.issued_at.as_str().into(),
            "due_at" => self.due_at.as_deref().into(),
            _ => FieldValue::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicePlan {
    pub id: ServicePlanId,
    pub name: String,
    pub download_mbps: f64,
    #[serde(default)]
    pub upload_mbps: Option<f64>,
    pub price: f64,
    #[serde(default)]
    pub client_count: Option<i64>,
}

impl Record for ServicePlan {
    const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "download_mbps",
        "upload_mbps",
        "price",
        "client_count",
    ];

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "id" => self.id.as_str().into(),
            "name" => self.name.as_str().into(),
            "download_mbps" => self.download_mbps.into(),
            "upload_mbps" => self.upload_mbps.into(),
            "price" => self.price.into(),
            "client_count" => self.client_count.into(),
            _ => FieldValue::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Router {
    pub id: RouterId,
    pub name: String,
    pub ip_address: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub sector_count: i64,
}

impl Record for Router {
    const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "ip_address",
        "location",
        "model",
        "sector_count",
    ];

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "id" => self.id.as_str().into(),
            "name" => self.name.as_str().into(),
            "ip_address" => self.ip_address.as_str().into(),
            "location" => self.location.as_deref().into(),
            "model" => self.model.as_deref().into(),
            "sector_count" => self.sector_count.into(),
            _ => FieldValue::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub id: SectorId,
    pub name: String,
    #[serde(default)]
    pub router_id: Option<RouterId>,
    #[serde(default)]
    pub router_name: Option<String>,
    #[serde(default)]
    pub client_count: i64,
}

impl Record for Sector {
    const FIELDS: &'static [&'static str] =
        &["id", "name", "router_id", "router_name", "client_count"];

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "id" => self.id.as_str().into(),
            "name" => self.name.as_str().into(),
            "router_id" => self.router_id.as_ref().map(RouterId::as_str).into(),
            "router_name" => self.router_name.as_deref().into(),
            "client_count" => self.client_count.into(),
            _ => FieldValue::Null,
        }
    }
}
