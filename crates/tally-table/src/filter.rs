// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

use crate::value::{Record, schema_field};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSpec {
    fields: Vec<&'static str>,
}

impl SearchSpec {
    pub fn for_record<R: Record>(fields: &[&str]) -> Result<Self> {
        let mut resolved = Vec::with_capacity(fields.len());
        for name in fields {
            let Some(field) = schema_field::<R>(name) else {
                bail!(
                    "search field {name:?} is not a record field; expected one of {}",
                    R::FIELDS.join(", ")
                );
            };
            if !resolved.contains(&field) {
                resolved.push(field);
            }
        }
        Ok(Self { fields: resolved })
    }

    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }

    pub fn matches<R: Record>(&self, record: &R, needle: &str) -> bool {
        self.fields.iter().any(|field| {
            record
                .field(field)
                .search_text()
                .is_some_and(|text| text.contains(needle))
        })
    }
}

pub fn filter_indices<R: Record>(records: &[R], search: &str, spec: &SearchSpec) -> Vec<usize> {
    if search.is_empty() {
        return (0..records.len()).collect();
    }

    let needle = search.to_lowercase();
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| spec.matches(*record, &needle))
        .map(|(index, _)| index)
        .collect()
}

pub fn filter<'a, R: Record>(records: &'a [R], search: &str, spec: &SearchSpec) -> Vec<&'a R> {
    filter_indices(records, search, spec)
        .into_iter()
        .map(|index| &records[index])
        .collect()
}
