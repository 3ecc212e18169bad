// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::value::{FieldValue, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    fn apply(self, order: Ordering) -> Ordering {
        match self {
            Self::Asc => order,
            Self::Desc => order.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub field: &'static str,
    pub direction: SortDirection,
}

impl SortState {
    pub const fn asc(field: &'static str) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub const fn desc(field: &'static str) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }

    // Same field flips direction, a new field starts ascending.
    pub fn clicked(self, field: &'static str) -> Self {
        if self.field == field {
            Self {
                field,
                direction: self.direction.toggled(),
            }
        } else {
            Self::asc(field)
        }
    }
}

pub type FieldComparator<R> = fn(&R, &R) -> Ordering;

#[derive(Debug)]
pub struct ComparatorTable<R> {
    entries: Vec<(&'static str, FieldComparator<R>)>,
}

impl<R> Default for ComparatorTable<R> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<R> Clone for ComparatorTable<R> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<R> ComparatorTable<R> {
    pub fn with(mut self, field: &'static str, comparator: FieldComparator<R>) -> Self {
        self.entries.retain(|(existing, _)| *existing != field);
        self.entries.push((field, comparator));
        self
    }

    pub fn get(&self, field: &str) -> Option<FieldComparator<R>> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == field)
            .map(|(_, comparator)| *comparator)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Null sorts below every real value.
pub fn compare_values(left: &FieldValue, right: &FieldValue) -> Ordering {
    match (left, right) {
        (FieldValue::Null, FieldValue::Null) => Ordering::Equal,
        (FieldValue::Null, _) => Ordering::Less,
        (_, FieldValue::Null) => Ordering::Greater,
        (FieldValue::Number(left), FieldValue::Number(right)) => left.total_cmp(right),
        _ => locale_cmp(
            &left.display().to_lowercase(),
            &right.display().to_lowercase(),
        ),
    }
}

pub fn sort_indices<R: Record>(
    records: &[R],
    indices: &[usize],
    sort: SortState,
    comparators: &ComparatorTable<R>,
) -> Vec<usize> {
    let mut ordered = indices.to_vec();
    if let Some(comparator) = comparators.get(sort.field) {
        ordered.sort_by(|left, right| {
            sort.direction
                .apply(comparator(&records[*left], &records[*right]))
        });
        return ordered;
    }

    let mut keyed: Vec<(usize, FieldValue)> = ordered
        .into_iter()
        .map(|index| (index, records[index].field(sort.field)))
        .collect();
    keyed.sort_by(|(_, left), (_, right)| sort.direction.apply(compare_values(left, right)));
    keyed.into_iter().map(|(index, _)| index).collect()
}

pub fn sort<'a, R: Record>(
    records: &'a [R],
    sort: SortState,
    comparators: &ComparatorTable<R>,
) -> Vec<&'a R> {
    let all: Vec<usize> = (0..records.len()).collect();
    sort_indices(records, &all, sort, comparators)
        .into_iter()
        .map(|index| &records[index])
        .collect()
}

// Primary level: character class, then the accent-folded character. Ties
// fall back to raw code points so the order is total.
pub fn locale_cmp(left: &str, right: &str) -> Ordering {
    let primary = left
        .chars()
        .map(collation_key)
        .cmp(right.chars().map(collation_key));
    primary.then_with(|| left.cmp(right))
}

fn collation_key(ch: char) -> (u8, char) {
    let class = if ch.is_whitespace() {
        0
    } else if ch.is_numeric() {
        3
    } else if ch.is_alphabetic() {
        4
    } else if is_symbol(ch) {
        2
    } else {
        1
    };
    (class, fold_accent(ch))
}

fn is_symbol(ch: char) -> bool {
    matches!(
        ch,
        '$' | '+' | '<' | '=' | '>' | '^' | '`' | '|' | '~' | '¢' | '£' | '¥' | '€' | '°' | '±'
    )
}

fn fold_accent(ch: char) -> char {
    match ch {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'ç' => 'c',
        'ø' => 'o',
        'ł' => 'l',
        // Primary level only; the raw fallback still separates ñ from n.
        'ñ' => 'n',
        other => other,
    }
}
