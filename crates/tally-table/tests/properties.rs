// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use proptest::prelude::*;
use std::collections::BTreeSet;
use tally_table::{
    ComparatorTable, FieldValue, Record, SearchSpec, SortState, Window, WindowConfig,
    filter_indices, sort_indices,
};

#[derive(Debug, Clone, PartialEq)]
struct Row {
    id: String,
    name: String,
    city: Option<String>,
    amount: Option<i64>,
}

impl Record for Row {
    const FIELDS: &'static [&'static str] = &["id", "name", "city", "amount"];

    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> FieldValue {
        match name {
            "id" => self.id.as_str().into(),
            "name" => self.name.as_str().into(),
            "city" => self.city.clone().into(),
            "amount" => self.amount.into(),
            _ => FieldValue::Null,
        }
    }
}

fn arb_rows() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec(
        (
            "[a-dA-D ]{0,6}",
            prop::option::of("[a-cA-C]{1,4}"),
            prop::option::of(-5_i64..5),
        ),
        0..40,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(index, (name, city, amount))| Row {
                id: format!("r{index}"),
                name,
                city,
                amount,
            })
            .collect()
    })
}

fn search_spec() -> SearchSpec {
    match SearchSpec::for_record::<Row>(&["name", "city"]) {
        Ok(spec) => spec,
        Err(error) => panic!("valid search spec: {error}"),
    }
}

fn field_contains(row: &Row, field: &str, needle: &str) -> bool {
    row.field(field)
        .search_text()
        .is_some_and(|text| text.contains(needle))
}

fn all(rows: &[Row]) -> Vec<usize> {
    (0..rows.len()).collect()
}

proptest! {
    #[test]
    fn empty_search_is_identity(rows in arb_rows()) {
        prop_assert_eq!(filter_indices(&rows, "", &search_spec()), all(&rows));
    }

    #[test]
    fn filter_partitions_on_configured_fields(rows in arb_rows(), search in "[a-dA-D]{1,2}") {
        let matched: BTreeSet<usize> =
            filter_indices(&rows, &search, &search_spec()).into_iter().collect();
        let needle = search.to_lowercase();
        for (index, row) in rows.iter().enumerate() {
            let expected = field_contains(row, "name", &needle) || field_contains(row, "city", &needle);
            prop_assert_eq!(matched.contains(&index), expected, "row {:?}", row);
        }
    }

    #[test]
    fn filter_preserves_relative_order(rows in arb_rows(), search in "[a-d]{1}") {
        let matched = filter_indices(&rows, &search, &search_spec());
        prop_assert!(matched.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn sort_is_stable_for_equal_keys(rows in arb_rows()) {
        let ordered = sort_indices(&rows, &all(&rows), SortState::asc("amount"), &ComparatorTable::default());
        for pair in ordered.windows(2) {
            if rows[pair[0]].amount == rows[pair[1]].amount {
                prop_assert!(pair[0] < pair[1]);
            }
        }
    }

    #[test]
    fn descending_reverses_ascending_without_ties(values in prop::collection::hash_set(any::<i32>(), 0..40)) {
        let rows: Vec<Row> = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| Row {
                id: format!("r{index}"),
                name: String::new(),
                city: None,
                amount: Some(i64::from(value)),
            })
            .collect();
        let comparators = ComparatorTable::default();
        let mut asc = sort_indices(&rows, &all(&rows), SortState::asc("amount"), &comparators);
        let desc = sort_indices(&rows, &all(&rows), SortState::desc("amount"), &comparators);
        asc.reverse();
        prop_assert_eq!(asc, desc);
    }

    #[test]
    fn nulls_lead_ascending_and_trail_descending(rows in arb_rows()) {
        let comparators = ComparatorTable::default();
        let null_ids: Vec<usize> = all(&rows).into_iter().filter(|index| rows[*index].city.is_none()).collect();
        let nulls = null_ids.len();

        let asc = sort_indices(&rows, &all(&rows), SortState::asc("city"), &comparators);
        prop_assert_eq!(&asc[..nulls], null_ids.as_slice());

        let desc = sort_indices(&rows, &all(&rows), SortState::desc("city"), &comparators);
        prop_assert_eq!(&desc[desc.len() - nulls..], null_ids.as_slice());
    }

    #[test]
    fn window_grows_monotonically_within_total(total in 0_usize..600, triggers in 0_usize..15) {
        let mut window = Window::new(WindowConfig::default());
        let mut previous = window.visible_count();
        for _ in 0..triggers {
            if let Some(ticket) = window.request_more(total) {
                window.complete(ticket, total);
            }
            let current = window.visible_count();
            prop_assert!(current >= previous);
            prop_assert!(window.visible_len(total) <= total);
            prop_assert!(current <= total.max(100));
            previous = current;
        }
    }
}
