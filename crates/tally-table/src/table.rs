// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use tracing::{debug, trace};

use crate::filter::{SearchSpec, filter_indices};
use crate::sort::{ComparatorTable, FieldComparator, SortState, sort_indices};
use crate::value::{Record, schema_field};
use crate::window::{RevealOutcome, RevealTicket, ScrollMetrics, Window, WindowConfig};

#[derive(Debug, Clone)]
pub struct TableProfile<R> {
    search: SearchSpec,
    default_sort: SortState,
    comparators: ComparatorTable<R>,
}

impl<R: Record> TableProfile<R> {
    pub fn new(search_fields: &[&str], default_sort: SortState) -> Result<Self> {
        let search = SearchSpec::for_record::<R>(search_fields)?;
        if schema_field::<R>(default_sort.field).is_none() {
            bail!(
                "default sort field {:?} is not a record field; expected one of {}",
                default_sort.field,
                R::FIELDS.join(", ")
            );
        }
        Ok(Self {
            search,
            default_sort,
            comparators: ComparatorTable::default(),
        })
    }

    pub fn with_comparator(
        mut self,
        field: &'static str,
        comparator: FieldComparator<R>,
    ) -> Result<Self> {
        if schema_field::<R>(field).is_none() {
            bail!("comparator field {field:?} is not a record field");
        }
        self.comparators = self.comparators.with(field, comparator);
        Ok(self)
    }

    pub fn search(&self) -> &SearchSpec {
        &self.search
    }

    pub fn default_sort(&self) -> SortState {
        self.default_sort
    }

    pub fn comparators(&self) -> &ComparatorTable<R> {
        &self.comparators
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TableOptions {
    pub window: WindowConfig,
    /// Zero applies search input on every keystroke.
    pub search_debounce: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchTicket {
    token: u64,
    pub due_after: Duration,
}

#[derive(Debug, Clone)]
pub enum TableCommand<R> {
    ReplaceRecords { records: Arc<[R]>, is_loading: bool },
    SetLoading(bool),
    SearchInput(String),
    ApplySearch(SearchTicket),
    SortClick(String),
    Scroll(ScrollMetrics),
    RequestMore,
    CompleteReveal(RevealTicket),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    RowsChanged { matches: usize, visible: usize },
    LoadingChanged(bool),
    WindowReset,
    SearchScheduled(SearchTicket),
    SearchApplied(String),
    SortChanged(SortState),
    SortUnavailable(String),
    RevealScheduled(RevealTicket),
    RevealCompleted { visible: usize },
    ReachedEnd,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView<'a, R> {
    pub rows: Vec<&'a R>,
    pub is_initial_loading: bool,
    pub is_revealing_more: bool,
    pub reached_end: bool,
    pub sort: SortState,
    pub total_matches: usize,
    pub total_records: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingSearch {
    token: u64,
    text: String,
}

/// Filter, sort, and incremental reveal over one record snapshot.
#[derive(Debug)]
pub struct Table<R> {
    profile: TableProfile<R>,
    options: TableOptions,
    records: Arc<[R]>,
    is_loading: bool,
    has_loaded: bool,
    search: String,
    pending_search: Option<PendingSearch>,
    search_token: u64,
    sort: SortState,
    window: Window,
    order: Vec<usize>,
}

impl<R: Record> Table<R> {
    pub fn new(profile: TableProfile<R>, options: TableOptions) -> Self {
        let sort = profile.default_sort();
        Self {
            profile,
            options,
            records: Arc::from(Vec::new()),
            is_loading: true,
            has_loaded: false,
            search: String::new(),
            pending_search: None,
            search_token: 0,
            sort,
            window: Window::new(options.window),
            order: Vec::new(),
        }
    }

    pub fn dispatch(&mut self, command: TableCommand<R>) -> Vec<TableEvent> {
        match command {
            TableCommand::ReplaceRecords {
                records,
                is_loading,
            } => self.replace_records(records, is_loading),
            TableCommand::SetLoading(is_loading) => self.set_loading(is_loading),
            TableCommand::SearchInput(text) => self.search_input(text),
            TableCommand::ApplySearch(ticket) => self.apply_search_ticket(ticket),
            TableCommand::SortClick(field) => self.sort_click(&field),
            TableCommand::Scroll(metrics) => {
                let ticket = self.window.on_scroll(metrics, self.order.len());
                ticket.map(TableEvent::RevealScheduled).into_iter().collect()
            }
            TableCommand::RequestMore => {
                let ticket = self.window.request_more(self.order.len());
                ticket.map(TableEvent::RevealScheduled).into_iter().collect()
            }
            TableCommand::CompleteReveal(ticket) => self.complete_reveal(ticket),
        }
    }

    pub fn view(&self) -> TableView<'_, R> {
        let total = self.order.len();
        let rows = self.order[..self.window.visible_len(total)]
            .iter()
            .map(|index| &self.records[*index])
            .collect();
        TableView {
            rows,
            is_initial_loading: self.is_initial_loading(),
            is_revealing_more: self.window.is_revealing(),
            reached_end: self.window.reached_end(total),
            sort: self.sort,
            total_matches: total,
            total_records: self.records.len(),
        }
    }

    pub fn is_initial_loading(&self) -> bool {
        self.is_loading && !self.has_loaded
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn pending_search(&self) -> Option<&str> {
        self.pending_search
            .as_ref()
            .map(|pending| pending.text.as_str())
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn records(&self) -> &Arc<[R]> {
        &self.records
    }

    fn replace_records(&mut self, records: Arc<[R]>, is_loading: bool) -> Vec<TableEvent> {
        let mut events = Vec::new();
        if !records.is_empty() {
            self.has_loaded = true;
        }
        if self.is_loading != is_loading {
            self.is_loading = is_loading;
            events.push(TableEvent::LoadingChanged(is_loading));
        }

        self.records = records;
        self.recompute();
        if self.order.len() < self.window.visible_count() && self.window.reset() {
            events.push(TableEvent::WindowReset);
        }
        events.push(self.rows_changed());
        events
    }

    fn set_loading(&mut self, is_loading: bool) -> Vec<TableEvent> {
        if self.is_loading == is_loading {
            return Vec::new();
        }
        self.is_loading = is_loading;
        vec![TableEvent::LoadingChanged(is_loading)]
    }

    fn search_input(&mut self, text: String) -> Vec<TableEvent> {
        if self.options.search_debounce.is_zero() {
            self.pending_search = None;
            return self.apply_search(text);
        }

        self.search_token = self.search_token.wrapping_add(1);
        let ticket = SearchTicket {
            token: self.search_token,
            due_after: self.options.search_debounce,
        };
        self.pending_search = Some(PendingSearch {
            token: ticket.token,
            text,
        });
        vec![TableEvent::SearchScheduled(ticket)]
    }

    fn apply_search_ticket(&mut self, ticket: SearchTicket) -> Vec<TableEvent> {
        match self.pending_search.take() {
            Some(pending) if pending.token == ticket.token => self.apply_search(pending.text),
            other => {
                debug!(token = ticket.token, "superseded search ticket ignored");
                self.pending_search = other;
                Vec::new()
            }
        }
    }

    fn apply_search(&mut self, text: String) -> Vec<TableEvent> {
        if text == self.search {
            return Vec::new();
        }

        self.search = text;
        self.recompute();
        self.window.reset();
        vec![
            TableEvent::SearchApplied(self.search.clone()),
            TableEvent::WindowReset,
            self.rows_changed(),
        ]
    }

    fn sort_click(&mut self, name: &str) -> Vec<TableEvent> {
        let Some(field) = schema_field::<R>(name) else {
            return vec![TableEvent::SortUnavailable(name.to_owned())];
        };

        self.sort = self.sort.clicked(field);
        self.recompute();
        self.window.reset();
        vec![
            TableEvent::SortChanged(self.sort),
            TableEvent::WindowReset,
            self.rows_changed(),
        ]
    }

    fn complete_reveal(&mut self, ticket: RevealTicket) -> Vec<TableEvent> {
        let total = self.order.len();
        match self.window.complete(ticket, total) {
            RevealOutcome::Stale => Vec::new(),
            RevealOutcome::Unchanged | RevealOutcome::Grew { .. } => {
                let mut events = vec![TableEvent::RevealCompleted {
                    visible: self.window.visible_len(total),
                }];
                if self.window.reached_end(total) {
                    events.push(TableEvent::ReachedEnd);
                }
                events
            }
        }
    }

    fn recompute(&mut self) {
        let matched = filter_indices(&self.records, &self.search, self.profile.search());
        self.order = sort_indices(
            &self.records,
            &matched,
            self.sort,
            self.profile.comparators(),
        );
        trace!(
            records = self.records.len(),
            matches = self.order.len(),
            field = self.sort.field,
            direction = self.sort.direction.as_str(),
            "table order recomputed"
        );
    }

    fn rows_changed(&self) -> TableEvent {
        let matches = self.order.len();
        TableEvent::RowsChanged {
            matches,
            visible: self.window.visible_len(matches),
        }
    }
}
