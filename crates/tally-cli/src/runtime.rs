// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tally_table::{
    Record, RevealTicket, ScrollMetrics, SearchTicket, Table, TableCommand, TableEvent,
};
use tracing::{debug, info};

pub const ROW_HEIGHT_PX: f64 = 36.0;
pub const VIEWPORT_HEIGHT_PX: f64 = 720.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InternalEvent {
    RevealDue(RevealTicket),
    SearchDue(SearchTicket),
}

/// Hosts a [`Table`] and feeds timer-driven tickets back into it.
pub struct Session<R> {
    table: Table<R>,
    internal_tx: Sender<InternalEvent>,
    internal_rx: Receiver<InternalEvent>,
    timers_in_flight: usize,
}

impl<R: Record> Session<R> {
    pub fn new(table: Table<R>) -> Self {
        let (internal_tx, internal_rx) = mpsc::channel();
        Self {
            table,
            internal_tx,
            internal_rx,
            timers_in_flight: 0,
        }
    }

    pub fn table(&self) -> &Table<R> {
        &self.table
    }

    pub fn timers_in_flight(&self) -> usize {
        self.timers_in_flight
    }

    pub fn send(&mut self, command: TableCommand<R>) -> Vec<TableEvent> {
        let events = self.table.dispatch(command);
        self.handle_events(&events);
        events
    }

    /// Blocks until every scheduled timer has fired and been applied.
    pub fn settle(&mut self) -> Result<Vec<TableEvent>> {
        let mut applied = Vec::new();
        while self.timers_in_flight > 0 {
            let event = self
                .internal_rx
                .recv()
                .context("timer channel closed with timers still pending")?;
            self.timers_in_flight -= 1;
            let command = match event {
                InternalEvent::RevealDue(ticket) => TableCommand::CompleteReveal(ticket),
                InternalEvent::SearchDue(ticket) => TableCommand::ApplySearch(ticket),
            };
            applied.extend(self.send(command));
        }
        Ok(applied)
    }

    /// Waits for the reveal the scroll starts. False when none started.
    pub fn scroll_to_end(&mut self) -> Result<bool> {
        let rendered = self.table.view().rows.len();
        let events = self.send(TableCommand::Scroll(metrics_at_end(rendered)));
        let started = events
            .iter()
            .any(|event| matches!(event, TableEvent::RevealScheduled(_)));
        if started {
            self.settle()?;
        }
        Ok(started)
    }

    pub fn sort_by(&mut self, field: &str) -> Result<()> {
        let events = self.send(TableCommand::SortClick(field.to_owned()));
        if events
            .iter()
            .any(|event| matches!(event, TableEvent::SortUnavailable(_)))
        {
            bail!(
                "cannot sort by {field:?}; sortable fields: {}",
                R::FIELDS.join(", ")
            );
        }
        Ok(())
    }

    fn handle_events(&mut self, events: &[TableEvent]) {
        for event in events {
            debug!(?event, "table event");
            match event {
                TableEvent::RevealScheduled(ticket) => {
                    self.schedule(InternalEvent::RevealDue(*ticket), ticket.due_after);
                }
                TableEvent::SearchScheduled(ticket) => {
                    self.schedule(InternalEvent::SearchDue(*ticket), ticket.due_after);
                }
                TableEvent::ReachedEnd => info!("all matching rows are visible"),
                _ => {}
            }
        }
    }

    fn schedule(&mut self, event: InternalEvent, delay: Duration) {
        self.timers_in_flight += 1;
        let sender = self.internal_tx.clone();
        thread::spawn(move || {
            thread::sleep(delay);
            let _ = sender.send(event);
        });
    }
}

pub fn metrics_at_end(rows: usize) -> ScrollMetrics {
    let scroll_height = rows as f64 * ROW_HEIGHT_PX;
    ScrollMetrics {
        scroll_top: (scroll_height - VIEWPORT_HEIGHT_PX).max(0.0),
        scroll_height,
        client_height: VIEWPORT_HEIGHT_PX,
    }
}
