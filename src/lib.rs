//! # CTS Rust Backend
//!
//! Constraint-based event scheduling engine for a campus timetabling
//! system.
//!
//! This crate decides whether a candidate event (a module taught by a
//! staff member, in a room, at a date/timeslot) may be placed on the
//! timetable, and searches for a feasible and well-scored placement
//! automatically — for one event or for a prioritized batch. The engine
//! is exposed as a REST API via Axum.
//!
//! ## Features
//!
//! - **Constraint Validation**: full hard-violation and soft-warning
//!   reports per candidate placement
//! - **Availability Checking**: room/staff conflict detection keyed on
//!   the (date, timeslot) grid
//! - **Placement Search**: pruned backtracking over room × staff × window
//!   with soft-constraint scoring, plus a greedy direct strategy
//! - **Batch Scheduling**: priority ordering and a bounded retry pass
//! - **HTTP API**: synchronous REST endpoints for validation and
//!   scheduling
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: identifier newtypes and DTO types shared across layers
//! - [`config`]: engine tuning knobs loaded from TOML
//! - [`models`]: domain entities (rooms, staff, events, timeslots)
//! - [`db`]: repository traits and the in-memory implementation
//! - [`scheduler`]: the scheduling engine itself
//! - [`services`]: high-level orchestration used by the HTTP layer
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError carries rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;
pub mod config;

pub mod db;
pub mod models;

pub mod scheduler;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
