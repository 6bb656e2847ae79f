// Copyright 2026 Storeprobe Contributors
// SPDX-License-Identifier: Apache-2.0

//! Storeprobe library — agent-readiness auditor for e-commerce pages.
//!
//! This library crate exposes the core modules for integration testing.

#![allow(clippy::new_without_default)]

pub mod acquisition;
pub mod auditor;
pub mod cache;
pub mod cli;
pub mod config;
pub mod extraction;
pub mod journal;
pub mod renderer;
pub mod scoring;
pub mod site;
