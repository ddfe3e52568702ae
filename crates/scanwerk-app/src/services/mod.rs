// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer: backend variants, discovery session, and the orchestrator
// façade the command loop talks to.

pub mod backend;
pub mod command;
pub mod config;
pub mod orchestrator;
pub mod response;
pub mod session;
