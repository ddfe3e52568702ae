// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk eSCL: mDNS scanner discovery, capability parsing, HTTP transport,
// and the scan job state machine. This crate bridges between the core domain
// types defined in `scanwerk-core` and the devices on the network.

pub mod backend;
pub mod capabilities;
pub mod discovery;
pub mod job;
pub mod protocol;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{BACKEND_NAME, EsclBackend};
pub use job::JobController;
pub use transport::{EsclTransport, HttpTransport, PageFetch};
