// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flow triggers fired by device runtimes.
//!
//! Device runtimes fire triggers through the [`TriggerBus`](crate::hub::TriggerBus)
//! collaborator. [`EventBus`] is the in-process implementation: a tokio
//! broadcast channel of [`FlowTrigger`]s that a hub adapter (or a test)
//! subscribes to.

mod event_bus;
mod flow_trigger;

pub use event_bus::EventBus;
pub use flow_trigger::{FlowTrigger, Tokens, TriggerCard};
