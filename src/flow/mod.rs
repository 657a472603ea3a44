// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flow cards backed by cloud devices.
//!
//! | Card | Kind | Handler |
//! |------|------|---------|
//! | variable condition | condition | [`check_variable_condition`] |
//! | call function | action | [`run_function`] |
//! | publish event | action | [`publish_event`] |
//!
//! The trigger cards are fired by the device runtime; see
//! [`TriggerCard`](crate::event::TriggerCard).

mod action;
mod condition;

pub use action::{check_variable_condition, publish_event, run_function};
pub use condition::{ConditionType, VariableCondition};
