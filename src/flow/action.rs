// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Flow card run handlers.

use super::VariableCondition;
use crate::cloud::{CloudClient, FunctionResponse};
use crate::device::DeviceHandle;
use crate::error::{Error, FlowError, Result};
use crate::hub::Hub;
use crate::manager::DeviceManager;

/// Runs the function-call action.
///
/// # Errors
///
/// [`FlowError::FunctionFailed`] unless the device answered with status
/// 200, [`FlowError::Device`] if the device is gone.
pub async fn run_function(
    device: &DeviceHandle,
    function: &str,
    argument: &str,
) -> Result<FunctionResponse> {
    tracing::debug!(device_id = %device.id(), function, argument, "Running function action");

    let response = device
        .call_function(function, argument)
        .await
        .map_err(|e| device_gone(device, e))?;
    tracing::debug!(
        device_id = %device.id(),
        status = response.status_code,
        return_value = ?response.return_value,
        "Function responded"
    );

    if response.is_success() {
        Ok(response)
    } else {
        Err(FlowError::FunctionFailed {
            status: response.status_code,
        }
        .into())
    }
}

/// Runs the variable condition.
///
/// The condition arguments are validated before the variable is read.
///
/// # Errors
///
/// The validation errors of [`VariableCondition::parse`], or
/// [`FlowError::Device`] if the device is gone.
pub async fn check_variable_condition(
    device: &DeviceHandle,
    variable: &str,
    condition_type: &str,
    condition_value: &str,
) -> Result<bool> {
    let condition = VariableCondition::parse(condition_type, condition_value)?;
    tracing::debug!(
        device_id = %device.id(),
        variable,
        condition = %condition.kind(),
        value = condition.value(),
        "Checking variable condition"
    );

    let value = device
        .variable_value(variable)
        .await
        .map_err(|e| device_gone(device, e))?;
    Ok(condition.evaluate(value.as_ref()))
}

/// Runs the publish-event action.
///
/// # Errors
///
/// [`FlowError::PublishFailed`] unless the cloud acknowledged the event.
pub async fn publish_event<C: CloudClient, H: Hub>(
    manager: &DeviceManager<C, H>,
    name: &str,
    data: &str,
    private: bool,
) -> Result<()> {
    if manager.publish_event(name, data, private).await {
        Ok(())
    } else {
        Err(FlowError::PublishFailed.into())
    }
}

fn device_gone(device: &DeviceHandle, error: Error) -> Error {
    match error {
        Error::DeviceNotFound => FlowError::Device(device.id().to_string()).into(),
        other => other,
    }
}
