// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

pub mod profiles;
pub mod session;
