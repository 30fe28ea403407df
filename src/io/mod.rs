// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for room datasets, annotation sets and model payloads.

pub mod payload;
pub mod serialization;
