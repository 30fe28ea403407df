// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model: room datasets and annotations.

pub mod annotation;
pub mod annotation_set;
pub mod room;
