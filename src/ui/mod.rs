// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Editor components for the floorplan canvas.

pub mod canvas;
pub mod properties;
pub mod toolbar;
