// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Tessella Lanes
//!
//! The hot path of the Tessella renderer: the [`Renderer`] resolves the
//! option surface into a strategy (caching it while nothing changed) and
//! encodes one frame's draw sequence — surface fill first, overlays
//! strictly after — through the backend-agnostic traits of
//! `tessella-core`.

#![warn(missing_docs)]

mod host_tess;
mod overlay_lane;
mod renderer;
mod surface_lane;

pub use host_tess::HostRefinement;
pub use renderer::Renderer;
