// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for operations on storage entities.

pub mod chat;
pub mod events;
pub mod interactions;
pub mod locations;
pub mod sessions;
pub mod votes;
