// SPDX-FileCopyrightText: 2026 Wolfpack Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP/WebSocket gateway for the Wolfpack presence service.
//!
//! Exposes the pack services as a bearer-authenticated REST API and streams
//! scoped bus events to clients over WebSocket, with replay from a
//! client-supplied sequence number on reconnect.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod ws;

pub use error::{ApiError, ErrorResponse};
pub use server::{GatewayState, ServerConfig, build_router, start_server};
