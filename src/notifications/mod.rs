// Copyright (c) CrowdPulse Team
// SPDX-License-Identifier: Apache-2.0

//! Notification pipeline: engines enqueue [`event::NotificationEvent`]s into
//! the outbox after their authoritative write, and the [`worker`] drains the
//! outbox through the [`dispatcher`], which renders [`templates`] into
//! delivered rows. Notification delivery can lag an action but never blocks
//! or aborts it.

pub mod dispatcher;
pub mod event;
pub mod templates;
pub mod worker;

pub use dispatcher::NotificationDispatcher;
pub use event::NotificationEvent;
pub use worker::DispatcherWorker;
