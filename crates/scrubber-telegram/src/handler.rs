// SPDX-FileCopyrightText: 2026 Scrubber Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message filtering and conversion into engine events.

use teloxide::types::{ChatKind, Message, MessageKind};

use scrubber_core::types::{ChatId, InboundContent, MessageId, UserId};

/// Checks whether the message is from a private (DM) chat.
pub fn is_private(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// Whether a message is ordinary user content that should be scrubbed.
///
/// Service messages (joins, pins, title changes) cannot be copied, and
/// anything that looks like a bot command is left alone.
pub fn should_track(msg: &Message) -> bool {
    if !matches!(msg.kind, MessageKind::Common(_)) {
        return false;
    }
    !msg.text().is_some_and(|t| t.starts_with('/'))
}

/// Converts a Telegram message into an [`InboundContent`] event.
pub fn to_inbound(msg: &Message) -> InboundContent {
    InboundContent {
        chat_id: ChatId(msg.chat.id.0),
        message_id: MessageId(msg.id.0),
        origin: sender(msg),
    }
}

/// The command sender, if the message has one.
pub fn sender(msg: &Message) -> Option<UserId> {
    msg.from.as_ref().map(|u| UserId(u.id.0))
}
