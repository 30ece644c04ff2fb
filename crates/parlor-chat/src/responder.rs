// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword-matched canned replies.

/// Reply used when no keyword matches.
pub const FALLBACK_REPLY: &str = "That's a great question! I'm here to help you with \
    information about our products and services. Could you be more specific about what \
    you're looking for?";

/// Ordered keyword table; the first substring hit wins.
const RESPONSES: &[(&str, &str)] = &[
    ("hello", "Hello! Welcome to our store! How can I help you today?"),
    ("hi", "Hi there! I'm here to assist you with any questions about our products or services."),
    ("product", "I'd be happy to help you find the perfect product! Could you tell me what you're looking for?"),
    ("price", "I can help you with pricing information. Which product are you interested in?"),
    ("order", "I can help you with your order. Do you have an order number or need help placing a new order?"),
    ("shipping", "Our shipping information: We offer free shipping on orders over $50. Standard delivery takes 3-5 business days."),
    ("return", "Our return policy: You can return items within 30 days of purchase. Please contact us for a return authorization."),
    ("size", "I can help you with sizing information. What type of product are you looking at?"),
    ("color", "We have various colors available. Which product are you interested in?"),
    ("help", "I'm here to help! What would you like to know about our products or services?"),
    ("thank", "You're welcome! Is there anything else I can help you with?"),
    ("bye", "Thank you for visiting! Have a great day!"),
];

/// Pick the canned reply for a visitor message.
pub fn respond(message: &str) -> &'static str {
    let lowered = message.to_lowercase();
    for (keyword, reply) in RESPONSES {
        if lowered.contains(keyword) {
            return reply;
        }
    }
    FALLBACK_REPLY
}
