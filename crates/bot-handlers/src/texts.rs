//! Message templates. Everything here is HTML, dynamic values are escaped.

use teloxide::utils::html::{bold, code_inline, escape};

use common::short_date;
use db::{Member, Order, Stats};

pub(crate) fn price(amount: u32, currency: &str) -> String {
    match currency {
        "INR" => format!("₹{amount}"),
        _ => format!("{amount} {}", escape(currency)),
    }
}

pub(crate) fn welcome(bot_name: &str, first_name: &str, price: &str) -> String {
    format!(
        "🎉 {}\n\n\
        Hello {}! 👋\n\n\
        Get lifetime premium access for just {}.\n\n\
        💳 How to join:\n\
        1️⃣ Tap \"Join Membership\"\n\
        2️⃣ Scan the QR code and pay {price}\n\
        3️⃣ Tap \"I Have Paid\" to get your invite link\n\n\
        Ready? Tap below 👇",
        bold(&format!("Welcome to {}!", escape(bot_name))),
        escape(first_name),
        bold(price),
    )
}

pub(crate) fn already_member(first_name: &str, link: &str, admin: &str) -> String {
    format!(
        "✅ {}\n\n\
        Welcome back, {}!\n\n\
        🔗 Your invite link:\n{}\n\n\
        If the link has expired, contact {}",
        bold("You already have access!"),
        escape(first_name),
        escape(link),
        escape(admin),
    )
}

pub(crate) fn plan(price: &str, invite_hours: u32) -> String {
    format!(
        "💎 {}\n\n\
        Price: {} (one-time payment)\n\n\
        ✅ Included:\n\
        • access to all premium content\n\
        • lifetime membership, no renewal\n\
        • regular content updates\n\n\
        🔒 Your invite link works once and is valid for {invite_hours} hours.",
        bold("LIFETIME MEMBERSHIP"),
        bold(price),
    )
}

pub(crate) fn how_it_works(price: &str, invite_hours: u32) -> String {
    format!(
        "❓ {}\n\n\
        {} Tap \"Join Membership\", then \"Get Access Now\"\n\
        {} Scan the QR code with any UPI app and pay {price}\n\
        {} Tap \"I Have Paid\"\n\
        {} Get a one-time invite link, valid for {invite_hours} hours\n\
        {} Open the link and join the channel",
        bold("How it works"),
        bold("1."),
        bold("2."),
        bold("3."),
        bold("4."),
        bold("5."),
    )
}

pub(crate) fn contact(admin: &str) -> String {
    format!(
        "📞 {}\n\n\
        For payment issues or questions write to {}.\n\
        Please include your order id.",
        bold("Contact admin"),
        escape(admin),
    )
}

pub(crate) struct PaymentScreen<'a> {
    pub(crate) order: &'a Order,
    pub(crate) price: &'a str,
    pub(crate) payee_id: &'a str,
    pub(crate) window_minutes: i64,
    pub(crate) invite_hours: u32,
    pub(crate) admin: &'a str,
    pub(crate) screenshot: bool,
}

pub(crate) fn payment(screen: &PaymentScreen<'_>) -> String {
    let order_id = screen.order.order_id();
    let evidence = if screen.screenshot {
        "Then tap \"I Have Paid\" or send a screenshot of the payment."
    } else {
        "Then tap \"I Have Paid\"."
    };
    format!(
        "💳 {}\n\n\
        📋 Order: {}\n\
        💰 Amount: {}\n\
        ⏰ Valid for: {} minutes\n\n\
        Scan the QR code with any UPI app or pay to UPI id {} with note {}.\n\
        {evidence}\n\n\
        🔒 Your link will work once and stay valid for {} hours.\n\n\
        Need help? Contact {}",
        bold("PAYMENT DETAILS"),
        code_inline(order_id),
        screen.price,
        screen.window_minutes,
        code_inline(screen.payee_id),
        code_inline(order_id),
        screen.invite_hours,
        escape(screen.admin),
    )
}

pub(crate) fn qr_failed() -> String {
    "❌ Error generating QR code. Please try again or contact admin.".to_owned()
}

pub(crate) fn waiting_approval(order_id: &str) -> String {
    format!(
        "⏳ Payment for order {} is submitted.\n\nThe admin will check it soon, \
        you'll get your invite link right here.",
        code_inline(order_id),
    )
}

pub(crate) fn invite(link: &str, hours: u32) -> String {
    format!(
        "🎉 {}\n\n\
        🔗 Your personal invite link:\n{}\n\n\
        ⚠️ It works only once and expires in {hours} hours.",
        bold("Payment approved!"),
        escape(link),
    )
}

pub(crate) fn user_rejected(order_id: &str, reason: Option<&str>) -> String {
    let reason = reason.map_or_else(String::new, |r| format!("\nReason: {}", escape(r)));
    format!(
        "❌ Payment for order {} was not confirmed.{reason}\n\n\
        If you believe this is a mistake, contact the admin.",
        code_inline(order_id),
    )
}

pub(crate) fn issuance_failed_user() -> String {
    "⚠️ Your payment is recorded, but the invite link could not be created right now. \
    The admin has been notified and will send it shortly."
        .to_owned()
}

pub(crate) fn screenshot_request(order_id: &str) -> String {
    format!(
        "📸 Send the payment screenshot for order {} as a photo.",
        code_inline(order_id),
    )
}

pub(crate) fn screenshot_received(order_id: &str) -> String {
    format!(
        "✅ Screenshot for order {} received. The admin will check it soon.",
        code_inline(order_id),
    )
}

pub(crate) fn unexpected_photo() -> String {
    "To send a payment screenshot, open your order and tap \"Send Screenshot\" first. \
    Use /start to begin."
        .to_owned()
}

pub(crate) fn unknown_message() -> String {
    "Use /start to open the menu.".to_owned()
}

pub(crate) fn help(bot_name: &str) -> String {
    format!(
        "{}\n\n\
        /start - open the menu\n\
        /help - show this text\n\n\
        Pay with any UPI app, then tap \"I Have Paid\" to get a one-time invite link.",
        bold(&escape(bot_name)),
    )
}

// Alerts, shown as callback popups (plain text)

pub(crate) const ALERT_EXPIRED: &str = "⏰ This order has expired. Tap \"Join Membership\" to get a fresh one.";
pub(crate) const ALERT_NOT_FOUND: &str = "Order not found.";
pub(crate) const ALERT_NOT_OWNER: &str = "This order belongs to someone else.";
pub(crate) const ALERT_ALREADY_CONFIRMED: &str = "Your payment is already waiting for the admin.";
pub(crate) const ALERT_CLOSED: &str = "This order is closed.";
pub(crate) const ALERT_TRY_AGAIN: &str = "Something went wrong, please try again.";
pub(crate) const ALERT_OUTDATED: &str = "This button is outdated, use /start.";
pub(crate) const ALERT_UNAUTHORIZED: &str = "⛔ Unauthorized.";

// Admin

pub(crate) fn unauthorized() -> String {
    ALERT_UNAUTHORIZED.to_owned()
}

pub(crate) fn admin_order(order: &Order, price: &str) -> String {
    format!(
        "{}\n\n\
        Order: {}\n\
        User: {} ({})\n\
        Amount: {price}\n\
        Status: {}\n\
        Created: {}",
        bold("💰 Payment to review"),
        code_inline(order.order_id()),
        escape(&order.display_name()),
        code_inline(&order.user_id().to_string()),
        order.status(),
        short_date(&order.created_at()),
    )
}

pub(crate) fn admin_approved(order: &Order, new_member: bool) -> String {
    let note = if new_member { "" } else { " (was already a member)" };
    format!(
        "✅ Order {} approved, link sent to {}{note}",
        code_inline(order.order_id()),
        escape(&order.display_name()),
    )
}

pub(crate) fn admin_already_approved(order_id: &str) -> String {
    format!("Order {} is already approved.", code_inline(order_id))
}

pub(crate) fn admin_rejected(order: &Order) -> String {
    format!(
        "❌ Order {} of {} rejected.",
        code_inline(order.order_id()),
        escape(&order.display_name()),
    )
}

pub(crate) fn admin_already_rejected(order_id: &str) -> String {
    format!("Order {} is already rejected.", code_inline(order_id))
}

pub(crate) fn admin_new_member(order: &Order) -> String {
    format!(
        "🎉 New member {} via order {} (auto approval)",
        escape(&order.display_name()),
        code_inline(order.order_id()),
    )
}

pub(crate) fn admin_issuance_failed(order_id: &str, error: &str) -> String {
    format!(
        "⚠️ Could not issue invite link for order {}:\n{}\n\n\
        The order is unchanged, retry with /approve {}",
        code_inline(order_id),
        code_inline(error),
        escape(order_id),
    )
}

pub(crate) fn admin_error(error: &str) -> String {
    format!("⚠️ {}", escape(error))
}

pub(crate) fn admin_usage(command: &str) -> String {
    format!("Usage: /{command} {}", escape("<order id>"))
}

pub(crate) fn stats(stats: &Stats, price: impl Fn(u64) -> String) -> String {
    format!(
        "{}\n\n\
        Orders: {}\n\
        • pending: {}\n\
        • awaiting approval: {}\n\
        • approved: {}\n\
        • rejected: {}\n\n\
        Members: {}\n\
        Invite links: {}\n\
        Revenue: {}",
        bold("📊 Statistics"),
        stats.total_orders,
        stats.pending,
        stats.awaiting_approval,
        stats.approved,
        stats.rejected,
        stats.members,
        stats.invite_links,
        price(stats.revenue),
    )
}

pub(crate) fn pending_orders(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "No open orders.".to_owned();
    }
    let lines = orders
        .iter()
        .map(|o| {
            format!(
                "{} {} {} ({})",
                code_inline(o.order_id()),
                o.status(),
                escape(&o.display_name()),
                short_date(&o.created_at()),
            )
        })
        .collect::<Vec<_>>();
    format!("{}\n\n{}", bold("⏳ Open orders"), lines.join("\n"))
}

pub(crate) fn members(members: &[Member], total: usize) -> String {
    if members.is_empty() {
        return "No members yet.".to_owned();
    }
    let lines = members
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let name = m.username().map_or_else(|| m.first_name().to_owned(), |u| format!("@{u}"));
            format!(
                "{}. {} ({}) {}",
                i + 1,
                escape(&name),
                code_inline(&m.user_id().to_string()),
                short_date(&m.joined_at()),
            )
        })
        .collect::<Vec<_>>();
    format!(
        "{}\n\n{}",
        bold(&format!("👥 Members: {total}")),
        lines.join("\n")
    )
}

pub(crate) fn recent_orders(orders: &[Order]) -> String {
    if orders.is_empty() {
        return "No orders yet.".to_owned();
    }
    let lines = orders
        .iter()
        .map(|o| {
            format!(
                "{} {} {} {}",
                code_inline(o.order_id()),
                o.status(),
                escape(&o.display_name()),
                short_date(&o.created_at()),
            )
        })
        .collect::<Vec<_>>();
    format!("{}\n\n{}", bold("📦 Recent orders"), lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price() {
        assert_eq!(price(109, "INR"), "₹109");
        assert_eq!(price(5, "USD"), "5 USD");
    }

    #[test]
    fn test_names_are_escaped() {
        let text = already_member("<b>x</b>", "https://t.me/+a&b", "@admin");
        assert!(text.contains("&lt;b&gt;x&lt;/b&gt;"), "{text}");
        assert!(text.contains("https://t.me/+a&amp;b"), "{text}");
    }
}
