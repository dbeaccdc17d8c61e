use reqwest::Url;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, ReplyMarkup};

use crate::{
    callback::{AdminDecision, Callback},
    payload::PayloadData,
};

#[derive(Debug, Default)]
pub(crate) struct KeyboardBuilder {
    keys: Vec<InlineKeyboardButton>,
    columns: usize,
}

impl KeyboardBuilder {
    fn with_layout(rows_capacity: usize, columns: usize) -> Self {
        Self {
            keys: Vec::with_capacity(rows_capacity * columns),
            columns,
        }
    }
    fn callback<T>(mut self, text: T, data: &Callback) -> Self
    where
        T: Into<String>,
    {
        self.keys.push(InlineKeyboardButton::callback(text, data.to_payload()));
        self
    }
    fn url<T>(mut self, text: T, url: Url) -> Self
    where
        T: Into<String>,
    {
        self.keys.push(InlineKeyboardButton::url(text, url));
        self
    }
}

impl From<KeyboardBuilder> for ReplyMarkup {
    fn from(value: KeyboardBuilder) -> Self {
        Self::InlineKeyboard(value.into())
    }
}

impl From<KeyboardBuilder> for InlineKeyboardMarkup {
    fn from(value: KeyboardBuilder) -> Self {
        Self::new(value.keys.chunks(value.columns.max(1)).map(|row| row.to_owned()))
    }
}

pub(crate) struct Keyboards;

impl Keyboards {
    pub(crate) fn welcome() -> KeyboardBuilder {
        KeyboardBuilder::with_layout(3, 1)
            .callback("🚀 Join Membership", &Callback::Plan)
            .callback("ℹ️ How It Works", &Callback::HowItWorks)
            .callback("📞 Contact Admin", &Callback::Contact)
    }
    pub(crate) fn plan(price: &str) -> KeyboardBuilder {
        KeyboardBuilder::with_layout(3, 1)
            .callback(format!("💳 Get Access Now - {price}"), &Callback::Pay)
            .callback("❓ How It Works", &Callback::HowItWorks)
            .callback("🔙 Back", &Callback::Back)
    }
    pub(crate) fn how_it_works() -> KeyboardBuilder {
        KeyboardBuilder::with_layout(2, 1)
            .callback("🚀 Get Started", &Callback::Plan)
            .callback("🔙 Back", &Callback::Back)
    }
    /// `admin_url` is a direct chat link, when admin handle is known
    pub(crate) fn contact(admin_url: Option<Url>) -> KeyboardBuilder {
        let keyboard = KeyboardBuilder::with_layout(2, 1);
        let keyboard = match admin_url {
            Some(url) => keyboard.url("💬 Message Admin", url),
            None => keyboard,
        };
        keyboard.callback("🔙 Back to Main", &Callback::Back)
    }
    pub(crate) fn payment(order_id: &str, screenshot: bool) -> KeyboardBuilder {
        let keyboard = KeyboardBuilder::with_layout(4, 1).callback("✅ I Have Paid", &Callback::paid(order_id));
        let keyboard = if screenshot {
            keyboard.callback("📸 Send Screenshot", &Callback::screenshot(order_id))
        } else {
            keyboard
        };
        keyboard
            .callback("📞 Contact Admin", &Callback::Contact)
            .callback("🔙 Cancel", &Callback::Back)
    }
    /// Shown to members, `None` if stored link is not a valid url
    pub(crate) fn join_channel(link: &str) -> Option<KeyboardBuilder> {
        let url = Url::parse(link)
            .inspect_err(|e| log::error!("invalid invite link {link}: {e}"))
            .ok()?;
        Some(KeyboardBuilder::with_layout(1, 1).url("🔗 Join Channel", url))
    }
    pub(crate) fn admin_order(order_id: &str) -> KeyboardBuilder {
        KeyboardBuilder::with_layout(1, 2)
            .callback("✅ Approve", &Callback::admin(order_id, AdminDecision::Approve))
            .callback("❌ Reject", &Callback::admin(order_id, AdminDecision::Reject))
    }
}

/// `https://t.me/<handle>`
pub(crate) fn admin_url(handle: &str) -> Option<Url> {
    Url::parse("https://t.me/")
        .and_then(|base| base.join(handle))
        .inspect_err(|e| log::error!("invalid admin handle {handle}: {e}"))
        .ok()
}

#[cfg(test)]
mod tests {
    use teloxide::types::{InlineKeyboardButton as Btn, InlineKeyboardMarkup as Markup, ReplyMarkup as Reply};

    use crate::CALLBACK_VERSION;

    use super::*;

    fn cb(s: &str) -> String {
        format!("{CALLBACK_VERSION}:{s}")
    }

    #[test]
    fn test_payment_keyboard() {
        let table = [
            (
                Keyboards::payment("ORD1000", false),
                vec![
                    vec![Btn::callback("✅ I Have Paid", cb("paid:ORD1000"))],
                    vec![Btn::callback("📞 Contact Admin", cb("contact"))],
                    vec![Btn::callback("🔙 Cancel", cb("back"))],
                ],
            ),
            (
                Keyboards::payment("ORD1000", true),
                vec![
                    vec![Btn::callback("✅ I Have Paid", cb("paid:ORD1000"))],
                    vec![Btn::callback("📸 Send Screenshot", cb("shot:ORD1000"))],
                    vec![Btn::callback("📞 Contact Admin", cb("contact"))],
                    vec![Btn::callback("🔙 Cancel", cb("back"))],
                ],
            ),
        ];
        for (res, expected) in table {
            let res: ReplyMarkup = res.into();
            similar_asserts::assert_eq!(res, Reply::InlineKeyboard(Markup::new(expected)));
        }
    }

    #[test]
    fn test_admin_keyboard() {
        let res: ReplyMarkup = Keyboards::admin_order("ORD1000").into();
        let expected = vec![vec![
            Btn::callback("✅ Approve", cb("adm:ok:ORD1000")),
            Btn::callback("❌ Reject", cb("adm:no:ORD1000")),
        ]];
        similar_asserts::assert_eq!(res, Reply::InlineKeyboard(Markup::new(expected)));
    }

    #[test]
    fn test_contact_keyboard() {
        let url = admin_url("owner").unwrap();
        assert_eq!(url.as_str(), "https://t.me/owner");

        let res: ReplyMarkup = Keyboards::contact(Some(url.clone())).into();
        let expected = vec![
            vec![Btn::url("💬 Message Admin", url)],
            vec![Btn::callback("🔙 Back to Main", cb("back"))],
        ];
        similar_asserts::assert_eq!(res, Reply::InlineKeyboard(Markup::new(expected)));
    }

    #[test]
    fn test_join_channel_keyboard() {
        assert!(Keyboards::join_channel("not a link").is_none());

        let res: ReplyMarkup = Keyboards::join_channel("https://t.me/+abc").unwrap().into();
        let expected = vec![vec![Btn::url(
            "🔗 Join Channel",
            Url::parse("https://t.me/+abc").unwrap(),
        )]];
        similar_asserts::assert_eq!(res, Reply::InlineKeyboard(Markup::new(expected)));
    }
}
