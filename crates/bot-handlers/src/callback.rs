use crate::payload::{make_payload, parse_payload, PayloadData, PayloadParseError};

const HOME_FLAG: &str = "home";
const PLAN_FLAG: &str = "plan";
const HOW_FLAG: &str = "how";
const CONTACT_FLAG: &str = "contact";
const PAY_FLAG: &str = "pay";
const PAID_FLAG: &str = "paid";
const SCREENSHOT_FLAG: &str = "shot";
const BACK_FLAG: &str = "back";
const ADMIN_FLAG: &str = "adm";

// admin decision tokens: {admin-flag}:{token}:{order-id}
const APPROVE_TOKEN: &str = "ok";
const REJECT_TOKEN: &str = "no";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Callback {
    Home,
    Plan,
    HowItWorks,
    Contact,
    Pay,
    Paid { order_id: String },
    Screenshot { order_id: String },
    Back,
    Admin { order_id: String, decision: AdminDecision },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AdminDecision {
    Approve,
    Reject,
}

impl Callback {
    pub(crate) fn paid(order_id: &str) -> Self {
        Self::Paid {
            order_id: order_id.to_owned(),
        }
    }
    pub(crate) fn screenshot(order_id: &str) -> Self {
        Self::Screenshot {
            order_id: order_id.to_owned(),
        }
    }
    pub(crate) fn admin(order_id: &str, decision: AdminDecision) -> Self {
        Self::Admin {
            order_id: order_id.to_owned(),
            decision,
        }
    }
}

impl PayloadData for Callback {
    type Error = PayloadParseError;

    fn to_payload(&self) -> String {
        match self {
            Self::Home => make_payload(HOME_FLAG, &[]),
            Self::Plan => make_payload(PLAN_FLAG, &[]),
            Self::HowItWorks => make_payload(HOW_FLAG, &[]),
            Self::Contact => make_payload(CONTACT_FLAG, &[]),
            Self::Pay => make_payload(PAY_FLAG, &[]),
            Self::Paid { order_id } => make_payload(PAID_FLAG, &[order_id.as_str()]),
            Self::Screenshot { order_id } => make_payload(SCREENSHOT_FLAG, &[order_id.as_str()]),
            Self::Back => make_payload(BACK_FLAG, &[]),
            Self::Admin { order_id, decision } => {
                let token = match decision {
                    AdminDecision::Approve => APPROVE_TOKEN,
                    AdminDecision::Reject => REJECT_TOKEN,
                };
                make_payload(ADMIN_FLAG, &[token, order_id.as_str()])
            }
        }
    }

    fn try_from_payload(payload: &str) -> Result<Self, Self::Error> {
        let (flag, args) = parse_payload(payload)?;

        let res = match (flag, args.as_slice()) {
            (HOME_FLAG, []) => Self::Home,
            (PLAN_FLAG, []) => Self::Plan,
            (HOW_FLAG, []) => Self::HowItWorks,
            (CONTACT_FLAG, []) => Self::Contact,
            (PAY_FLAG, []) => Self::Pay,
            (BACK_FLAG, []) => Self::Back,
            (PAID_FLAG, [order_id]) => Self::paid(order_id),
            (SCREENSHOT_FLAG, [order_id]) => Self::screenshot(order_id),
            (ADMIN_FLAG, [APPROVE_TOKEN, order_id]) => Self::admin(order_id, AdminDecision::Approve),
            (ADMIN_FLAG, [REJECT_TOKEN, order_id]) => Self::admin(order_id, AdminDecision::Reject),
            (
                HOME_FLAG | PLAN_FLAG | HOW_FLAG | CONTACT_FLAG | PAY_FLAG | BACK_FLAG | PAID_FLAG
                | SCREENSHOT_FLAG | ADMIN_FLAG,
                _,
            ) => return Err(PayloadParseError::InvalidSize),
            _ => return Err(PayloadParseError::UnknownFlag),
        };
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use crate::CALLBACK_VERSION;

    use super::*;

    #[test]
    fn test_callback_payloads() {
        let v = CALLBACK_VERSION;
        let table = [
            (Callback::Home, format!("{v}:home")),
            (Callback::Pay, format!("{v}:pay")),
            (Callback::paid("ORD1000"), format!("{v}:paid:ORD1000")),
            (Callback::screenshot("ORD1000"), format!("{v}:shot:ORD1000")),
            (
                Callback::admin("ORD1000", AdminDecision::Approve),
                format!("{v}:adm:ok:ORD1000"),
            ),
            (
                Callback::admin("ORD1000", AdminDecision::Reject),
                format!("{v}:adm:no:ORD1000"),
            ),
        ];
        for (callback, payload) in table {
            assert_eq!(callback.to_payload(), payload);
            assert_eq!(Callback::try_from_payload(&payload), Ok(callback));
        }
    }

    #[test]
    fn test_invalid_callbacks() {
        let v = CALLBACK_VERSION;
        let table = [
            (format!("{v}:paid"), PayloadParseError::InvalidSize),
            (format!("{v}:home:extra"), PayloadParseError::InvalidSize),
            (format!("{v}:adm:maybe:ORD1"), PayloadParseError::InvalidSize),
            (format!("{v}:notify:1"), PayloadParseError::UnknownFlag),
            // pre-versioned buttons
            ("join_membership".to_string(), PayloadParseError::Outdated),
        ];
        for (i, (payload, expected)) in table.iter().enumerate() {
            assert_eq!(Callback::try_from_payload(payload), Err(*expected), "test table[{i}]");
        }
    }
}
