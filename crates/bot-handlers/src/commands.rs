use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Copy, Debug)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "open the menu")]
    Start,
    #[command(description = "how to use the bot")]
    Help,
}

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase")]
pub enum AdminCommand {
    #[command(description = "orders waiting for payment or approval")]
    Pending,
    #[command(description = "approve order: /approve <order id>")]
    Approve(String),
    #[command(description = "reject order: /reject <order id> [reason]")]
    Reject(String),
    #[command(description = "statistics")]
    Stats,
    #[command(description = "members list")]
    Members,
    #[command(description = "recent orders")]
    Orders,
}

/// Split `/reject` argument into order id and optional reason
pub(crate) fn split_reject_args(args: &str) -> Option<(&str, Option<&str>)> {
    let args = args.trim();
    if args.is_empty() {
        return None;
    }
    Some(match args.split_once(char::is_whitespace) {
        Some((order_id, reason)) => {
            let reason = reason.trim();
            (order_id, (!reason.is_empty()).then_some(reason))
        }
        None => (args, None),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_admin_commands() {
        let table = [
            ("/pending", Some(AdminCommand::Pending)),
            ("/approve ORD1000", Some(AdminCommand::Approve("ORD1000".to_string()))),
            (
                "/reject ORD1000 no money",
                Some(AdminCommand::Reject("ORD1000 no money".to_string())),
            ),
            ("/orders", Some(AdminCommand::Orders)),
            ("/start", None),
        ];
        for (i, (input, expected)) in table.into_iter().enumerate() {
            assert_eq!(AdminCommand::parse(input, "bot").ok(), expected, "test table[{i}]");
        }
    }

    #[test]
    fn test_split_reject_args() {
        let table = [
            ("", None),
            ("  ", None),
            ("ORD1", Some(("ORD1", None))),
            ("ORD1   ", Some(("ORD1", None))),
            ("ORD1 fake screenshot", Some(("ORD1", Some("fake screenshot")))),
        ];
        for (i, (input, expected)) in table.into_iter().enumerate() {
            assert_eq!(split_reject_args(input), expected, "test table[{i}]");
        }
    }
}
