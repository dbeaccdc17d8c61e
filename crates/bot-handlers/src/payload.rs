/// Bumped when callback layout changes, so buttons of old messages are
/// recognized as outdated instead of misparsed
pub const CALLBACK_VERSION: u8 = 1;

const SEP: &str = ":";

/// Telegram limit for `callback_data`
const MAX_PAYLOAD_LEN: usize = 64;

pub(crate) trait PayloadData {
    type Error;

    fn to_payload(&self) -> String;
    fn try_from_payload(payload: &str) -> Result<Self, Self::Error>
    where
        Self: Sized;
}

/// `{version}:{flag}[:{arg}...]`
pub(crate) fn make_payload(flag: &str, args: &[&str]) -> String {
    let version = CALLBACK_VERSION.to_string();
    let payload = [version.as_str(), flag]
        .into_iter()
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(SEP);

    if payload.len() > MAX_PAYLOAD_LEN {
        log::error!("callback payload is too long: {payload}");
    }
    payload
}

/// Split payload into flag and arguments. Payloads of other versions are
/// rejected
pub(crate) fn parse_payload(payload: &str) -> Result<(&str, Vec<&str>), PayloadParseError> {
    let mut parts = payload.split(SEP);

    let version = parts.next().filter(|v| !v.is_empty()).ok_or(PayloadParseError::Empty)?;
    if version != CALLBACK_VERSION.to_string() {
        return Err(PayloadParseError::Outdated);
    }
    let flag = parts.next().filter(|f| !f.is_empty()).ok_or(PayloadParseError::NoFlag)?;

    Ok((flag, parts.collect()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PayloadParseError {
    #[error("empty payload")]
    Empty,
    #[error("payload of another version")]
    Outdated,
    #[error("payload has no flag")]
    NoFlag,
    #[error("invalid payload size")]
    InvalidSize,
    #[error("unknown payload flag")]
    UnknownFlag,
}

#[cfg(test)]
mod tests {
    use super::*;

    use PayloadParseError::*;

    #[test]
    fn test_make_payload() {
        assert_eq!(make_payload("home", &[]), format!("{CALLBACK_VERSION}:home"));
        assert_eq!(
            make_payload("adm", &["ok", "ORD1000"]),
            format!("{CALLBACK_VERSION}:adm:ok:ORD1000")
        );
    }

    #[test]
    fn test_parse_payload() {
        let v = CALLBACK_VERSION;
        let table: &[(String, Result<(&str, Vec<&str>), PayloadParseError>)] = &[
            ("".to_string(), Err(Empty)),
            (format!("{v}"), Err(NoFlag)),
            (format!("{v}:"), Err(NoFlag)),
            (format!("{}:home", v + 1), Err(Outdated)),
            ("home".to_string(), Err(Outdated)),
            (format!("{v}:home"), Ok(("home", vec![]))),
            (format!("{v}:paid:ORD1000"), Ok(("paid", vec!["ORD1000"]))),
            (format!("{v}:adm:no:ORD1"), Ok(("adm", vec!["no", "ORD1"]))),
        ];
        for (i, (input, expected)) in table.iter().enumerate() {
            assert_eq!(&parse_payload(input), expected, "test table[{i}]");
        }
    }
}
