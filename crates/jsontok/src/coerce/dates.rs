//! Date recognition for string values.
//!
//! Two shapes are recognised: ISO-8601 date-times
//! (`yyyy-MM-ddTHH:mm:ss[.fraction][zone]`) and the `/Date(millis[±HHmm])/`
//! form. Anything else is left as a string by the caller.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::{options::DateParseHandling, token::JsonDate};

const ISO_MIN_LEN: usize = 19;
const ISO_MAX_LEN: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    None,
    Utc,
    Offset(i32),
}

pub(crate) fn parse_date(text: &str, handling: DateParseHandling) -> Option<JsonDate> {
    if handling == DateParseHandling::None {
        return None;
    }
    if let Some(inner) = text
        .strip_prefix("/Date(")
        .and_then(|rest| rest.strip_suffix(")/"))
    {
        return parse_ms_date(inner, handling);
    }
    let (naive, zone) = parse_iso(text.as_bytes())?;
    resolve(naive, zone, handling)
}

fn resolve(naive: NaiveDateTime, zone: Zone, handling: DateParseHandling) -> Option<JsonDate> {
    let offset = match zone {
        Zone::None | Zone::Utc => FixedOffset::east_opt(0)?,
        Zone::Offset(seconds) => FixedOffset::east_opt(seconds)?,
    };
    let with_offset = offset.from_local_datetime(&naive).single()?;
    Some(match (handling, zone) {
        (DateParseHandling::DateTimeOffset, _) => JsonDate::Offset(with_offset),
        (_, Zone::None) => JsonDate::Unspecified(naive),
        _ => JsonDate::Utc(with_offset.with_timezone(&Utc)),
    })
}

fn digits(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some(
        bytes
            .iter()
            .fold(0u32, |acc, b| acc * 10 + u32::from(b - b'0')),
    )
}

fn parse_iso(bytes: &[u8]) -> Option<(NaiveDateTime, Zone)> {
    if !(ISO_MIN_LEN..=ISO_MAX_LEN).contains(&bytes.len())
        || !bytes[0].is_ascii_digit()
        || bytes[10] != b'T'
    {
        return None;
    }
    if bytes[4] != b'-' || bytes[7] != b'-' || bytes[13] != b':' || bytes[16] != b':' {
        return None;
    }

    let year = i32::try_from(digits(&bytes[0..4])?).ok()?;
    let date = NaiveDate::from_ymd_opt(year, digits(&bytes[5..7])?, digits(&bytes[8..10])?)?;
    let (hour, minute, second) = (
        digits(&bytes[11..13])?,
        digits(&bytes[14..16])?,
        digits(&bytes[17..19])?,
    );

    let mut rest = &bytes[19..];
    let mut nanos = 0u32;
    if let [b'.', tail @ ..] = rest {
        let len = tail.iter().take_while(|b| b.is_ascii_digit()).count();
        if len == 0 || len > 9 {
            return None;
        }
        nanos = digits(&tail[..len])? * 10u32.pow(9 - len as u32);
        rest = &tail[len..];
    }

    let zone = match rest {
        [] => Zone::None,
        [b'Z'] => Zone::Utc,
        [sign @ (b'+' | b'-'), offset @ ..] => {
            let (hours, minutes) = match offset {
                [h1, h2] => (digits(&[*h1, *h2])?, 0),
                [h1, h2, b':', m1, m2] | [h1, h2, m1, m2] => {
                    (digits(&[*h1, *h2])?, digits(&[*m1, *m2])?)
                }
                _ => return None,
            };
            let seconds = i32::try_from(hours * 3600 + minutes * 60).ok()?;
            Zone::Offset(if *sign == b'-' { -seconds } else { seconds })
        }
        _ => return None,
    };

    let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)?;
    Some((NaiveDateTime::new(date, time), zone))
}

fn parse_ms_date(inner: &str, handling: DateParseHandling) -> Option<JsonDate> {
    let bytes = inner.as_bytes();
    let sign_len = usize::from(bytes.first() == Some(&b'-'));
    let end = sign_len + bytes[sign_len..].iter().take_while(|b| b.is_ascii_digit()).count();
    if end == sign_len {
        return None;
    }
    let millis: i64 = inner[..end].parse().ok()?;
    let instant = DateTime::<Utc>::from_timestamp_millis(millis)?;

    let offset = match &bytes[end..] {
        [] => None,
        [sign @ (b'+' | b'-'), h1, h2, m1, m2] => {
            let seconds = i32::try_from(digits(&[*h1, *h2])? * 3600 + digits(&[*m1, *m2])? * 60)
                .ok()?;
            Some(FixedOffset::east_opt(if *sign == b'-' { -seconds } else { seconds })?)
        }
        _ => return None,
    };

    Some(match handling {
        DateParseHandling::DateTimeOffset => {
            let offset = offset.or_else(|| FixedOffset::east_opt(0))?;
            JsonDate::Offset(instant.with_timezone(&offset))
        }
        _ => JsonDate::Utc(instant),
    })
}
