//! EMV TLV re-tagging into the gateway wire dialect.
//!
//! Terminals hand over chip-card data as an ordered set of tag → hex-value
//! pairs keyed in their own dialect. The gateway consumes one flat hex string
//! in its dialect instead: track-2 data is duplicated under a vendor alias,
//! the two key-serial-number tags are renamed, the rest of the terminal's
//! private range is dropped, and `9F03` must always be present.
//!
//! [`retag`] performs the translation with `tracing` reporting;
//! [`retag_with`] takes any [`RetagObserver`], which keeps the translation
//! itself pure in tests. The translation never fails: unknown tags pass
//! through and private tags are dropped, so there is no error path.

/// Track-2 equivalent data; the gateway reads it from the alias but still
/// expects the original tag alongside.
const TRACK2_TAG: &str = "57";
/// Vendor alias the track-2 triple is duplicated under.
const TRACK2_ALIAS: &str = "D0";
/// Terminal-private tag carrying the track-data key serial number.
const DATA_KSN_TAG: &str = "1F8102";
/// Short alias the gateway reads the data KSN from.
const DATA_KSN_ALIAS: &str = "C0";
/// Terminal-private tag carrying the PIN key serial number.
const PIN_KSN_TAG: &str = "1F8101";
/// Short alias the gateway reads the PIN KSN from.
const PIN_KSN_ALIAS: &str = "C1";
/// Terminal-private tag range the gateway never sees.
const PRIVATE_TAG_PREFIX: &str = "1F81";
/// "Other amount" tag the gateway requires structurally.
const OTHER_AMOUNT_TAG: &str = "9F03";

/// Receives translation events from [`retag_with`].
pub trait RetagObserver {
    /// A tag/length/value triple was appended to the output.
    fn emitted(&mut self, tag: &str, length: &str, value: &str) {
        let _ = (tag, length, value);
    }

    /// A terminal-private tag was dropped from the output.
    fn suppressed(&mut self, tag: &str) {
        let _ = tag;
    }
}

/// Observer that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RetagObserver for NoopObserver {}

/// Observer that reports translation events through `tracing`.
///
/// Dropped private tags are logged at `warn` so a terminal introducing a new
/// private tag shows up in the logs instead of disappearing silently.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RetagObserver for TracingObserver {
    fn emitted(&mut self, tag: &str, length: &str, value: &str) {
        tracing::debug!(tag, length, value, "emitted gateway tlv triple");
    }

    fn suppressed(&mut self, tag: &str) {
        tracing::warn!(tag, "dropped terminal-private tlv tag");
    }
}

/// Re-tags terminal TLV entries into the gateway dialect, reporting through
/// `tracing`.
#[must_use]
pub fn retag<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    retag_with(entries, &mut TracingObserver)
}

/// Re-tags terminal TLV entries into the gateway dialect.
///
/// Entries are processed in input order. Each stored key is canonicalized
/// (see [`canonical_tag`]), then translated: `57` is emitted under
/// [`TRACK2_ALIAS`] and again under itself, the two KSN tags are renamed to
/// their aliases, every other `1F81`-prefixed tag is dropped, and anything
/// else passes through unchanged. If no entry canonicalizes to `9F03`, a
/// zero-valued six-byte triple for it is appended at the end.
#[must_use]
pub fn retag_with<'a, I>(entries: I, observer: &mut dyn RetagObserver) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut out = String::new();
    let mut has_other_amount = false;

    for (key, value) in entries {
        let tag = canonical_tag(key);
        has_other_amount |= tag == OTHER_AMOUNT_TAG;
        let length = length_byte(value);

        if tag == TRACK2_TAG {
            push_triple(&mut out, TRACK2_ALIAS, &length, value, observer);
            push_triple(&mut out, TRACK2_TAG, &length, value, observer);
        } else if tag == DATA_KSN_TAG {
            push_triple(&mut out, DATA_KSN_ALIAS, &length, value, observer);
        } else if tag == PIN_KSN_TAG {
            push_triple(&mut out, PIN_KSN_ALIAS, &length, value, observer);
        } else if tag.starts_with(PRIVATE_TAG_PREFIX) {
            observer.suppressed(tag);
        } else {
            push_triple(&mut out, tag, &length, value, observer);
        }
    }

    if !has_other_amount {
        // terminals may omit 9F03; the gateway rejects its absence, zero is fine
        push_triple(&mut out, OTHER_AMOUNT_TAG, "06", "000000000000", observer);
    }

    // TODO: append 5F57 (debit account type, '0' checking / '1' savings) once
    // the terminal surfaces the account selection for US domestic debit
    out
}

fn push_triple(
    out: &mut String,
    tag: &str,
    length: &str,
    value: &str,
    observer: &mut dyn RetagObserver,
) {
    out.push_str(tag);
    out.push_str(length);
    out.push_str(value);
    observer.emitted(tag, length, value);
}

/// Length byte for a hex value: encoded byte count as two uppercase hex
/// digits. An empty value yields `00`.
fn length_byte(value: &str) -> String {
    format!("{:02X}", (value.len() / 2) & 0xFF)
}

/// Strips the terminal's two-character numbering prefix from a stored key.
///
/// A key is taken to carry the prefix exactly when it does not already read
/// as a well-formed wire tag, so `0x9F03` and `0257` strip to `9F03` and
/// `57` while `1F8101`, `9F03` and `57` stay untouched. Keys of two
/// characters or fewer are never altered.
fn canonical_tag(key: &str) -> &str {
    if key.len() > 2 && !is_wire_tag(key) {
        key.get(2..).unwrap_or(key)
    } else {
        key
    }
}

/// Whether `key` parses as a BER-TLV tag number: hex byte pairs forming
/// either a single byte whose tag-number bits stay below `0x1F`, or a
/// leading `0x1F`-class byte followed by continuation bytes of which only
/// the last clears the high bit.
fn is_wire_tag(key: &str) -> bool {
    if key.is_empty() || key.len() % 2 != 0 || !key.is_ascii() {
        return false;
    }
    let mut bytes = Vec::with_capacity(key.len() / 2);
    for i in (0..key.len()).step_by(2) {
        match key.get(i..i + 2).map(|pair| u8::from_str_radix(pair, 16)) {
            Some(Ok(byte)) => bytes.push(byte),
            _ => return false,
        }
    }
    let Some((first, rest)) = bytes.split_first() else {
        return false;
    };
    if first & 0x1F != 0x1F {
        return rest.is_empty();
    }
    match rest.split_last() {
        Some((last, middle)) => last & 0x80 == 0 && middle.iter().all(|b| b & 0x80 != 0),
        None => false,
    }
}
