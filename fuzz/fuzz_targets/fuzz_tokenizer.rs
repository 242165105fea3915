#![no_main]
use std::cell::RefCell;

use arbitrary::Arbitrary;
use jsontok::{
    DateParseHandling, FloatParseHandling, JsonTokenizer, ReaderOptions,
    chunk_utils::ChunkedReader,
};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use serde_json::{Map, Value};

const HEADER: usize = 5; // 1 flag byte + 4-byte chunk seed

thread_local! {
    static RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_os_rng());
}

/// Whitespace and lenient-syntax fragments spliced between generated values.
static FILLER: &[&[u8]] = &[
    b" ",
    b"\t",
    b"\n",
    b"\r\n",
    b"\r",
    b"/* c */",
    b"// c\n",
    "\u{00A0}".as_bytes(),
    "\u{2028}".as_bytes(),
    "\u{3000}".as_bytes(),
];

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size < HEADER || seed.is_multiple_of(10) {
        data[0] = with_rng(|rng| rng.next_u32() as u8);
        data[1..5].copy_from_slice(&with_rng(|rng| rng.next_u32().to_le_bytes()));

        let mut prefix = HEADER;
        while prefix < size {
            let limit = max_size - prefix;
            prefix += append_filler(&mut data[prefix..], limit);
            prefix += append_value(&mut data[prefix..], size, max_size - prefix);
            prefix += append_filler(&mut data[prefix..], max_size - prefix);
        }
        prefix
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

/// Appends a few filler fragments without exceeding `limit` bytes.
fn append_filler(buf: &mut [u8], limit: usize) -> usize {
    with_rng(|rng| {
        if limit == 0 {
            return 0;
        }
        let mut written = 0;
        for _ in 0..rng.random_range(1..=limit.min(4)) {
            let w = FILLER[rng.random_range(0..FILLER.len())];
            if written + w.len() > limit {
                break;
            }
            buf[written..written + w.len()].copy_from_slice(w);
            written += w.len();
        }
        written
    })
}

fn append_value(data: &mut [u8], size: usize, limit: usize) -> usize {
    if limit == 0 {
        return 0;
    }
    let value = loop {
        let s = with_rng(|rng| rng.random_range(size / 2..size * 2 + 1).min(limit));
        let bytes: Vec<u8> = with_rng(|rng| (0..s).map(|_| rng.random::<u8>()).collect());
        if let Ok(value) = ArbitraryValue::arbitrary(&mut arbitrary::Unstructured::new(&bytes)) {
            break value;
        }
    };

    let serialized = serde_json::to_vec(&value.0).expect("Failed to serialize arbitrary value");
    let len = serialized.len().min(limit);
    data[..len].copy_from_slice(&serialized[..len]);
    len
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Debug)]
struct ArbitraryValue(Value);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        let value = match u.choose_index(22)? {
            0 => Value::Null,
            1 => Value::Bool(u.arbitrary()?),
            2 => {
                let n: f64 = u.arbitrary()?;
                Value::Number(
                    serde_json::Number::from_f64(n).ok_or(arbitrary::Error::IncorrectFormat)?,
                )
            }
            3 => Value::from(u.arbitrary::<i64>()?),
            4..=10 => Value::String(u.arbitrary()?),
            11..=15 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                Value::Array(elems.into_iter().map(|v| v.0).collect())
            }
            16..=21 => {
                let m: Vec<(String, ArbitraryValue)> = u.arbitrary()?;
                Value::Object(Map::from_iter(m.into_iter().map(|(k, v)| (k, v.0))))
            }
            _ => Err(arbitrary::Error::IncorrectFormat)?,
        };
        Ok(ArbitraryValue(value))
    }
}

fn tokenize(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }

    let flags = data[0];
    let chunk_seed = u32::from_le_bytes([data[1], data[2], data[3], data[4]]) as usize;
    let data = &data[HEADER..];
    if data.is_empty() {
        return;
    }

    let options = ReaderOptions {
        allow_multiple_values: flags & 1 != 0,
        surface_comments: flags & 2 != 0,
        float_parse_handling: if flags & 4 != 0 {
            FloatParseHandling::Decimal
        } else {
            FloatParseHandling::Double
        },
        date_parse_handling: match (flags >> 3) & 3 {
            0 => DateParseHandling::None,
            1 => DateParseHandling::DateTimeOffset,
            _ => DateParseHandling::DateTime,
        },
        arbitrary_precision_integers: flags & 32 != 0,
        initial_buffer_size: 1 + chunk_seed % 64,
        ..ReaderOptions::default()
    };
    let chunk = 1 + chunk_seed % data.len();
    let mut reader = JsonTokenizer::from_reader_with_options(ChunkedReader::new(data, chunk), options);

    // Mix typed reads into the token stream; errors are expected, panics are not.
    let mut step = u32::from(flags);
    for _ in 0..data.len() + 16 {
        step = step.rotate_left(3) ^ 0x9E37_79B9;
        let more = match step % 8 {
            0 => reader.read_as_int32().map(|v| v.is_some()),
            1 => reader.read_as_string().map(|v| v.is_some()),
            2 => reader.read_as_bytes().map(|v| v.is_some()),
            3 => reader.read_as_date_time().map(|v| v.is_some()),
            _ => reader.read(),
        };
        match more {
            Ok(true) => {
                let _ = reader.value();
                let _ = reader.path();
            }
            Ok(false) | Err(_) if flags & 64 != 0 => break,
            Ok(false) => {}
            Err(_) => break,
        }
    }
    reader.close();
}

fuzz_target!(|data: &[u8]| tokenize(data));
